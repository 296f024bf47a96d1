// src/store/mod.rs
//! The current dataset: persisted upload plus the parsed snapshot every session reads.

pub mod blob;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{
    io,
    sync::{Arc, PoisonError, RwLock},
};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::aggregate::{aggregate, ParsedData};
use crate::process::{decode, parse_table, ColumnWindow, ParseError, ParseReport};

pub use blob::{BlobStore, FsBlobStore, MemoryBlobStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("storage: {0}")]
    Io(#[from] io::Error),
}

/// One parsed upload. Shared read-only between sessions.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub data: ParsedData,
    pub report: ParseReport,
    pub loaded_at: DateTime<Utc>,
    pub source_bytes: usize,
}

impl Snapshot {
    /// Parse and aggregate `text` into a fresh snapshot.
    pub fn build(text: &str, window: &ColumnWindow) -> Result<Self, ParseError> {
        let table = parse_table(text, window)?;
        Ok(Self {
            data: aggregate(&table.rows),
            report: table.report,
            loaded_at: Utc::now(),
            source_bytes: text.len(),
        })
    }
}

/// Holds the persisted upload and the snapshot parsed from it. A successful
/// upload or reload swaps the whole snapshot; readers holding the old `Arc`
/// keep a consistent view.
pub struct DatasetStore<B: BlobStore> {
    blob: B,
    window: ColumnWindow,
    current: RwLock<Option<Arc<Snapshot>>>,
}

impl<B: BlobStore> DatasetStore<B> {
    pub fn new(blob: B, window: ColumnWindow) -> Self {
        Self {
            blob,
            window,
            current: RwLock::new(None),
        }
    }

    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace(&self, next: Option<Arc<Snapshot>>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = next;
    }

    /// Parse `raw` and, only if that succeeds, persist it and make it current.
    /// A rejected upload leaves both the stored blob and the snapshot untouched.
    #[instrument(level = "info", skip(self, raw), fields(bytes = raw.len()))]
    pub fn upload(&self, raw: &[u8]) -> Result<Arc<Snapshot>, StoreError> {
        let snapshot = decode(raw)
            .and_then(|text| Snapshot::build(text, &self.window))
            .map_err(|e| {
                warn!(error = %e, "upload rejected");
                e
            })?;

        // Persist and swap under one guard so concurrent uploads cannot leave
        // the blob from one and the snapshot from the other.
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        self.blob.put(raw)?;
        let snapshot = Arc::new(snapshot);
        *current = Some(Arc::clone(&snapshot));
        drop(current);
        info!(
            clubs = snapshot.data.clubs().len(),
            players = snapshot.data.player_count(),
            rejected = snapshot.report.rejected_total(),
            "upload stored"
        );
        Ok(snapshot)
    }

    /// Re-read the persisted upload. Nothing stored clears the snapshot and
    /// returns `Ok(None)`; a stored blob that no longer parses clears it and
    /// returns the parse error.
    #[instrument(level = "info", skip(self))]
    pub fn reload(&self) -> Result<Option<Arc<Snapshot>>, StoreError> {
        let Some(raw) = self.blob.get()? else {
            info!("no stored upload");
            self.replace(None);
            return Ok(None);
        };

        match decode(&raw).and_then(|text| Snapshot::build(text, &self.window)) {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                self.replace(Some(Arc::clone(&snapshot)));
                info!(clubs = snapshot.data.clubs().len(), "reloaded stored upload");
                Ok(Some(snapshot))
            }
            Err(e) => {
                warn!(error = %e, "stored upload no longer parses");
                self.replace(None);
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    const GOOD: &str = "Surname,Name,Nominated Club,Team,Total Rounds Played\n\
                        Smith,John,Oak FC,Premier 2,5\n\
                        Smith,John,Oak FC,Premier 1,2\n";
    const OTHER: &str = "Surname,Name,Nominated Club,Team,Total Rounds Played\n\
                         Jones,Amy,Elm United,Division 3,7\n";
    const BAD: &str = "Surname,Name,Team\nSmith,John,Premier 2\n";

    fn store() -> DatasetStore<MemoryBlobStore> {
        crate::test_support::init_test_logging();
        DatasetStore::new(MemoryBlobStore::default(), ColumnWindow::default())
    }

    #[test]
    fn upload_replaces_the_whole_snapshot() -> Result<()> {
        let store = store();
        assert!(store.current().is_none());

        let first = store.upload(GOOD.as_bytes())?;
        assert_eq!(first.data.clubs(), ["Oak FC"]);

        let second = store.upload(OTHER.as_bytes())?;
        assert_eq!(second.data.clubs(), ["Elm United"]);
        assert!(second.data.players_for("Oak FC").is_empty());

        // an earlier reader keeps its own consistent view
        assert_eq!(first.data.clubs(), ["Oak FC"]);
        assert_eq!(store.current().unwrap().data.clubs(), ["Elm United"]);
        Ok(())
    }

    #[test]
    fn failed_upload_keeps_previous_state() -> Result<()> {
        let store = store();
        store.upload(GOOD.as_bytes())?;

        let err = store.upload(BAD.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Parse(ParseError::MissingColumn(ref c)) if c == "Nominated Club"
        ));
        assert_eq!(store.current().unwrap().data.clubs(), ["Oak FC"]);
        assert_eq!(store.blob.get()?, Some(GOOD.as_bytes().to_vec()));
        Ok(())
    }

    #[test]
    fn reload_reads_back_what_was_uploaded() -> Result<()> {
        let tmp = tempdir()?;
        let path = tmp.path().join("matches.csv");

        let writer = DatasetStore::new(FsBlobStore::new(&path), ColumnWindow::default());
        writer.upload(GOOD.as_bytes())?;

        let reader = DatasetStore::new(FsBlobStore::new(&path), ColumnWindow::default());
        let snap = reader.reload()?.expect("stored upload should load");
        assert_eq!(snap.data.players_for("Oak FC")[0].total_club_matches, 7);
        assert_eq!(snap.source_bytes, GOOD.len());
        Ok(())
    }

    #[test]
    fn reload_without_upload_is_none() -> Result<()> {
        let store = store();
        assert!(store.reload()?.is_none());
        assert!(store.current().is_none());
        Ok(())
    }

    #[test]
    fn reload_of_unparsable_blob_clears_snapshot() -> Result<()> {
        let store = store();
        store.upload(GOOD.as_bytes())?;
        store.blob.put(b"garbage\n")?;

        assert!(matches!(store.reload(), Err(StoreError::Parse(_))));
        assert!(store.current().is_none());
        Ok(())
    }

    #[test]
    fn concurrent_uploads_leave_blob_and_snapshot_in_step() -> Result<()> {
        let store = store();
        let uploads = [GOOD, OTHER];
        for _ in 0..20 {
            std::thread::scope(|s| {
                for body in uploads {
                    let store = &store;
                    s.spawn(move || store.upload(body.as_bytes()).map(|_| ()));
                }
            });
            let stored = store.blob.get()?.expect("an upload was stored");
            let current = store.current().expect("an upload is current");
            assert_eq!(stored.len(), current.source_bytes);
            let expected = if stored == GOOD.as_bytes() { "Oak FC" } else { "Elm United" };
            assert_eq!(current.data.clubs(), [expected]);
        }
        Ok(())
    }

    #[test]
    fn invalid_utf8_upload_is_rejected() {
        let store = store();
        let err = store.upload(b"\xff\xfe").unwrap_err();
        assert!(matches!(err, StoreError::Parse(ParseError::MalformedInput(_))));
    }
}
