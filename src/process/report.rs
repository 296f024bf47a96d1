// src/process/report.rs

use serde::Serialize;
use std::collections::BTreeMap;

use super::normalize::{CountSource, RejectReason};

/// How many rejected rows are kept verbatim for display.
const MAX_SAMPLES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedSample {
    /// 1-based data record number, counted after the header row.
    pub record: usize,
    pub reason: String,
}

/// Data-quality summary of one parse. Rejected rows never reach aggregation,
/// this only makes them visible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseReport {
    pub records: usize,
    pub accepted: usize,
    pub from_competitions: usize,
    pub from_total: usize,
    pub rejected: BTreeMap<String, usize>,
    pub samples: Vec<RejectedSample>,
}

impl ParseReport {
    pub fn record_accepted(&mut self, source: CountSource) {
        self.records += 1;
        self.accepted += 1;
        match source {
            CountSource::Competitions => self.from_competitions += 1,
            CountSource::TotalColumn => self.from_total += 1,
        }
    }

    pub fn record_rejected(&mut self, record: usize, reason: &RejectReason) {
        self.records += 1;
        *self.rejected.entry(reason.kind().to_string()).or_default() += 1;
        if self.samples.len() < MAX_SAMPLES {
            self.samples.push(RejectedSample {
                record,
                reason: reason.to_string(),
            });
        }
    }

    pub fn rejected_total(&self) -> usize {
        self.rejected.values().sum()
    }
}
