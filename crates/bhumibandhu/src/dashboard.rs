//! Derived views over the record collection.
//!
//! Everything here is a pure function of the records passed in and is
//! recomputed on each call.

use std::fmt;

use serde::Serialize;

use crate::record::{AllotmentStatus, Coordinates, DisputeStatus, LandRecord};

/// Summary counts shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    /// Number of records.
    pub total_records: usize,
    /// Number of disputes across all records.
    pub total_disputes: usize,
    /// Disputes with status `Resolved`.
    pub resolved_disputes: usize,
    /// Every dispute that is not resolved.
    pub pending_disputes: usize,
}

impl DashboardStats {
    /// Compute the counts for `records`.
    #[must_use]
    pub fn from_records(records: &[LandRecord]) -> Self {
        let total_disputes: usize = records.iter().map(|r| r.disputes.len()).sum();
        let resolved_disputes: usize = records
            .iter()
            .map(|r| r.disputes_with_status(DisputeStatus::Resolved))
            .sum();

        Self {
            total_records: records.len(),
            total_disputes,
            resolved_disputes,
            pending_disputes: total_disputes - resolved_disputes,
        }
    }
}

/// A record in the dashboard's recent list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecentRecord<'a> {
    /// The record.
    pub record: &'a LandRecord,
    /// How many of its disputes have status `Pending`.
    pub pending_disputes: usize,
}

/// The first `limit` records (the newest, given store order).
#[must_use]
pub fn recent_records(records: &[LandRecord], limit: usize) -> Vec<RecentRecord<'_>> {
    records
        .iter()
        .take(limit)
        .map(|record| RecentRecord {
            record,
            pending_disputes: record.disputes_with_status(DisputeStatus::Pending),
        })
        .collect()
}

/// Status badge shown next to a record in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordBadge {
    /// Allotment is awaiting verification.
    PendingVerification,
    /// At least one dispute is pending.
    Dispute,
    /// Nothing outstanding.
    Clear,
}

impl RecordBadge {
    /// Badge for `record`. Verification outranks disputes.
    #[must_use]
    pub fn for_record(record: &LandRecord) -> Self {
        if record.allotment_status == Some(AllotmentStatus::PendingVerification) {
            Self::PendingVerification
        } else if record.disputes_with_status(DisputeStatus::Pending) > 0 {
            Self::Dispute
        } else {
            Self::Clear
        }
    }
}

impl fmt::Display for RecordBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PendingVerification => write!(f, "Pending Verification"),
            Self::Dispute => write!(f, "Dispute"),
            Self::Clear => write!(f, "Clear"),
        }
    }
}

/// Records that carry coordinates, paired with them.
#[must_use]
pub fn mapped_records(records: &[LandRecord]) -> Vec<(&LandRecord, Coordinates)> {
    records
        .iter()
        .filter_map(|r| r.coordinates.map(|c| (r, c)))
        .collect()
}
