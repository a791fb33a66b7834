//! Lot builder
//!
//! An operator builds a lot by naming it and then repeatedly looking up a
//! seal, reviewing the matching shipment and appending it. [`LotSession`]
//! holds one operator's progress through that sequence:
//!
//! ```text
//!   Idle ──start──▶ Naming ──name──▶ Searching ──hit──▶ Reviewing
//!                     ▲                  ▲  │miss          │ │hit
//!                     │                  │  └──(no change) │ └──▶ Reviewing
//!   (any) ──start─────┘                  └─────append──────┘
//! ```
//!
//! The draft lives only in memory. Starting a new lot throws it away and
//! reports what was thrown away; nothing is written back to the store.

use crate::bucket::{Bucket, BucketCounts};
use crate::db::ShipmentRecord;
use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LotState {
    Idle,
    Naming,
    Searching,
    Reviewing,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LotError {
    #[error("Lot label cannot be empty")]
    EmptyLabel,

    #[error("No shipment found with seal {0}")]
    SealNotFound(i64),

    #[error("Cannot {action} while {state:?}")]
    InvalidTransition { action: &'static str, state: LotState },
}

/// Snapshot of one shipment taken when it was looked up
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LotEntry {
    pub permit: String,
    pub seal: Option<i64>,
    pub origin_owner: Option<String>,
    pub origin_property: Option<String>,
    /// Non-zero buckets only, in canonical order
    #[serde(serialize_with = "serialize_buckets")]
    pub buckets: Vec<(Bucket, i64)>,
}

impl LotEntry {
    pub fn from_record(record: &ShipmentRecord) -> Self {
        Self {
            permit: record.permit.clone(),
            seal: record.seal,
            origin_owner: record.origin_owner.clone(),
            origin_property: record.origin_property.clone(),
            buckets: record.buckets.nonzero(),
        }
    }

    pub fn count(&self, bucket: Bucket) -> i64 {
        self.buckets
            .iter()
            .find(|(b, _)| *b == bucket)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }
}

#[derive(Serialize)]
struct BucketCount {
    bucket: &'static str,
    count: i64,
}

fn serialize_buckets<S: Serializer>(buckets: &[(Bucket, i64)], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(buckets.iter().map(|&(b, count)| BucketCount {
        bucket: b.label(),
        count,
    }))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LotDraft {
    pub label: String,
    pub entries: Vec<LotEntry>,
}

impl LotDraft {
    /// Bucket sums over every entry
    pub fn totals(&self) -> BucketCounts {
        let mut totals = BucketCounts::default();
        for entry in &self.entries {
            for &(bucket, count) in &entry.buckets {
                *totals.get_mut(bucket) += count;
            }
        }
        totals
    }
}

/// What a reset threw away
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Discarded {
    pub label: Option<String>,
    pub entries: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LotSession {
    state: LotState,
    draft: Option<LotDraft>,
    pending: Option<LotEntry>,
}

impl Default for LotSession {
    fn default() -> Self {
        Self::new()
    }
}

impl LotSession {
    pub fn new() -> Self {
        Self {
            state: LotState::Idle,
            draft: None,
            pending: None,
        }
    }

    pub fn state(&self) -> LotState {
        self.state
    }

    pub fn draft(&self) -> Option<&LotDraft> {
        self.draft.as_ref()
    }

    pub fn pending(&self) -> Option<&LotEntry> {
        self.pending.as_ref()
    }

    /// Drop any draft and pending candidate and wait for a label
    ///
    /// Allowed from every state. No confirmation is asked for.
    pub fn start_new_lot(&mut self) -> Discarded {
        let discarded = match self.draft.take() {
            Some(draft) => Discarded {
                label: Some(draft.label),
                entries: draft.entries.len(),
            },
            None => Discarded::default(),
        };
        self.pending = None;
        self.state = LotState::Naming;

        if discarded.entries > 0 {
            info!(
                label = discarded.label.as_deref().unwrap_or(""),
                entries = discarded.entries,
                "Discarded lot draft"
            );
        }
        discarded
    }

    /// Fix the lot label; it cannot be changed afterwards
    pub fn name_lot(&mut self, label: &str) -> std::result::Result<(), LotError> {
        self.expect_state("name a lot", &[LotState::Naming])?;

        let label = label.trim();
        if label.is_empty() {
            return Err(LotError::EmptyLabel);
        }

        self.draft = Some(LotDraft {
            label: label.to_string(),
            entries: Vec::new(),
        });
        self.state = LotState::Searching;
        debug!(label, "Lot named");
        Ok(())
    }

    /// Fails unless the session is waiting for a seal
    pub fn ensure_can_search(&self) -> std::result::Result<(), LotError> {
        self.expect_state("search", &[LotState::Searching, LotState::Reviewing])
    }

    /// Stage the result of a seal lookup for review
    ///
    /// A miss leaves the session exactly as it was. A hit replaces any
    /// candidate already under review.
    pub fn apply_lookup(&mut self, seal: i64, found: Option<ShipmentRecord>) -> std::result::Result<&LotEntry, LotError> {
        self.ensure_can_search()?;

        let record = found.ok_or(LotError::SealNotFound(seal))?;
        self.state = LotState::Reviewing;
        Ok(self.pending.insert(LotEntry::from_record(&record)))
    }

    /// Append the candidate under review to the end of the draft
    pub fn confirm_append(&mut self) -> std::result::Result<&LotDraft, LotError> {
        self.expect_state("append", &[LotState::Reviewing])?;

        let (Some(entry), Some(draft)) = (self.pending.take(), self.draft.as_mut()) else {
            return Err(LotError::InvalidTransition {
                action: "append",
                state: self.state,
            });
        };

        draft.entries.push(entry);
        self.state = LotState::Searching;
        Ok(draft)
    }

    fn expect_state(&self, action: &'static str, allowed: &[LotState]) -> std::result::Result<(), LotError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(LotError::InvalidTransition {
                action,
                state: self.state,
            })
        }
    }
}
