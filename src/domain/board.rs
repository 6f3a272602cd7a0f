//! Shared holder for the latest batch of opportunities.
//!
//! Each refresh reserves a sequence with [`OpportunityBoard::begin`], computes
//! a complete batch off to the side and swaps it in with
//! [`OpportunityBoard::publish_as`]. A batch from a refresh that began earlier
//! than the one on the board is discarded. Readers take an [`Arc`] snapshot
//! and never see a half-built batch.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::opportunity::OpportunityRecord;

/// One immutable set of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Monotonic batch number, starting at 1 for the first publish.
    pub sequence: u64,
    /// When the batch was published; `None` before the first publish.
    pub computed_at: Option<DateTime<Utc>>,
    /// Records in profit order.
    pub records: Vec<OpportunityRecord>,
}

impl Batch {
    fn empty() -> Self {
        Self {
            sequence: 0,
            computed_at: None,
            records: Vec::new(),
        }
    }
}

/// Latest results, swapped atomically.
#[derive(Debug)]
pub struct OpportunityBoard {
    current: RwLock<Arc<Batch>>,
    sequence: AtomicU64,
}

impl Default for OpportunityBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl OpportunityBoard {
    /// An empty board at sequence 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(Batch::empty())),
            sequence: AtomicU64::new(0),
        }
    }

    /// Reserve the sequence for a refresh that is about to start computing.
    pub fn begin(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Install the results of the refresh that reserved `sequence`.
    ///
    /// Returns false, leaving the board unchanged, when a refresh that began
    /// later has already published.
    pub fn publish_as(&self, sequence: u64, records: Vec<OpportunityRecord>) -> bool {
        let batch = Arc::new(Batch {
            sequence,
            computed_at: Some(Utc::now()),
            records,
        });

        let mut current = self.current.write();
        if batch.sequence <= current.sequence {
            return false;
        }
        *current = batch;
        true
    }

    /// Reserve a sequence and publish in one step. Returns the sequence.
    pub fn publish(&self, records: Vec<OpportunityRecord>) -> u64 {
        let sequence = self.begin();
        self.publish_as(sequence, records);
        sequence
    }

    /// The current batch. Cheap; clones an `Arc`.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Batch> {
        Arc::clone(&self.current.read())
    }
}
