//! Bounded append-only event history
//!
//! Assigns the global sequence number to each committed event and keeps the
//! most recent `capacity` records for late readers. Subscribers that need
//! everything use the broadcast channel instead.

use sas_core::{EventRecord, RegistryEvent};
use std::collections::VecDeque;

/// Sequenced event history
#[derive(Debug, Clone)]
pub struct EventLog {
    records: VecDeque<EventRecord>,
    capacity: usize,
    last_sequence: u64,
}

impl EventLog {
    /// History retaining at most `capacity` records (minimum 1)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
            last_sequence: 0,
        }
    }

    /// Sequence the event and append it, evicting the oldest record if full
    pub fn append(&mut self, timestamp: u64, event: RegistryEvent) -> EventRecord {
        self.last_sequence += 1;
        let record = EventRecord {
            sequence: self.last_sequence,
            timestamp,
            event,
        };
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record.clone());
        record
    }

    /// Up to `limit` most recent records, oldest first
    pub fn recent(&self, limit: usize) -> Vec<EventRecord> {
        let skip = self.records.len().saturating_sub(limit);
        self.records.iter().skip(skip).cloned().collect()
    }

    /// Sequence of the last committed event; 0 before the first
    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    /// Records currently retained
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing is retained
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
