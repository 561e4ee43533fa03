//! Per-command trace collector

use std::sync::{Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use super::record::{TraceFilter, TraceKind, TraceRecord};

/// Thread-safe, append-only sink for trace records
///
/// Records are stored in the order they arrive. A collector only ever
/// receives events while it is attached to a `TraceContext`.
#[derive(Debug)]
pub struct TraceCollector {
    id: Uuid,
    filter: TraceFilter,
    records: Mutex<Vec<TraceRecord>>,
}

impl TraceCollector {
    /// Create a collector that captures every capturable kind
    pub fn new() -> Self {
        Self::with_filter(TraceFilter::all())
    }

    /// Create a collector that captures only the kinds `filter` accepts
    pub fn with_filter(filter: TraceFilter) -> Self {
        Self {
            id: Uuid::new_v4(),
            filter,
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn filter(&self) -> TraceFilter {
        self.filter
    }

    pub fn accepts(&self, kind: TraceKind) -> bool {
        self.filter.accepts(kind)
    }

    pub(crate) fn push(&self, record: TraceRecord) {
        self.lock().push(record);
    }

    /// Copy of the records captured so far
    pub fn records(&self) -> Vec<TraceRecord> {
        self.lock().clone()
    }

    /// Take every captured record, leaving the collector empty
    pub fn drain(&self) -> Vec<TraceRecord> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic mid-push leaves the Vec intact, so a poisoned lock is still usable
    fn lock(&self) -> MutexGuard<'_, Vec<TraceRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for TraceCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(kind: TraceKind, text: &str) -> TraceRecord {
        TraceRecord::new(kind, text.to_string(), Utc::now())
    }

    #[test]
    fn test_collectors_have_distinct_ids() {
        assert_ne!(TraceCollector::new().id(), TraceCollector::new().id());
    }

    #[test]
    fn test_push_preserves_order() {
        let collector = TraceCollector::new();
        collector.push(record(TraceKind::Information, "one"));
        collector.push(record(TraceKind::Request, "two"));
        collector.push(record(TraceKind::Response, "three"));

        let texts: Vec<String> = collector
            .records()
            .iter()
            .map(|r| r.text().to_string())
            .collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_drain_empties_collector() {
        let collector = TraceCollector::new();
        collector.push(record(TraceKind::Information, "one"));

        assert_eq!(collector.drain().len(), 1);
        assert!(collector.is_empty());
        assert_eq!(collector.len(), 0);
    }

    #[test]
    fn test_filter_is_reported() {
        let collector = TraceCollector::with_filter(TraceFilter::messages_only());
        assert!(collector.accepts(TraceKind::Information));
        assert!(!collector.accepts(TraceKind::Request));
    }
}
