//! Metrics sinks for selection diagnostics.
//!
//! Scoring emits a handful of scalar diagnostics per round (score extremes,
//! jitter escalations). The sink is a seam: production callers forward to
//! their telemetry of choice, tests capture with [`MemorySink`], and the
//! default [`NoOpSink`] discards everything.

use std::sync::{Arc, Mutex};

/// Receiver for named scalar diagnostics.
pub trait MetricsSink {
    /// Records one named value.
    fn record(&self, name: &str, value: f64);
}

impl<S: MetricsSink + ?Sized> MetricsSink for Arc<S> {
    fn record(&self, name: &str, value: f64) {
        (**self).record(name, value);
    }
}

/// Sink that discards every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSink;

impl MetricsSink for NoOpSink {
    fn record(&self, _name: &str, _value: f64) {}
}

/// Sink that keeps every record in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<(String, f64)>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all records so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn records(&self) -> Vec<(String, f64)> {
        self.records.lock().expect("metrics lock poisoned").clone()
    }

    /// Returns the most recent value recorded under `name`, if any.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn last(&self, name: &str) -> Option<f64> {
        self.records
            .lock()
            .expect("metrics lock poisoned")
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|&(_, v)| v)
    }
}

impl MetricsSink for MemorySink {
    fn record(&self, name: &str, value: f64) {
        self.records
            .lock()
            .expect("metrics lock poisoned")
            .push((name.to_string(), value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_sink_accepts_records() {
        let sink = NoOpSink;
        sink.record("anything", 1.0);
    }

    #[test]
    fn test_memory_sink_keeps_order() {
        let sink = MemorySink::new();
        sink.record("a", 1.0);
        sink.record("b", 2.0);
        sink.record("a", 3.0);
        assert_eq!(
            sink.records(),
            vec![
                ("a".to_string(), 1.0),
                ("b".to_string(), 2.0),
                ("a".to_string(), 3.0)
            ]
        );
    }

    #[test]
    fn test_memory_sink_last() {
        let sink = MemorySink::new();
        assert_eq!(sink.last("missing"), None);
        sink.record("x", 1.0);
        sink.record("x", 2.0);
        assert_eq!(sink.last("x"), Some(2.0));
    }
}
