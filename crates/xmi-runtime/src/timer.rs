//! Per-entry-point timing ledger
//!
//! Records elapsed wall-clock time for every native call, keyed by entry
//! point name, in call order.

use std::collections::BTreeMap;
use std::time::Duration;

/// Elapsed-time samples collected for one library
#[derive(Debug, Clone)]
pub struct TimerLedger {
    /// Library name used in reports
    name: String,
    /// Samples per entry point (name → samples in call order)
    samples: BTreeMap<String, Vec<Duration>>,
}

impl TimerLedger {
    /// Create an empty ledger
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            samples: BTreeMap::new(),
        }
    }

    /// Record one elapsed-time sample
    pub fn record(&mut self, entry_point: &str, elapsed: Duration) {
        self.samples
            .entry(entry_point.to_string())
            .or_default()
            .push(elapsed);
    }

    /// Samples recorded for an entry point
    pub fn samples(&self, entry_point: &str) -> &[Duration] {
        self.samples
            .get(entry_point)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of calls recorded for an entry point
    pub fn call_count(&self, entry_point: &str) -> usize {
        self.samples(entry_point).len()
    }

    /// Total time spent in an entry point
    pub fn total(&self, entry_point: &str) -> Duration {
        self.samples(entry_point).iter().sum()
    }

    /// Entry points with at least one sample, in name order
    pub fn entry_points(&self) -> impl Iterator<Item = &str> {
        self.samples.keys().map(String::as_str)
    }

    /// Total over every entry point
    pub fn grand_total(&self) -> Duration {
        self.samples.values().flatten().sum()
    }

    /// Log per-entry totals and return the grand total
    pub fn report_totals(&self) -> Duration {
        for entry_point in self.entry_points() {
            tracing::info!(
                "Elapsed time for {}.{}: {:0.4} seconds",
                self.name,
                entry_point,
                self.total(entry_point).as_secs_f64()
            );
        }
        self.grand_total()
    }
}
