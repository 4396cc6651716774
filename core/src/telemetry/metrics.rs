use serde::Serialize;
use std::sync::Mutex;

/// Running counters surfaced on the debug overlay.
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub resolved: usize,
    pub corrections: usize,
    pub rejected: usize,
}

#[derive(Default)]
struct Metrics {
    resolved: usize,
    corrections: usize,
    rejected: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
        }
    }

    pub fn record_resolved(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.resolved += 1;
        }
    }

    pub fn record_corrections(&self, count: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.corrections += count;
        }
    }

    pub fn record_rejected(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.rejected += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            MetricsSnapshot {
                resolved: metrics.resolved,
                corrections: metrics.corrections,
                rejected: metrics.rejected,
            }
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = MetricsRecorder::new();
        metrics.record_resolved();
        metrics.record_resolved();
        metrics.record_corrections(3);
        metrics.record_rejected();
        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                resolved: 2,
                corrections: 3,
                rejected: 1,
            }
        );
    }
}
