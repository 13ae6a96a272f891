use crate::monitor::MeasurementType;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Which [MeasurementType]s should actually record samples.
///
/// Disabling a type substitutes [crate::monitor::Ticker::NoOp] on the hot path instead
/// of paying for a lock acquisition per call.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct MonitorConfig {
    /// Number of most-recent samples retained per [MeasurementType].
    pub ring_buffer_size: usize,

    /// Which [MeasurementType]s are enabled. `None` enables all of them.
    pub enabled_types: Option<Vec<MeasurementType>>,
}

impl Default for MonitorConfig {
    fn default() -> MonitorConfig {
        MonitorConfig {
            ring_buffer_size: 100,
            enabled_types: None,
        }
    }
}

/// A percentile/extremes summary of a [MeasurementType]'s recorded samples, in nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementSummary {
    pub count: usize,
    pub min_nanos: u64,
    pub max_nanos: u64,
    pub p50_nanos: u64,
    pub p95_nanos: u64,
    pub p99_nanos: u64,
}

/// Lock-striped ring buffers, one per [MeasurementType], storing the last N samples.
///
/// Each stripe has its own lock with no cross-stripe coordination: recording a
/// `SignatureVerify` sample never contends with recording a `CacheLookup` sample.
pub struct Monitor {
    stripes: Vec<Mutex<VecDeque<u64>>>,
    ring_buffer_size: usize,
    enabled: [bool; MeasurementType::COUNT],
}

impl Monitor {
    /// Creates a new [Monitor] from the given [MonitorConfig].
    pub fn new(config: MonitorConfig) -> Monitor {
        let enabled = std::array::from_fn(|i| match &config.enabled_types {
            None => true,
            Some(types) => types.iter().any(|t| t.index() == i),
        });

        Monitor {
            stripes: (0..MeasurementType::COUNT)
                .map(|_| Mutex::new(VecDeque::with_capacity(config.ring_buffer_size)))
                .collect(),
            ring_buffer_size: config.ring_buffer_size,
            enabled,
        }
    }

    /// Whether `measurement_type` is enabled in this [Monitor]'s configuration.
    pub fn is_enabled(&self, measurement_type: MeasurementType) -> bool {
        self.enabled[measurement_type.index()]
    }

    /// Records a single `duration_nanos` sample for `measurement_type`, evicting the
    /// oldest sample if the ring buffer is full.
    pub fn record(&self, measurement_type: MeasurementType, duration_nanos: u64) {
        let mut stripe = self.stripes[measurement_type.index()]
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if stripe.len() == self.ring_buffer_size {
            stripe.pop_front();
        }
        stripe.push_back(duration_nanos);
    }

    /// Computes a [MeasurementSummary] over the samples currently held for `measurement_type`.
    /// Returns `None` if no samples have been recorded yet.
    pub fn summary(&self, measurement_type: MeasurementType) -> Option<MeasurementSummary> {
        let stripe = self.stripes[measurement_type.index()]
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if stripe.is_empty() {
            return None;
        }

        let mut sorted: Vec<u64> = stripe.iter().copied().collect();
        sorted.sort_unstable();

        let percentile = |p: f64| -> u64 {
            let rank = ((sorted.len() - 1) as f64 * p).round() as usize;
            sorted[rank]
        };

        Some(MeasurementSummary {
            count: sorted.len(),
            min_nanos: *sorted.first().unwrap(),
            max_nanos: *sorted.last().unwrap(),
            p50_nanos: percentile(0.50),
            p95_nanos: percentile(0.95),
            p99_nanos: percentile(0.99),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_types_report_not_enabled() {
        let monitor = Monitor::new(MonitorConfig {
            ring_buffer_size: 10,
            enabled_types: Some(vec![MeasurementType::SignatureVerify]),
        });

        assert!(monitor.is_enabled(MeasurementType::SignatureVerify));
        assert!(!monitor.is_enabled(MeasurementType::CacheLookup));
    }

    #[test]
    fn summary_computes_percentiles_over_recorded_samples() {
        let monitor = Monitor::new(MonitorConfig::default());

        for nanos in 1..=100u64 {
            monitor.record(MeasurementType::CompleteValidation, nanos);
        }

        let summary = monitor.summary(MeasurementType::CompleteValidation).unwrap();
        assert_eq!(summary.count, 100);
        assert_eq!(summary.min_nanos, 1);
        assert_eq!(summary.max_nanos, 100);
        assert_eq!(summary.p50_nanos, 51);
    }

    #[test]
    fn ring_buffer_evicts_oldest_sample() {
        let monitor = Monitor::new(MonitorConfig {
            ring_buffer_size: 3,
            enabled_types: None,
        });

        monitor.record(MeasurementType::TokenParse, 1);
        monitor.record(MeasurementType::TokenParse, 2);
        monitor.record(MeasurementType::TokenParse, 3);
        monitor.record(MeasurementType::TokenParse, 4);

        let summary = monitor.summary(MeasurementType::TokenParse).unwrap();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.min_nanos, 2);
        assert_eq!(summary.max_nanos, 4);
    }

    #[test]
    fn no_samples_yields_no_summary() {
        let monitor = Monitor::new(MonitorConfig::default());
        assert!(monitor.summary(MeasurementType::JwksOp).is_none());
    }
}
