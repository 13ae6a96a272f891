use crate::monitor::{MeasurementType, Monitor};
use std::time::Instant;

/// A short-lived, stack-allocated capability for timing a pipeline step and recording
/// the duration into a [Monitor] when it completes.
///
/// Modeled as a plain enum rather than a trait object (per the functional-interfaces
/// design note): a [Ticker] is either actively timing against a live [Monitor], or a
/// cheap no-op substituted when the [MeasurementType] is disabled in configuration.
pub enum Ticker<'a> {
    Recording {
        monitor: &'a Monitor,
        measurement_type: MeasurementType,
        started_at: Instant,
    },
    NoOp,
}

impl<'a> Ticker<'a> {
    /// Starts a [Ticker] for the given `measurement_type` against `monitor`, or a
    /// [Ticker::NoOp] if that type is not enabled.
    pub fn start(monitor: &'a Monitor, measurement_type: MeasurementType) -> Ticker<'a> {
        if monitor.is_enabled(measurement_type) {
            Ticker::Recording {
                monitor,
                measurement_type,
                started_at: Instant::now(),
            }
        } else {
            Ticker::NoOp
        }
    }

    /// Stops the [Ticker] and records the elapsed duration, if it is not a no-op.
    pub fn stop_and_record(self) {
        if let Ticker::Recording {
            monitor,
            measurement_type,
            started_at,
        } = self
        {
            let elapsed_nanos = started_at.elapsed().as_nanos() as u64;
            monitor.record(measurement_type, elapsed_nanos);
        }
    }
}
