//! Metric declarations.
//!
//! Metrics go through the `metrics` facade; nothing is recorded unless the
//! host installs a recorder.

use metrics::{counter, describe_counter, describe_gauge, gauge, Unit};

use crate::model::PointOutcome;

/// The kind of metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
}

/// A metric declaration with its metadata.
#[derive(Debug, Clone)]
pub struct Metric {
    pub name: &'static str,
    pub kind: MetricKind,
    pub description: &'static str,
    pub unit: Unit,
    /// Expected label keys.
    pub labels: &'static [&'static str],
}

impl Metric {
    const fn new(name: &'static str, kind: MetricKind, unit: Unit) -> Self {
        Self {
            name,
            kind,
            description: "",
            unit,
            labels: &[],
        }
    }

    pub const fn counter(name: &'static str) -> Self {
        Self::new(name, MetricKind::Counter, Unit::Count)
    }

    pub const fn gauge(name: &'static str, unit: Unit) -> Self {
        Self::new(name, MetricKind::Gauge, unit)
    }

    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub const fn with_labels(mut self, labels: &'static [&'static str]) -> Self {
        self.labels = labels;
        self
    }

    /// Register this metric's description with the installed recorder.
    pub fn describe(&self) {
        match self.kind {
            MetricKind::Counter => {
                describe_counter!(self.name, self.unit, self.description);
            }
            MetricKind::Gauge => {
                describe_gauge!(self.name, self.unit, self.description);
            }
        }
    }
}

/// All metrics recorded by the model.
pub mod metric_defs {
    use super::Metric;
    use metrics::Unit;

    pub const QUERY_POINTS: Metric = Metric::counter("ivlsu.query.points")
        .with_description("Query points processed");

    pub const QUERY_NOT_AVAILABLE: Metric = Metric::counter("ivlsu.query.not_available")
        .with_description("Query points answered with the not-available sentinel")
        .with_labels(&["reason"]);

    pub const MODEL_BYTES_RESIDENT: Metric = Metric::gauge("ivlsu.model.bytes_resident", Unit::Bytes)
        .with_description("Velocity data held in memory");

    pub const ALL: &[Metric] = &[QUERY_POINTS, QUERY_NOT_AVAILABLE, MODEL_BYTES_RESIDENT];
}

/// Register descriptions for every metric. Call once after installing a
/// recorder.
pub fn describe_metrics() {
    for metric in metric_defs::ALL {
        metric.describe();
    }
}

pub(crate) fn record_outcome(outcome: &PointOutcome) {
    counter!(metric_defs::QUERY_POINTS.name).increment(1);
    if let Some(reason) = outcome.not_available_reason() {
        counter!(metric_defs::QUERY_NOT_AVAILABLE.name, "reason" => reason).increment(1);
    }
}

pub(crate) fn record_resident_bytes(bytes: usize) {
    gauge!(metric_defs::MODEL_BYTES_RESIDENT.name).set(bytes as f64);
}
