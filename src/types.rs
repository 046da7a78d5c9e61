//! Core data types shared by every pipeline stage
//!
//! # Key Types
//!
//! - **`DataPoint`**: one timestamped measurement with value, label and note
//! - **`MetricId`**: identifier of the logical metric a point belongs to
//! - **`DiscreteValue`**: one entry of a discrete metric's label catalog
//! - **`SampleOrder`**: the enumeration order a sample promises
//! - **`DataSampleProperties`**: metadata travelling with a sample through the stages
//!
//! # Example
//!
//! ```rust
//! use chrono::DateTime;
//! use kuba_sampling::types::DataPoint;
//!
//! let ts = DateTime::parse_from_rfc3339("2021-06-15T10:30:00+01:00").unwrap();
//! let point = DataPoint::new(ts, 1, 42.5).with_label("high");
//! assert_eq!(point.label, "high");
//! ```

use crate::time::TemporalAmount;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Identifier of a logical metric
pub type MetricId = i64;

/// Single time-series measurement
///
/// Points are immutable values: stages that change a value build a new point
/// with the same timestamp, label and note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Zoned instant of the measurement
    pub timestamp: DateTime<FixedOffset>,

    /// Metric this point belongs to
    pub metric_id: MetricId,

    /// Measured value
    pub value: f64,

    /// Label, empty when the point has none
    #[serde(default)]
    pub label: String,

    /// Free-form note, empty when the point has none
    #[serde(default)]
    pub note: String,
}

impl DataPoint {
    /// Create a point without label or note
    pub fn new(timestamp: DateTime<FixedOffset>, metric_id: MetricId, value: f64) -> Self {
        Self {
            timestamp,
            metric_id,
            value,
            label: String::new(),
            note: String::new(),
        }
    }

    /// Attach a label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Attach a note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Copy of this point carrying a different value
    pub fn with_value(&self, value: f64) -> Self {
        Self {
            value,
            ..self.clone()
        }
    }
}

/// One entry of a discrete metric's catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiscreteValue {
    /// Identifier used by label filters
    pub index: i32,

    /// Label carried by points with this value
    pub label: String,
}

impl DiscreteValue {
    /// Create a catalog entry
    pub fn new(index: i32, label: impl Into<String>) -> Self {
        Self {
            index,
            label: label.into(),
        }
    }
}

/// Enumeration order of a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SampleOrder {
    /// Most recent point first, the persistence layer's native order
    #[default]
    NewestFirst,
    /// Oldest point first, as produced by bucket aggregation
    OldestFirst,
}

/// Metadata carried by a sample
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataSampleProperties {
    /// Values are durations in seconds rather than plain quantities
    pub is_duration: bool,

    /// Spacing between consecutive points when the sample is regular
    pub regularity: Option<TemporalAmount>,

    /// Order in which points are produced
    pub order: SampleOrder,

    /// Label catalog; `Some` marks every point of the sample as discrete
    pub discrete_values: Option<Vec<DiscreteValue>>,
}

impl DataSampleProperties {
    /// Properties of a continuous sample in the default order
    pub fn continuous(is_duration: bool) -> Self {
        Self {
            is_duration,
            ..Default::default()
        }
    }

    /// Properties of a discrete sample with the given catalog
    pub fn discrete(values: Vec<DiscreteValue>) -> Self {
        Self {
            discrete_values: Some(values),
            ..Default::default()
        }
    }

    /// Replace the declared order
    pub fn with_order(mut self, order: SampleOrder) -> Self {
        self.order = order;
        self
    }

    /// Whether points of this sample are discrete
    pub fn is_discrete(&self) -> bool {
        self.discrete_values.is_some()
    }

    /// Catalog index for `label`, if the sample is discrete and knows it
    pub fn discrete_index(&self, label: &str) -> Option<i32> {
        self.discrete_values
            .as_ref()?
            .iter()
            .find(|v| v.label == label)
            .map(|v| v.index)
    }
}
