//! Kuba Sampling - lazy time-series sampling and calendar-aligned aggregation
//!
//! This library provides composable stages over streams of data points:
//! - Clipping to a time window
//! - Value and label filtering for continuous and discrete metrics
//! - Moving aggregation over a trailing window
//! - Bucketing by fixed durations or calendar periods, honoring the
//!   configured first day of week, start time of day and time zone
//!
//! Stages pull lazily from their upstream and release it (closing any
//! underlying cursor) as soon as they no longer need it.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod sample;
pub mod time;
pub mod types;

/// Clip, filter, moving aggregation and bucket aggregation stages
pub mod pipeline;

/// Configuration management with TOML support
pub mod config;

/// Tracing subscriber setup
pub mod telemetry;

// Re-export main types
pub use config::Config;
pub use error::{Error, Result};
pub use pipeline::{SampleContext, SampleStats};
pub use sample::{DataPointSource, DataSample, MemorySource, Page};
pub use time::{AggregationPreferences, Period, TemporalAmount, TimeHelper};
pub use types::{DataPoint, DataSampleProperties, DiscreteValue, MetricId, SampleOrder};
