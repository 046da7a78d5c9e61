//! Error types for the sampling pipeline

use crate::types::MetricId;
use thiserror::Error;

/// Main error type for the sampling pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// Failure reported by the persistence collaborator
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// A data point could not be interpreted
    #[error("Malformed point: {0}")]
    MalformedPoint(#[from] PointError),

    /// A stage parameter that would prevent the stage from terminating
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A stage that needs regular input was given a sample without a regularity
    #[error("Sample has no regularity")]
    MissingRegularity,

    /// A pipeline run on a worker thread did not complete
    #[error("Pipeline task failed: {0}")]
    Task(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by a data point source or its cursor
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    /// No data exists for the requested metric
    #[error("Metric not found: {0}")]
    MetricNotFound(MetricId),

    /// The cursor was read after being closed
    #[error("Cursor already closed")]
    CursorClosed,

    /// The underlying read failed
    #[error("Read failed: {0}")]
    ReadFailed(String),
}

/// Malformed input detected while evaluating a point
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PointError {
    /// A discrete point carries no label
    #[error("Discrete point of metric {metric_id} at {timestamp} has no label")]
    MissingLabel {
        /// Metric the point belongs to
        metric_id: MetricId,
        /// Point timestamp, RFC 3339
        timestamp: String,
    },

    /// A discrete point carries a label absent from the sample's catalog
    #[error("Label '{label}' of metric {metric_id} is not in the discrete catalog")]
    UnknownLabel {
        /// Metric the point belongs to
        metric_id: MetricId,
        /// The unresolved label
        label: String,
    },
}

/// Result type alias for sampling operations
pub type Result<T> = std::result::Result<T, Error>;
