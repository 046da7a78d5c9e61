//! Pipeline stages over data samples
//!
//! Each stage consumes a [`DataSample`](crate::sample::DataSample) and
//! returns a new one that owns its upstream, so stages compose like
//! decorators:
//!
//! ```text
//! cursor ─▶ DataSample ─▶ clip ─▶ filter ─▶ moving average
//!                                    └────▶ aggregate (materializes) ─▶ pad
//! ```
//!
//! Clipping, filtering, moving aggregation and padding are lazy: they pull from
//! their upstream only as far as their own consumer asks. Bucket
//! aggregation enumerates its whole input before returning.
//!
//! All stages receive a [`SampleContext`] carrying the aggregation
//! preferences, the time zone used for calendar alignment, the instant
//! treated as "now" and shared counters.

pub mod aggregation;
pub mod clip;
pub mod filter;
pub mod moving;
pub mod offload;
pub mod pad;
pub mod reduce;

pub use aggregation::{aggregate, aggregate_buckets, AggregatedBuckets, Bucket};
pub use clip::clip;
pub use filter::{filter_labels, filter_value};
pub use moving::{moving_aggregate, moving_average};
pub use pad::pad;
pub use reduce::Reducer;

use crate::time::{AggregationPreferences, TimeHelper};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// ============================================================================
// Statistics
// ============================================================================

/// Counters shared by every stage built from one context
#[derive(Debug, Default)]
pub struct SampleStats {
    /// Stages constructed
    pub stages_built: AtomicU64,

    /// Points passed downstream by lazy stages
    pub points_emitted: AtomicU64,

    /// Points discarded by clipping or filtering
    pub points_dropped: AtomicU64,

    /// Buckets produced by aggregation
    pub buckets_built: AtomicU64,
}

impl SampleStats {
    /// Get a snapshot of current statistics
    pub fn snapshot(&self) -> SampleStatsSnapshot {
        SampleStatsSnapshot {
            stages_built: self.stages_built.load(Ordering::Relaxed),
            points_emitted: self.points_emitted.load(Ordering::Relaxed),
            points_dropped: self.points_dropped.load(Ordering::Relaxed),
            buckets_built: self.buckets_built.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn stage_built(&self) {
        self.stages_built.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn emitted(&self) {
        self.points_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn dropped(&self) {
        self.points_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn buckets(&self, count: usize) {
        self.buckets_built.fetch_add(count as u64, Ordering::Relaxed);
    }
}

/// Snapshot of pipeline statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleStatsSnapshot {
    /// Stages constructed
    pub stages_built: u64,
    /// Points passed downstream
    pub points_emitted: u64,
    /// Points discarded
    pub points_dropped: u64,
    /// Buckets produced
    pub buckets_built: u64,
}

// ============================================================================
// Context
// ============================================================================

/// Inputs shared by the stages of one computation
///
/// Preferences are passed explicitly rather than read from global state so
/// several preference sets can be used side by side.
#[derive(Debug, Clone)]
pub struct SampleContext {
    /// Where days and weeks begin
    pub preferences: AggregationPreferences,

    /// Zone in which calendar boundaries are computed
    pub zone: Tz,

    /// Instant used when a stage is given no end time
    pub now: DateTime<Utc>,

    stats: Arc<SampleStats>,
}

impl SampleContext {
    /// Context anchored at the current wall-clock time
    pub fn new(preferences: AggregationPreferences, zone: Tz) -> Self {
        Self {
            preferences,
            zone,
            now: Utc::now(),
            stats: Arc::new(SampleStats::default()),
        }
    }

    /// Set a fixed "now"
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Set the alignment zone
    pub fn with_zone(mut self, zone: Tz) -> Self {
        self.zone = zone;
        self
    }

    /// Alignment helper for this context's preferences
    pub fn time_helper(&self) -> TimeHelper {
        TimeHelper::new(self.preferences)
    }

    /// Shared counters
    pub fn stats(&self) -> &SampleStats {
        &self.stats
    }

    pub(crate) fn stats_handle(&self) -> Arc<SampleStats> {
        self.stats.clone()
    }
}

impl Default for SampleContext {
    fn default() -> Self {
        Self::new(AggregationPreferences::default(), Tz::UTC)
    }
}
