//! Duration aggregation: calendar-aligned buckets over a sample
//!
//! The stage enumerates its whole input, lays consecutive buckets of one
//! [`TemporalAmount`] each over the covered time range and reduces the
//! points of every bucket to a single value (a sum unless asked otherwise).
//!
//! # Bucket range
//!
//! With `end = end_time ?? now`:
//!
//! - the last bucket contains `latest = max(newest point, end)`
//! - the first bucket contains `min(oldest point, end - sample_duration, latest)`
//!
//! The first bucket start comes from [`TimeHelper::find_beginning_of_period`];
//! each following start adds one amount to the previous one
//! ([`add_amount`]), so calendar buckets keep their wall-clock boundaries
//! across month lengths and daylight-saving changes. Buckets cover
//! `[start, next_start)` and are emitted oldest first, each stamped with
//! its last instant (`next_start - 1ns`).
//!
//! Aggregation never discards input: points outside `[end - sample_duration, end]`
//! widen the range instead. Clip upstream to restrict it.
//!
//! [`TimeHelper::find_beginning_of_period`]: crate::time::TimeHelper::find_beginning_of_period

use super::{Reducer, SampleContext};
use crate::error::{Error, Result};
use crate::sample::DataSample;
use crate::time::{add_amount, TemporalAmount};
use crate::types::{DataPoint, DataSampleProperties, MetricId, SampleOrder};
use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use chrono_tz::Tz;
use tracing::debug;

/// One aggregation bucket and the points that fell into it
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    /// First instant of the bucket
    pub start: DateTime<Tz>,

    /// First instant of the following bucket
    pub end: DateTime<Tz>,

    /// Input points inside `[start, end)`, in input order
    pub points: Vec<DataPoint>,
}

impl Bucket {
    /// Last instant of the bucket, used as the output timestamp
    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        let last = self
            .end
            .clone()
            .checked_sub_signed(TimeDelta::nanoseconds(1))
            .unwrap_or_else(|| self.end.clone());
        last.fixed_offset()
    }

    /// Values of the bucket's points
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Sum of the bucket's values
    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.value).sum()
    }

    fn contains(&self, t: &DateTime<Tz>) -> bool {
        self.start <= *t && *t < self.end
    }
}

/// Materialized buckets, oldest first
#[derive(Debug, Clone)]
pub struct AggregatedBuckets {
    metric_id: MetricId,
    amount: TemporalAmount,
    is_duration: bool,
    buckets: Vec<Bucket>,
}

impl AggregatedBuckets {
    /// Buckets, oldest first
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    /// Number of buckets
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether there are no buckets
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Size of each bucket
    pub fn amount(&self) -> &TemporalAmount {
        &self.amount
    }

    /// One point per bucket carrying `reducer` of its values
    ///
    /// Buckets on which the reducer is undefined (an empty bucket under
    /// average, min or max) are skipped.
    pub fn reduce(self, reducer: Reducer) -> DataSample<'static> {
        let properties = DataSampleProperties {
            is_duration: self.is_duration,
            regularity: Some(self.amount),
            order: SampleOrder::OldestFirst,
            discrete_values: None,
        };
        let metric_id = self.metric_id;
        let points: Vec<DataPoint> = self
            .buckets
            .iter()
            .filter_map(|bucket| {
                let value = reducer.reduce(&bucket.values())?;
                Some(DataPoint::new(bucket.timestamp(), metric_id, value))
            })
            .collect();
        DataSample::from_points(points, properties)
    }

    /// Bucket totals; empty buckets are 0
    pub fn sum(self) -> DataSample<'static> {
        self.reduce(Reducer::Sum)
    }

    /// Bucket means; empty buckets are skipped
    pub fn average(self) -> DataSample<'static> {
        self.reduce(Reducer::Average)
    }

    /// Bucket maxima; empty buckets are skipped
    pub fn max(self) -> DataSample<'static> {
        self.reduce(Reducer::Max)
    }

    /// Bucket minima; empty buckets are skipped
    pub fn min(self) -> DataSample<'static> {
        self.reduce(Reducer::Min)
    }

    /// Bucket point counts; empty buckets are 0
    pub fn count(self) -> DataSample<'static> {
        self.reduce(Reducer::Count)
    }
}

/// Sum `sample` into consecutive buckets of `bucket_amount`
///
/// Emits one point per bucket, oldest first, including empty buckets as 0.
/// Output points carry `metric_id`.
pub fn aggregate(
    sample: DataSample<'_>,
    metric_id: MetricId,
    sample_duration: Option<TimeDelta>,
    end_time: Option<DateTime<FixedOffset>>,
    bucket_amount: &TemporalAmount,
    ctx: &SampleContext,
) -> Result<DataSample<'static>> {
    Ok(aggregate_buckets(sample, metric_id, sample_duration, end_time, bucket_amount, ctx)?.sum())
}

/// Distribute `sample` into buckets without reducing them
///
/// Fails if the sample yields an error or if `bucket_amount` does not move
/// time forward.
pub fn aggregate_buckets(
    sample: DataSample<'_>,
    metric_id: MetricId,
    sample_duration: Option<TimeDelta>,
    end_time: Option<DateTime<FixedOffset>>,
    bucket_amount: &TemporalAmount,
    ctx: &SampleContext,
) -> Result<AggregatedBuckets> {
    ctx.stats().stage_built();
    let is_duration = sample.properties().is_duration;
    let points = sample.collect_points()?;

    let zone = ctx.zone;
    let end = end_time
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or(ctx.now)
        .with_timezone(&zone);
    let in_zone = |p: &DataPoint| p.timestamp.with_timezone(&zone);
    let oldest = points.iter().map(in_zone).min();
    let newest = points.iter().map(in_zone).max();

    let latest = newest.map_or(end.clone(), |n| n.max(end.clone()));
    let mut earliest = latest.clone();
    if let Some(o) = oldest {
        earliest = earliest.min(o);
    }
    if let Some(before_end) = sample_duration.and_then(|d| end.clone().checked_sub_signed(d)) {
        earliest = earliest.min(before_end);
    }

    let first = ctx
        .time_helper()
        .find_beginning_of_period(&earliest, bucket_amount);
    let mut buckets = bucket_ranges(first, &latest, bucket_amount)?;

    for point in points {
        let t = in_zone(&point);
        // starts are sorted and contiguous from the first start to the last end
        let index = buckets
            .partition_point(|b| b.start <= t)
            .saturating_sub(1);
        let bucket = &mut buckets[index];
        if !bucket.contains(&t) {
            return Err(Error::InvalidParameter(format!(
                "point at {} falls outside buckets starting {}",
                t, bucket.start
            )));
        }
        bucket.points.push(point);
    }

    ctx.stats().buckets(buckets.len());
    debug!(
        buckets = buckets.len(),
        %bucket_amount,
        %earliest,
        %latest,
        "aggregated sample"
    );

    Ok(AggregatedBuckets {
        metric_id,
        amount: *bucket_amount,
        is_duration,
        buckets,
    })
}

/// Consecutive buckets from `first` until one contains `latest`
fn bucket_ranges(
    first: DateTime<Tz>,
    latest: &DateTime<Tz>,
    amount: &TemporalAmount,
) -> Result<Vec<Bucket>> {
    let mut buckets = Vec::new();
    let mut start = first;
    loop {
        let next = add_amount(&start, amount).ok_or_else(|| {
            Error::InvalidParameter(format!(
                "bucket amount {} overflows after {}",
                amount, start
            ))
        })?;
        if next <= start {
            return Err(Error::InvalidParameter(format!(
                "bucket amount {} does not advance time",
                amount
            )));
        }
        let done = next > *latest;
        buckets.push(Bucket {
            start,
            end: next.clone(),
            points: Vec::new(),
        });
        if done {
            return Ok(buckets);
        }
        start = next;
    }
}
