//! Clipping stage: restrict a sample to a time window
//!
//! The window is `[end - duration, end]`, inclusive at both ends, where
//! either side may be absent. With no end time the trailing duration is
//! measured back from the context's `now` and no upper bound applies.
//!
//! The stage relies on the order the sample declares. Once a point on the
//! far side of the window is seen, no later point can be in range, so the
//! stage stops and disposes its upstream: it never pulls more than one point
//! beyond the window.

use super::{SampleContext, SampleStats};
use crate::error::Result;
use crate::sample::DataSample;
use crate::types::{DataPoint, SampleOrder};
use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Restrict `sample` to points no later than `end_time` and no earlier than
/// `duration` before it
///
/// With neither bound the sample is returned untouched.
pub fn clip<'a>(
    sample: DataSample<'a>,
    end_time: Option<DateTime<FixedOffset>>,
    duration: Option<TimeDelta>,
    ctx: &SampleContext,
) -> DataSample<'a> {
    if end_time.is_none() && duration.is_none() {
        return sample;
    }

    let upper = end_time.map(|t| t.with_timezone(&Utc));
    let anchor = upper.unwrap_or(ctx.now);
    let lower = duration.map(|d| {
        anchor
            .checked_sub_signed(d)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    });

    debug!(?lower, ?upper, order = ?sample.properties().order, "building clip stage");
    ctx.stats().stage_built();

    let properties = sample.properties().clone();
    let raw = sample.raw_log();
    let order = properties.order;
    DataSample::derived(
        properties,
        raw,
        ClipPoints {
            upstream: sample,
            lower,
            upper,
            order,
            last: None,
            finished: false,
            stats: ctx.stats_handle(),
        },
    )
}

struct ClipPoints<'a> {
    upstream: DataSample<'a>,
    lower: Option<DateTime<Utc>>,
    upper: Option<DateTime<Utc>>,
    order: SampleOrder,
    last: Option<DateTime<Utc>>,
    finished: bool,
    stats: Arc<SampleStats>,
}

/// Where a point lies relative to the window, in enumeration order
enum Position {
    Before,
    Inside,
    Past,
}

impl ClipPoints<'_> {
    fn locate(&self, t: DateTime<Utc>) -> Position {
        let after_upper = self.upper.is_some_and(|u| t > u);
        let before_lower = self.lower.is_some_and(|l| t < l);
        match self.order {
            SampleOrder::NewestFirst if after_upper => Position::Before,
            SampleOrder::NewestFirst if before_lower => Position::Past,
            SampleOrder::OldestFirst if before_lower => Position::Before,
            SampleOrder::OldestFirst if after_upper => Position::Past,
            _ => Position::Inside,
        }
    }

    fn check_order(&mut self, t: DateTime<Utc>) {
        if let Some(last) = self.last {
            let out_of_order = match self.order {
                SampleOrder::NewestFirst => t > last,
                SampleOrder::OldestFirst => t < last,
            };
            if out_of_order {
                warn!(point = %t, previous = %last, order = ?self.order, "point out of declared order");
            }
        }
        self.last = Some(t);
    }

    fn finish(&mut self) {
        self.finished = true;
        self.upstream.dispose();
    }
}

impl Iterator for ClipPoints<'_> {
    type Item = Result<DataPoint>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            let point = match self.upstream.next() {
                None => {
                    self.finish();
                    return None;
                }
                Some(Err(e)) => {
                    self.finish();
                    return Some(Err(e));
                }
                Some(Ok(point)) => point,
            };

            let t = point.timestamp.with_timezone(&Utc);
            self.check_order(t);
            match self.locate(t) {
                Position::Before => {
                    trace!(point = %t, "clipped before window");
                    self.stats.dropped();
                }
                Position::Past => {
                    trace!(point = %t, "left window, stopping");
                    self.stats.dropped();
                    self.finish();
                    return None;
                }
                Position::Inside => {
                    self.stats.emitted();
                    return Some(Ok(point));
                }
            }
        }
    }
}
