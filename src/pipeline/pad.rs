//! Padding of regular samples
//!
//! A regular sample (one point per period of its `regularity`, such as the
//! output of bucket aggregation) is extended with default-valued points so
//! that it reaches up to `end` and down to `end - duration`. Each generated
//! point is stamped with the last instant of its period, the same stamp
//! aggregation gives a bucket.
//!
//! Nothing is clipped: input points outside the range pass through and the
//! range only grows the output. Gaps between input points are left alone.
//!
//! Padding before the first input point follows the period grid of the range
//! boundary; padding after the last input point steps from that point by
//! whole periods.

use super::{SampleContext, SampleStats};
use crate::error::{Error, Result};
use crate::sample::DataSample;
use crate::time::{add_amount, subtract_amount, TemporalAmount, TimeHelper};
use crate::types::{DataPoint, MetricId, SampleOrder};
use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{debug, trace};

/// Pad `sample` with points of value `default_value` for every period of
/// its regularity ending in `(end - duration, end]`
///
/// `end` is `end_time`, or the context's `now`. Without a duration the range
/// is empty and only the input is returned. Generated points carry
/// `metric_id`.
///
/// Fails with [`Error::MissingRegularity`] if the sample declares no
/// regularity and with [`Error::InvalidParameter`] if the regularity does
/// not move time forward.
pub fn pad<'a>(
    sample: DataSample<'a>,
    metric_id: MetricId,
    duration: Option<TemporalAmount>,
    end_time: Option<DateTime<FixedOffset>>,
    default_value: f64,
    ctx: &SampleContext,
) -> Result<DataSample<'a>> {
    let properties = sample.properties().clone();
    let amount = properties.regularity.ok_or(Error::MissingRegularity)?;

    let zone = ctx.zone;
    let end = end_time
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or(ctx.now)
        .with_timezone(&zone);
    let start = match &duration {
        Some(d) => subtract_amount(&end, d).ok_or_else(|| {
            Error::InvalidParameter(format!("padding duration {} overflows before {}", d, end))
        })?,
        None => end.clone(),
    };

    let helper = ctx.time_helper();
    let anchor = helper.find_beginning_of_period(&end, &amount);
    if add_amount(&anchor, &amount).map_or(true, |next| next <= anchor) {
        return Err(Error::InvalidParameter(format!(
            "regularity {} does not advance time",
            amount
        )));
    }

    debug!(%amount, %start, %end, order = ?properties.order, "building padding stage");
    ctx.stats().stage_built();

    let raw = sample.raw_log();
    let order = properties.order;
    let padding = PadPoints {
        upstream: sample,
        amount,
        order,
        zone,
        start,
        end,
        metric_id,
        default_value,
        helper,
        phase: Phase::Start,
        stats: ctx.stats_handle(),
    };
    Ok(DataSample::derived(properties, raw, padding))
}

/// Periods are tracked by their boundary `b`; the point stamped for the
/// period ending at `b` has timestamp `b - 1ns`.
enum Phase {
    Start,
    Head { boundary: DateTime<Tz>, first: DataPoint },
    Data { pending: Option<DataPoint>, last: Option<DateTime<Tz>> },
    Tail { boundary: DateTime<Tz> },
    Done,
}

struct PadPoints<'a> {
    upstream: DataSample<'a>,
    amount: TemporalAmount,
    order: SampleOrder,
    zone: Tz,
    start: DateTime<Tz>,
    end: DateTime<Tz>,
    metric_id: MetricId,
    default_value: f64,
    helper: TimeHelper,
    phase: Phase,
    stats: Arc<SampleStats>,
}

fn stamp(boundary: &DateTime<Tz>) -> DateTime<Tz> {
    boundary
        .clone()
        .checked_sub_signed(TimeDelta::nanoseconds(1))
        .unwrap_or_else(|| boundary.clone())
}

impl PadPoints<'_> {
    /// Boundary after `boundary` in enumeration order, if time still moves
    fn step(&self, boundary: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        match self.order {
            SampleOrder::NewestFirst => {
                subtract_amount(boundary, &self.amount).filter(|b| b < boundary)
            }
            SampleOrder::OldestFirst => add_amount(boundary, &self.amount).filter(|b| b > boundary),
        }
    }

    /// Boundary of the first period to pad, on the grid of the range end
    /// enumeration starts from
    fn first_boundary(&self) -> Option<DateTime<Tz>> {
        match self.order {
            SampleOrder::NewestFirst => {
                let aligned = self.helper.find_beginning_of_period(&self.end, &self.amount);
                let next = add_amount(&aligned, &self.amount)?;
                Some(if stamp(&next) <= self.end { next } else { aligned })
            }
            SampleOrder::OldestFirst => {
                let mut boundary = self.helper.find_beginning_of_period(&self.start, &self.amount);
                while stamp(&boundary) <= self.start {
                    boundary = add_amount(&boundary, &self.amount).filter(|b| *b > boundary)?;
                }
                Some(boundary)
            }
        }
    }

    /// Whether a stamp lies inside the range on the side still to be padded
    fn in_range(&self, stamp: &DateTime<Tz>) -> bool {
        match self.order {
            SampleOrder::NewestFirst => *stamp > self.start,
            SampleOrder::OldestFirst => *stamp <= self.end,
        }
    }

    /// Whether a stamp comes before `first` in enumeration order
    fn precedes(&self, stamp: &DateTime<Tz>, first: &DataPoint) -> bool {
        let t = first.timestamp.with_timezone(&self.zone);
        match self.order {
            SampleOrder::NewestFirst => *stamp > t,
            SampleOrder::OldestFirst => *stamp < t,
        }
    }

    fn filler(&self, stamp: &DateTime<Tz>) -> DataPoint {
        trace!(stamp = %stamp, "padding point");
        self.stats.emitted();
        DataPoint::new(stamp.fixed_offset(), self.metric_id, self.default_value)
    }

    fn after_last(&self, last: Option<DateTime<Tz>>) -> Phase {
        let boundary = last
            .and_then(|t| t.checked_add_signed(TimeDelta::nanoseconds(1)))
            .and_then(|b| self.step(&b));
        match boundary {
            Some(boundary) => Phase::Tail { boundary },
            None => Phase::Done,
        }
    }
}

impl Iterator for PadPoints<'_> {
    type Item = Result<DataPoint>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match std::mem::replace(&mut self.phase, Phase::Done) {
                Phase::Start => match self.upstream.next() {
                    Some(Ok(first)) => {
                        if let Some(boundary) = self.first_boundary() {
                            self.phase = Phase::Head { boundary, first };
                        } else {
                            self.phase = Phase::Data {
                                pending: Some(first),
                                last: None,
                            };
                        }
                    }
                    Some(Err(e)) => return Some(Err(e)),
                    None => {
                        if let Some(boundary) = self.first_boundary() {
                            self.phase = Phase::Tail { boundary };
                        }
                    }
                },
                Phase::Head { boundary, first } => {
                    let at = stamp(&boundary);
                    if self.in_range(&at) && self.precedes(&at, &first) {
                        if let Some(next) = self.step(&boundary) {
                            self.phase = Phase::Head {
                                boundary: next,
                                first,
                            };
                        } else {
                            self.phase = Phase::Data {
                                pending: Some(first),
                                last: None,
                            };
                        }
                        return Some(Ok(self.filler(&at)));
                    }
                    self.phase = Phase::Data {
                        pending: Some(first),
                        last: None,
                    };
                }
                Phase::Data { pending, last } => {
                    let point = match pending {
                        Some(point) => point,
                        None => match self.upstream.next() {
                            Some(Ok(point)) => point,
                            Some(Err(e)) => return Some(Err(e)),
                            None => {
                                self.phase = self.after_last(last);
                                continue;
                            }
                        },
                    };
                    self.phase = Phase::Data {
                        pending: None,
                        last: Some(point.timestamp.with_timezone(&self.zone)),
                    };
                    self.stats.emitted();
                    return Some(Ok(point));
                }
                Phase::Tail { boundary } => {
                    let at = stamp(&boundary);
                    if !self.in_range(&at) {
                        return None;
                    }
                    if let Some(next) = self.step(&boundary) {
                        self.phase = Phase::Tail { boundary: next };
                    }
                    return Some(Ok(self.filler(&at)));
                }
                Phase::Done => return None,
            }
        }
    }
}
