//! Moving aggregation over a trailing time window
//!
//! For each point P the output value reduces the values of P and every older
//! point Q with `P - Q < window`. The window is strict: a point exactly
//! `window` older than P is excluded. Timestamps, labels and notes are kept;
//! only values change.
//!
//! Newest-first samples have their window ahead of the head, so the stage
//! buffers the points inside it plus the first point beyond it, which it
//! needs to know the window is complete. Oldest-first samples have it behind
//! the head and need one pull per output.

use super::{Reducer, SampleContext, SampleStats};
use crate::error::Result;
use crate::sample::DataSample;
use crate::types::{DataPoint, SampleOrder};
use chrono::TimeDelta;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

/// Replace each value by the mean of its trailing window
///
/// A zero or negative window leaves every value unchanged.
pub fn moving_average<'a>(
    sample: DataSample<'a>,
    window: TimeDelta,
    ctx: &SampleContext,
) -> DataSample<'a> {
    moving_aggregate(sample, window, Reducer::Average, ctx)
}

/// Replace each value by `reducer` applied to its trailing window
pub fn moving_aggregate<'a>(
    sample: DataSample<'a>,
    window: TimeDelta,
    reducer: Reducer,
    ctx: &SampleContext,
) -> DataSample<'a> {
    debug!(%window, %reducer, "building moving aggregation");
    ctx.stats().stage_built();
    let properties = sample.properties().clone();
    let raw = sample.raw_log();
    let order = properties.order;
    DataSample::derived(
        properties,
        raw,
        MovingPoints {
            upstream: sample,
            order,
            window,
            reducer,
            buffer: VecDeque::new(),
            exhausted: false,
            failed: false,
            stats: ctx.stats_handle(),
        },
    )
}

struct MovingPoints<'a> {
    upstream: DataSample<'a>,
    order: SampleOrder,
    window: TimeDelta,
    reducer: Reducer,
    buffer: VecDeque<DataPoint>,
    exhausted: bool,
    failed: bool,
    stats: Arc<SampleStats>,
}

impl MovingPoints<'_> {
    fn in_window(&self, head: &DataPoint, other: &DataPoint) -> bool {
        (head.timestamp - other.timestamp).abs() < self.window
    }

    /// Pull until the buffer's last point falls outside the head's window
    fn fill(&mut self) -> Result<()> {
        while !self.exhausted {
            if let (Some(head), Some(last)) = (self.buffer.front(), self.buffer.back()) {
                if self.buffer.len() > 1 && !self.in_window(head, last) {
                    return Ok(());
                }
            }
            match self.upstream.next() {
                Some(Ok(point)) => {
                    let complete = self
                        .buffer
                        .front()
                        .is_some_and(|head| !self.in_window(head, &point));
                    self.buffer.push_back(point);
                    if complete {
                        return Ok(());
                    }
                }
                Some(Err(e)) => return Err(e),
                None => self.exhausted = true,
            }
        }
        Ok(())
    }
}

impl MovingPoints<'_> {
    fn next_newest_first(&mut self) -> Option<Result<DataPoint>> {
        if let Err(e) = self.fill() {
            self.failed = true;
            return Some(Err(e));
        }
        let head = self.buffer.front()?;
        let values: Vec<f64> = std::iter::once(head.value)
            .chain(
                self.buffer
                    .iter()
                    .skip(1)
                    .take_while(|q| self.in_window(head, q))
                    .map(|q| q.value),
            )
            .collect();
        let value = self.reducer.reduce(&values).unwrap_or(head.value);
        let point = head.with_value(value);
        self.buffer.pop_front();
        Some(Ok(point))
    }

    /// The buffer holds the points preceding the head, oldest at the front
    fn next_oldest_first(&mut self) -> Option<Result<DataPoint>> {
        let head = match self.upstream.next()? {
            Ok(point) => point,
            Err(e) => {
                self.failed = true;
                return Some(Err(e));
            }
        };
        while let Some(oldest) = self.buffer.front() {
            if self.in_window(&head, oldest) {
                break;
            }
            self.buffer.pop_front();
        }
        let values: Vec<f64> = self
            .buffer
            .iter()
            .map(|q| q.value)
            .chain(std::iter::once(head.value))
            .collect();
        let value = self.reducer.reduce(&values).unwrap_or(head.value);
        let point = head.with_value(value);
        self.buffer.push_back(head);
        Some(Ok(point))
    }
}

impl Iterator for MovingPoints<'_> {
    type Item = Result<DataPoint>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = match self.order {
            SampleOrder::NewestFirst => self.next_newest_first(),
            SampleOrder::OldestFirst => self.next_oldest_first(),
        };
        if matches!(item, Some(Ok(_))) {
            self.stats.emitted();
        }
        item
    }
}
