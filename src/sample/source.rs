//! Read interface of the persistence collaborator
//!
//! Storage exposes one ordered cursor per metric. [`DataPointSource`]
//! abstracts the backend so samples can be built over different stores;
//! [`MemorySource`] is the in-memory implementation used by tests and
//! benchmarks.

use super::DataSample;
use crate::error::{Result, SourceError};
use crate::types::{DataPoint, DataSampleProperties, MetricId, SampleOrder};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Slice of a metric's points, counted in cursor order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Page {
    /// Points skipped before the first one returned
    pub offset: usize,

    /// Maximum number of points returned, unbounded when `None`
    pub limit: Option<usize>,
}

impl Page {
    /// Every point
    pub fn all() -> Self {
        Self::default()
    }

    /// `limit` points after skipping `offset`
    pub fn new(offset: usize, limit: usize) -> Self {
        Self {
            offset,
            limit: Some(limit),
        }
    }
}

/// Ordered, forward-only reader over one metric's points
pub trait DataPointCursor: Send {
    /// Next point, or `None` once exhausted
    fn next_point(&mut self) -> std::result::Result<Option<DataPoint>, SourceError>;

    /// Release the cursor; further reads fail or return `None`
    fn close(&mut self);
}

impl<C: DataPointCursor + ?Sized> DataPointCursor for Box<C> {
    fn next_point(&mut self) -> std::result::Result<Option<DataPoint>, SourceError> {
        (**self).next_point()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// Storage backend producing cursors per metric
///
/// This trait abstracts the storage layer so samples can be built over
/// different backends (in-memory, embedded database, remote).
pub trait DataPointSource: Send + Sync {
    /// Metadata of the metric's sample
    fn properties(&self, metric_id: MetricId)
        -> std::result::Result<DataSampleProperties, SourceError>;

    /// Open a cursor over the metric's points
    fn open_cursor(
        &self,
        metric_id: MetricId,
        page: Page,
    ) -> std::result::Result<Box<dyn DataPointCursor + '_>, SourceError>;

    /// Lazy sample over the metric's points, closing the cursor on disposal
    fn sample(&self, metric_id: MetricId, page: Page) -> Result<DataSample<'_>> {
        let properties = self.properties(metric_id)?;
        let cursor = self.open_cursor(metric_id, page)?;
        Ok(DataSample::from_cursor(cursor, properties))
    }
}

// ============================================================================
// Cursor iterator
// ============================================================================

/// Iterator over a cursor that closes it when dropped
pub(crate) struct CursorPoints<C: DataPointCursor> {
    cursor: C,
    done: bool,
}

impl<C: DataPointCursor> CursorPoints<C> {
    pub(crate) fn new(cursor: C) -> Self {
        Self {
            cursor,
            done: false,
        }
    }
}

impl<C: DataPointCursor> Iterator for CursorPoints<C> {
    type Item = Result<DataPoint>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.cursor.next_point() {
            Ok(Some(point)) => Some(Ok(point)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e.into()))
            }
        }
    }
}

impl<C: DataPointCursor> Drop for CursorPoints<C> {
    fn drop(&mut self) {
        self.cursor.close();
    }
}

// ============================================================================
// In-memory source
// ============================================================================

struct MemorySeries {
    properties: DataSampleProperties,
    points: Vec<DataPoint>,
    fail_after: Option<usize>,
}

/// In-memory source for testing
///
/// Points are stored in the order declared by the series' properties and
/// every cursor open and close is counted.
#[derive(Default)]
pub struct MemorySource {
    series: HashMap<MetricId, MemorySeries>,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl MemorySource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a metric's points, sorting them into the declared order
    pub fn add_series(
        &mut self,
        metric_id: MetricId,
        properties: DataSampleProperties,
        mut points: Vec<DataPoint>,
    ) {
        match properties.order {
            SampleOrder::NewestFirst => points.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
            SampleOrder::OldestFirst => points.sort_by(|a, b| a.timestamp.cmp(&b.timestamp)),
        }
        self.series.insert(
            metric_id,
            MemorySeries {
                properties,
                points,
                fail_after: None,
            },
        );
    }

    /// Make cursors of `metric_id` fail after yielding `count` points
    pub fn fail_after(&mut self, metric_id: MetricId, count: usize) {
        if let Some(series) = self.series.get_mut(&metric_id) {
            series.fail_after = Some(count);
        }
    }

    /// Number of cursors opened so far
    pub fn opened_cursors(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Number of cursors closed so far
    pub fn closed_cursors(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    fn series(&self, metric_id: MetricId) -> std::result::Result<&MemorySeries, SourceError> {
        self.series
            .get(&metric_id)
            .ok_or(SourceError::MetricNotFound(metric_id))
    }
}

impl DataPointSource for MemorySource {
    fn properties(
        &self,
        metric_id: MetricId,
    ) -> std::result::Result<DataSampleProperties, SourceError> {
        Ok(self.series(metric_id)?.properties.clone())
    }

    fn open_cursor(
        &self,
        metric_id: MetricId,
        page: Page,
    ) -> std::result::Result<Box<dyn DataPointCursor + '_>, SourceError> {
        let series = self.series(metric_id)?;
        let start = page.offset.min(series.points.len());
        let end = match page.limit {
            Some(limit) => start.saturating_add(limit).min(series.points.len()),
            None => series.points.len(),
        };
        self.opened.fetch_add(1, Ordering::SeqCst);
        debug!(metric_id, start, end, "opened memory cursor");

        Ok(Box::new(MemoryCursor {
            metric_id,
            points: &series.points[start..end],
            position: 0,
            fail_after: series.fail_after,
            closed: false,
            close_counter: self.closed.clone(),
        }))
    }
}

struct MemoryCursor<'a> {
    metric_id: MetricId,
    points: &'a [DataPoint],
    position: usize,
    fail_after: Option<usize>,
    closed: bool,
    close_counter: Arc<AtomicUsize>,
}

impl DataPointCursor for MemoryCursor<'_> {
    fn next_point(&mut self) -> std::result::Result<Option<DataPoint>, SourceError> {
        if self.closed {
            return Err(SourceError::CursorClosed);
        }
        if self.fail_after == Some(self.position) {
            return Err(SourceError::ReadFailed(format!(
                "injected failure for metric {} at position {}",
                self.metric_id, self.position
            )));
        }
        let point = self.points.get(self.position).cloned();
        if point.is_some() {
            self.position += 1;
        }
        trace!(metric_id = self.metric_id, position = self.position, "cursor read");
        Ok(point)
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.close_counter.fetch_add(1, Ordering::SeqCst);
        }
    }
}
