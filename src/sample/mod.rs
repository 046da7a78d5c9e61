//! Lazy, disposable samples of data points
//!
//! A [`DataSample`] is a pull-based iterator of `Result<DataPoint>` plus the
//! metadata ([`DataSampleProperties`]) that travels with it through the
//! pipeline. Samples are one-shot: each point is produced at most once, on
//! demand, in the upstream's order.
//!
//! # Disposal
//!
//! Every sample owns whatever releases its resources (a storage cursor, an
//! upstream sample, a custom hook). [`DataSample::dispose`] releases them
//! and is idempotent; dropping a sample disposes it. A stage owns its
//! upstream sample, so disposing or dropping the last sample of a chain
//! releases the whole chain, whether enumeration was exhausted, abandoned
//! early or stopped on an error.
//!
//! # Example
//!
//! ```rust
//! use chrono::DateTime;
//! use kuba_sampling::sample::DataSample;
//! use kuba_sampling::types::{DataPoint, DataSampleProperties};
//!
//! let ts = DateTime::parse_from_rfc3339("2021-06-15T10:00:00Z").unwrap();
//! let mut sample = DataSample::from_points(
//!     vec![DataPoint::new(ts, 1, 2.0)],
//!     DataSampleProperties::default(),
//! );
//! assert_eq!(sample.next().unwrap().unwrap().value, 2.0);
//! assert_eq!(sample.raw_points().len(), 1);
//! sample.dispose();
//! assert!(sample.next().is_none());
//! ```

pub mod source;

pub use source::{DataPointCursor, DataPointSource, MemorySource, Page};

use crate::error::Result;
use crate::types::{DataPoint, DataSampleProperties};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Boxed point iterator used inside a sample
pub type PointIter<'a> = Box<dyn Iterator<Item = Result<DataPoint>> + Send + 'a>;

type DisposeHook<'a> = Box<dyn FnOnce() + Send + 'a>;

// ============================================================================
// Raw point log
// ============================================================================

/// Record of the source points realized so far
///
/// Created where a sample reads from its source and shared by every sample
/// derived from it, so the end of a pipeline can report what was actually
/// pulled from storage.
#[derive(Clone, Default)]
pub struct RawPointLog {
    points: Arc<Mutex<Vec<DataPoint>>>,
}

impl RawPointLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, point: &DataPoint) {
        self.points.lock().push(point.clone());
    }

    /// Copy of the recorded points, in realization order
    pub fn snapshot(&self) -> Vec<DataPoint> {
        self.points.lock().clone()
    }

    /// Number of recorded points
    pub fn len(&self) -> usize {
        self.points.lock().len()
    }

    /// Whether nothing has been realized yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for RawPointLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawPointLog")
            .field("len", &self.len())
            .finish()
    }
}

/// Iterator adapter that records every successful point
struct Recorded<I> {
    inner: I,
    log: RawPointLog,
}

impl<I> Iterator for Recorded<I>
where
    I: Iterator<Item = Result<DataPoint>>,
{
    type Item = Result<DataPoint>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.inner.next()?;
        if let Ok(point) = &item {
            self.log.record(point);
        }
        Some(item)
    }
}

// ============================================================================
// Data sample
// ============================================================================

/// Lazy, disposable sequence of points for one metric
pub struct DataSample<'a> {
    points: PointIter<'a>,
    properties: DataSampleProperties,
    raw: RawPointLog,
    on_dispose: Option<DisposeHook<'a>>,
    disposed: bool,
}

impl<'a> DataSample<'a> {
    /// Sample over already-available points
    pub fn from_points<I>(points: I, properties: DataSampleProperties) -> Self
    where
        I: IntoIterator<Item = DataPoint>,
        I::IntoIter: Send + 'a,
    {
        Self::from_results(points.into_iter().map(Ok), properties)
    }

    /// Sample over a fallible point stream
    ///
    /// Points are recorded in the raw log as they are pulled.
    pub fn from_results<I>(points: I, properties: DataSampleProperties) -> Self
    where
        I: IntoIterator<Item = Result<DataPoint>>,
        I::IntoIter: Send + 'a,
    {
        let raw = RawPointLog::new();
        let recorded = Recorded {
            inner: points.into_iter(),
            log: raw.clone(),
        };
        Self::derived(properties, raw, recorded)
    }

    /// Sample reading from a storage cursor
    ///
    /// The cursor is closed exactly once, when the sample is disposed or
    /// dropped.
    pub fn from_cursor<C>(cursor: C, properties: DataSampleProperties) -> Self
    where
        C: DataPointCursor + 'a,
    {
        Self::from_results(source::CursorPoints::new(cursor), properties)
    }

    /// Sample with no points
    pub fn empty(properties: DataSampleProperties) -> Self {
        Self::from_points(Vec::new(), properties)
    }

    /// Sample produced by a stage over an upstream sharing `raw`
    pub(crate) fn derived<I>(properties: DataSampleProperties, raw: RawPointLog, points: I) -> Self
    where
        I: Iterator<Item = Result<DataPoint>> + Send + 'a,
    {
        Self {
            points: Box::new(points),
            properties,
            raw,
            on_dispose: None,
            disposed: false,
        }
    }

    /// Register a hook run once on disposal, after any hook already registered
    pub fn with_on_dispose<F>(mut self, hook: F) -> Self
    where
        F: FnOnce() + Send + 'a,
    {
        self.on_dispose = Some(match self.on_dispose.take() {
            Some(previous) => Box::new(move || {
                previous();
                hook();
            }),
            None => Box::new(hook),
        });
        self
    }

    /// Metadata of this sample
    pub fn properties(&self) -> &DataSampleProperties {
        &self.properties
    }

    /// Source points realized so far by this sample's chain
    pub fn raw_points(&self) -> Vec<DataPoint> {
        self.raw.snapshot()
    }

    /// Shared raw log, for stages deriving from this sample
    pub(crate) fn raw_log(&self) -> RawPointLog {
        self.raw.clone()
    }

    /// Release the underlying resources
    ///
    /// Safe to call repeatedly, before enumeration started or after it was
    /// abandoned. Further calls to `next` return `None`.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        // dropping the iterator releases the upstream chain
        self.points = Box::new(std::iter::empty());
        if let Some(hook) = self.on_dispose.take() {
            hook();
        }
        debug!(realized = self.raw.len(), "data sample disposed");
    }

    /// Whether [`dispose`](Self::dispose) has run
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Drain the sample into a vector, stopping at the first error
    ///
    /// The sample is disposed on every path.
    pub fn collect_points(mut self) -> Result<Vec<DataPoint>> {
        let collected = self.by_ref().collect::<Result<Vec<_>>>();
        self.dispose();
        collected
    }
}

impl Iterator for DataSample<'_> {
    type Item = Result<DataPoint>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.disposed {
            return None;
        }
        self.points.next()
    }
}

impl Drop for DataSample<'_> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for DataSample<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSample")
            .field("properties", &self.properties)
            .field("raw", &self.raw)
            .field("disposed", &self.disposed)
            .finish()
    }
}
