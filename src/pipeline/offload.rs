//! Running a pipeline off the calling thread
//!
//! Reading a sample may block on storage. Callers on an async runtime hand
//! the whole pipeline to tokio's blocking pool and await the realized
//! points; the pipeline is built, drained and disposed on that thread.

use crate::error::{Error, Result};
use crate::sample::DataSample;
use crate::types::DataPoint;
use tracing::debug;

/// Build a pipeline with `build` on the blocking pool and collect its points
pub async fn materialize<F>(build: F) -> Result<Vec<DataPoint>>
where
    F: FnOnce() -> Result<DataSample<'static>> + Send + 'static,
{
    let points = tokio::task::spawn_blocking(move || build()?.collect_points())
        .await
        .map_err(|e| Error::Task(e.to_string()))??;
    debug!(points = points.len(), "materialized pipeline off thread");
    Ok(points)
}
