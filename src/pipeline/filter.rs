//! Filtering stages: keep points by value range or label
//!
//! Continuous samples are filtered on value alone. Points of a discrete
//! sample (one carrying a label catalog) also pass when their label maps
//! to an allowed catalog index; a discrete point whose label is missing or
//! not in the catalog is reported as a [`PointError`] instead of being
//! silently dropped.

use super::{SampleContext, SampleStats};
use crate::error::{PointError, Result};
use crate::sample::DataSample;
use crate::types::{DataPoint, DataSampleProperties};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, trace};

/// Keep points with `from <= value <= to`, or whose discrete label index is
/// in `allowed_labels`
///
/// `from > to` is not rejected; it simply admits no value.
pub fn filter_value<'a>(
    sample: DataSample<'a>,
    from: f64,
    to: f64,
    allowed_labels: HashSet<i32>,
    ctx: &SampleContext,
) -> DataSample<'a> {
    debug!(from, to, labels = allowed_labels.len(), "building value filter");
    build(
        sample,
        Predicate::Value {
            from,
            to,
            allowed_labels,
        },
        ctx,
    )
}

/// Keep points whose label is one of `labels`
pub fn filter_labels<'a>(
    sample: DataSample<'a>,
    labels: HashSet<String>,
    ctx: &SampleContext,
) -> DataSample<'a> {
    debug!(labels = labels.len(), "building label filter");
    build(sample, Predicate::Label { labels }, ctx)
}

fn build<'a>(sample: DataSample<'a>, predicate: Predicate, ctx: &SampleContext) -> DataSample<'a> {
    ctx.stats().stage_built();
    let properties = sample.properties().clone();
    let raw = sample.raw_log();
    DataSample::derived(
        properties.clone(),
        raw,
        FilterPoints {
            upstream: sample,
            properties,
            predicate,
            finished: false,
            stats: ctx.stats_handle(),
        },
    )
}

enum Predicate {
    Value {
        from: f64,
        to: f64,
        allowed_labels: HashSet<i32>,
    },
    Label {
        labels: HashSet<String>,
    },
}

impl Predicate {
    fn accepts(&self, point: &DataPoint, properties: &DataSampleProperties) -> Result<bool> {
        match self {
            Self::Label { labels } => Ok(labels.contains(&point.label)),
            Self::Value {
                from,
                to,
                allowed_labels,
            } => {
                let in_range = *from <= point.value && point.value <= *to;
                if !properties.is_discrete() {
                    return Ok(in_range);
                }
                let index = discrete_index(point, properties)?;
                Ok(in_range || allowed_labels.contains(&index))
            }
        }
    }
}

fn discrete_index(point: &DataPoint, properties: &DataSampleProperties) -> Result<i32> {
    if point.label.is_empty() {
        return Err(PointError::MissingLabel {
            metric_id: point.metric_id,
            timestamp: point.timestamp.to_rfc3339(),
        }
        .into());
    }
    properties.discrete_index(&point.label).ok_or_else(|| {
        PointError::UnknownLabel {
            metric_id: point.metric_id,
            label: point.label.clone(),
        }
        .into()
    })
}

struct FilterPoints<'a> {
    upstream: DataSample<'a>,
    properties: DataSampleProperties,
    predicate: Predicate,
    finished: bool,
    stats: Arc<SampleStats>,
}

impl Iterator for FilterPoints<'_> {
    type Item = Result<DataPoint>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            let point = match self.upstream.next()? {
                Ok(point) => point,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            };
            match self.predicate.accepts(&point, &self.properties) {
                Ok(true) => {
                    self.stats.emitted();
                    return Some(Ok(point));
                }
                Ok(false) => {
                    trace!(value = point.value, label = %point.label, "filtered out");
                    self.stats.dropped();
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::pipeline::test_util::at;
    use crate::types::DiscreteValue;
    use chrono::TimeDelta;

    fn continuous(values: &[f64]) -> DataSample<'static> {
        let end = at(2021, 6, 15, 10, 0, 0);
        let points: Vec<DataPoint> = values
            .iter()
            .enumerate()
            .map(|(i, v)| DataPoint::new(end - TimeDelta::hours(i as i64), 1, *v))
            .collect();
        DataSample::from_points(points, DataSampleProperties::default())
    }

    fn discrete(labels: &[&str]) -> DataSample<'static> {
        let end = at(2021, 6, 15, 10, 0, 0);
        let catalog = vec![
            DiscreteValue::new(0, "low"),
            DiscreteValue::new(1, "mid"),
            DiscreteValue::new(2, "high"),
        ];
        let points: Vec<DataPoint> = labels
            .iter()
            .enumerate()
            .map(|(i, l)| {
                let index = catalog
                    .iter()
                    .find(|v| v.label == *l)
                    .map_or(-1.0, |v| v.index as f64);
                DataPoint::new(end - TimeDelta::hours(i as i64), 2, index).with_label(*l)
            })
            .collect();
        DataSample::from_points(points, DataSampleProperties::discrete(catalog))
    }

    fn values(sample: DataSample<'_>) -> Vec<f64> {
        sample
            .collect_points()
            .unwrap()
            .iter()
            .map(|p| p.value)
            .collect()
    }

    #[test]
    fn test_filter_range_inclusive() {
        let ctx = SampleContext::default();
        let filtered = filter_value(
            continuous(&[1.0, 5.0, 2.0, 3.0, 0.5]),
            1.0,
            3.0,
            HashSet::new(),
            &ctx,
        );
        assert_eq!(values(filtered), vec![1.0, 2.0, 3.0]);
        let snap = ctx.stats().snapshot();
        assert_eq!(snap.points_emitted, 3);
        assert_eq!(snap.points_dropped, 2);
    }

    #[test]
    fn test_filter_inverted_range_is_empty() {
        let ctx = SampleContext::default();
        let filtered = filter_value(continuous(&[1.0, 2.0]), 3.0, 1.0, HashSet::new(), &ctx);
        assert!(values(filtered).is_empty());
    }

    #[test]
    fn test_filter_continuous_ignores_label_set() {
        let ctx = SampleContext::default();
        let filtered = filter_value(
            continuous(&[0.0, 1.0, 2.0]),
            10.0,
            20.0,
            HashSet::from([0, 1, 2]),
            &ctx,
        );
        assert!(values(filtered).is_empty());
    }

    #[test]
    fn test_filter_discrete_by_label() {
        let ctx = SampleContext::default();
        let filtered = filter_value(
            discrete(&["low", "high", "mid", "high"]),
            f64::NEG_INFINITY,
            f64::NEG_INFINITY,
            HashSet::from([2]),
            &ctx,
        );
        assert_eq!(values(filtered), vec![2.0, 2.0]);
    }

    #[test]
    fn test_filter_discrete_by_range_when_labels_empty() {
        let ctx = SampleContext::default();
        let filtered = filter_value(
            discrete(&["low", "high", "mid"]),
            0.0,
            1.0,
            HashSet::new(),
            &ctx,
        );
        assert_eq!(values(filtered), vec![0.0, 1.0]);
    }

    #[test]
    fn test_filter_discrete_missing_label_is_error() {
        let ctx = SampleContext::default();
        let mut filtered = filter_value(
            discrete(&["low", ""]),
            0.0,
            10.0,
            HashSet::new(),
            &ctx,
        );
        assert!(filtered.next().unwrap().is_ok());
        assert!(matches!(
            filtered.next(),
            Some(Err(Error::MalformedPoint(PointError::MissingLabel { .. })))
        ));
        assert!(filtered.next().is_none());
    }

    #[test]
    fn test_filter_discrete_unknown_label_is_error() {
        let ctx = SampleContext::default();
        let result = filter_value(discrete(&["huge"]), 0.0, 10.0, HashSet::new(), &ctx)
            .collect_points();
        assert!(matches!(
            result,
            Err(Error::MalformedPoint(PointError::UnknownLabel { ref label, .. })) if label == "huge"
        ));
    }

    #[test]
    fn test_filter_labels() {
        let ctx = SampleContext::default();
        let filtered = filter_labels(
            discrete(&["low", "high", "mid", "low"]),
            HashSet::from(["low".to_string(), "mid".to_string()]),
            &ctx,
        );
        let labels: Vec<String> = filtered
            .collect_points()
            .unwrap()
            .into_iter()
            .map(|p| p.label)
            .collect();
        assert_eq!(labels, vec!["low", "mid", "low"]);
    }

    #[test]
    fn test_filter_is_lazy() {
        let ctx = SampleContext::default();
        let mut filtered = filter_value(
            continuous(&[1.0, 9.0, 9.0, 1.0, 9.0]),
            0.0,
            5.0,
            HashSet::new(),
            &ctx,
        );
        assert_eq!(filtered.next().unwrap().unwrap().value, 1.0);
        assert_eq!(filtered.raw_points().len(), 1);
        assert_eq!(filtered.next().unwrap().unwrap().value, 1.0);
        assert_eq!(filtered.raw_points().len(), 4);
    }
}
