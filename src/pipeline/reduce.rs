//! Reduction of a group of values to one

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a bucket or window of values collapses to a single value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reducer {
    /// Sum of values, 0 for an empty group
    #[default]
    Sum,
    /// Arithmetic mean
    Average,
    /// Smallest value
    Min,
    /// Largest value
    Max,
    /// Number of values, 0 for an empty group
    Count,
}

impl Reducer {
    /// Reduce `values`, or `None` when the reducer is undefined on an empty group
    pub fn reduce(&self, values: &[f64]) -> Option<f64> {
        match self {
            Self::Sum => Some(values.iter().sum()),
            Self::Count => Some(values.len() as f64),
            _ if values.is_empty() => None,
            Self::Average => Some(values.iter().sum::<f64>() / values.len() as f64),
            Self::Min => values.iter().copied().reduce(f64::min),
            Self::Max => values.iter().copied().reduce(f64::max),
        }
    }
}

impl fmt::Display for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sum => "sum",
            Self::Average => "average",
            Self::Min => "min",
            Self::Max => "max",
            Self::Count => "count",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduce_values() {
        let values = [4.0, 1.0, 7.0];
        assert_eq!(Reducer::Sum.reduce(&values), Some(12.0));
        assert_eq!(Reducer::Average.reduce(&values), Some(4.0));
        assert_eq!(Reducer::Min.reduce(&values), Some(1.0));
        assert_eq!(Reducer::Max.reduce(&values), Some(7.0));
        assert_eq!(Reducer::Count.reduce(&values), Some(3.0));
    }

    #[test]
    fn test_reduce_empty() {
        assert_eq!(Reducer::Sum.reduce(&[]), Some(0.0));
        assert_eq!(Reducer::Count.reduce(&[]), Some(0.0));
        assert_eq!(Reducer::Average.reduce(&[]), None);
        assert_eq!(Reducer::Min.reduce(&[]), None);
        assert_eq!(Reducer::Max.reduce(&[]), None);
    }
}
