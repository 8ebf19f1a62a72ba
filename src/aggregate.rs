use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FacetError;

/// Aggregation applied to one measure inside each group of the innermost
/// grouping column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationFunction {
    Sum,
    Mean,
    Count,
    Median,
    Min,
    Max,
    Std,
    Var,
}

impl AggregationFunction {
    pub const ALL: [AggregationFunction; 8] = [
        AggregationFunction::Sum,
        AggregationFunction::Mean,
        AggregationFunction::Count,
        AggregationFunction::Median,
        AggregationFunction::Min,
        AggregationFunction::Max,
        AggregationFunction::Std,
        AggregationFunction::Var,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AggregationFunction::Sum => "sum",
            AggregationFunction::Mean => "mean",
            AggregationFunction::Count => "count",
            AggregationFunction::Median => "median",
            AggregationFunction::Min => "min",
            AggregationFunction::Max => "max",
            AggregationFunction::Std => "std",
            AggregationFunction::Var => "var",
        }
    }

    /// Human readable name used in row titles ("Average of Sales across ...").
    pub fn display_name(&self) -> &'static str {
        match self {
            AggregationFunction::Sum => "Sum",
            AggregationFunction::Mean => "Average",
            AggregationFunction::Count => "Count",
            AggregationFunction::Median => "Median",
            AggregationFunction::Min => "Minimum",
            AggregationFunction::Max => "Maximum",
            AggregationFunction::Std => "Standard Deviation",
            AggregationFunction::Var => "Variance",
        }
    }

    /// Reduce a group's values to one number.
    ///
    /// `std` and `var` use one delta degree of freedom and yield NaN for a
    /// single value; `mean`/`median`/`min`/`max` of an empty group are NaN.
    pub fn apply(&self, values: &[f64]) -> f64 {
        let n = values.len();
        match self {
            AggregationFunction::Sum => values.iter().sum(),
            AggregationFunction::Count => n as f64,
            AggregationFunction::Mean => {
                if n == 0 { return f64::NAN; }
                values.iter().sum::<f64>() / n as f64
            }
            AggregationFunction::Median => {
                if n == 0 { return f64::NAN; }
                let mut sorted = values.to_vec();
                sorted.sort_by(|a, b| a.total_cmp(b));
                percentile(&sorted, 0.5)
            }
            AggregationFunction::Min => values.iter().copied().fold(f64::NAN, f64::min),
            AggregationFunction::Max => values.iter().copied().fold(f64::NAN, f64::max),
            AggregationFunction::Var => sample_variance(values),
            AggregationFunction::Std => sample_variance(values).sqrt(),
        }
    }
}

impl fmt::Display for AggregationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AggregationFunction {
    type Err = FacetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        AggregationFunction::ALL
            .into_iter()
            .find(|agg| agg.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| FacetError::UnknownAggregationFunction(s.to_string()))
    }
}

fn sample_variance(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64
}

fn percentile(sorted_data: &[f64], p: f64) -> f64 {
    let n = sorted_data.len();
    if n == 0 { return f64::NAN; }
    if n == 1 { return sorted_data[0]; }

    let rank = p * (n - 1) as f64;
    let lower_idx = rank.floor() as usize;
    let upper_idx = rank.ceil() as usize;

    if lower_idx == upper_idx {
        sorted_data[lower_idx]
    } else {
        let weight = rank - lower_idx as f64;
        sorted_data[lower_idx] * (1.0 - weight) + sorted_data[upper_idx] * weight
    }
}
