use serde::Serialize;

use crate::grid::Grid;
use crate::layout::{MeasureLayout, ResolvedMeasure};

/// Default y-axis limits offered for one subplot row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YRange {
    pub lowest: f64,
    pub highest: f64,
    pub lower: f64,
    pub upper: f64,
    /// Increment for nudging the limits, a tenth of the data span.
    pub step: f64,
    /// Largest limit a user may pick.
    pub upper_bound: f64,
}

impl YRange {
    /// Pad the data span by its own width on both sides, never going below
    /// zero or above one and a half times the highest value.
    pub fn suggest(values: &[f64]) -> Option<YRange> {
        let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return None;
        }
        finite.sort_by(|a, b| a.total_cmp(b));

        let lowest = finite[0];
        let highest = finite[finite.len() - 1];
        let diff = highest - lowest;
        let upper_bound = highest * 1.5;

        Some(YRange {
            lowest,
            highest,
            lower: (lowest - diff).max(0.0),
            upper: (highest + diff).min(upper_bound),
            step: diff / 10.0,
            upper_bound,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowAxis {
    pub row: usize,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub y_range: Option<YRange>,
}

fn row_title(measure: &ResolvedMeasure, innermost: &str) -> String {
    match measure.aggregation {
        Some(agg) => format!("{} of {} across {}", agg.display_name(), measure.column, innermost),
        None => format!("{} across {}", measure.column, innermost),
    }
}

fn y_label(measure: &ResolvedMeasure) -> String {
    match measure.aggregation {
        Some(agg) => format!("{} ({})", measure.column, agg),
        None => measure.column.clone(),
    }
}

/// Labels and suggested y limits for every subplot row.
pub fn compute_row_axes(measures: &MeasureLayout, innermost: &str, grid: &Grid) -> Vec<RowAxis> {
    measures
        .measures
        .iter()
        .enumerate()
        .map(|(row, measure)| {
            let values: Vec<f64> = grid.row(row).flat_map(|cell| cell.y.iter().copied()).collect();
            RowAxis {
                row,
                title: row_title(measure, innermost),
                x_label: innermost.to_string(),
                y_label: y_label(measure),
                y_range: YRange::suggest(&values),
            }
        })
        .collect()
}
