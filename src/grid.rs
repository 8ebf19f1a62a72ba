use std::collections::HashSet;

use serde::Serialize;

use crate::data::TabularData;
use crate::error::Result;
use crate::layout::{FacetPlan, MeasureLayout};
use crate::request::ChartKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Constraint {
    pub column: String,
    pub value: String,
}

/// The series drawn in one subplot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellSeries {
    pub row: usize,
    pub col: usize,
    pub measure: String,
    pub constraints: Vec<Constraint>,
    /// Rows of the null-free table selected by `constraints`.
    pub input_rows: usize,
    pub x: Vec<String>,
    pub y: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    pub row_count: usize,
    pub column_count: usize,
    pub chart: ChartKind,
    /// Row-major: cell (i, j) lives at `i * column_count + j`.
    pub cells: Vec<CellSeries>,
    /// X categories shared by every cell of a column, first-seen order.
    pub x_domains: Vec<Vec<String>>,
}

impl Grid {
    pub fn cell(&self, row: usize, col: usize) -> Option<&CellSeries> {
        if row >= self.row_count || col >= self.column_count {
            return None;
        }
        self.cells.get(row * self.column_count + col)
    }

    pub fn row(&self, row: usize) -> impl Iterator<Item = &CellSeries> {
        self.cells.iter().filter(move |c| c.row == row)
    }

    pub fn column(&self, col: usize) -> impl Iterator<Item = &CellSeries> {
        self.cells.iter().filter(move |c| c.col == col)
    }
}

/// Compute the series of every (measure row, column path) cell.
///
/// Every cell of column `j` is filtered by the same equality constraints, so
/// cells in one column differ only in the measure they plot.
pub fn assemble_grid<T: TabularData>(plan: &FacetPlan, measures: &MeasureLayout, table: &T) -> Result<Grid> {
    debug_assert_eq!(plan.row_count, measures.measures.len());
    debug_assert_eq!(plan.column_count, plan.column_paths.len());

    let innermost = plan.innermost();

    // One subset per column, shared by all rows.
    let mut subsets = Vec::with_capacity(plan.column_count);
    for path in &plan.column_paths {
        let constraints: Vec<Constraint> = path
            .constraints(&plan.group_cols)
            .into_iter()
            .map(|(column, value)| Constraint {
                column: column.to_string(),
                value: value.to_string(),
            })
            .collect();

        let mut subset = table.filter_eq(&constraints[0].column, &constraints[0].value)?;
        for c in &constraints[1..] {
            subset = subset.filter_eq(&c.column, &c.value)?;
        }
        subsets.push((constraints, subset));
    }

    let mut cells = Vec::with_capacity(plan.row_count * plan.column_count);
    for (row, measure) in measures.measures.iter().enumerate() {
        for (col, (constraints, subset)) in subsets.iter().enumerate() {
            let (x, y) = match measure.aggregation {
                Some(aggregation) => subset.group_aggregate(innermost, &measure.column, aggregation)?,
                None => (
                    subset.column_values(innermost)?,
                    subset.numeric_values(&measure.column)?,
                ),
            };

            cells.push(CellSeries {
                row,
                col,
                measure: measure.column.clone(),
                constraints: constraints.clone(),
                input_rows: subset.row_count(),
                x,
                y,
            });
        }
    }

    let mut seen: Vec<HashSet<&str>> = vec![HashSet::new(); plan.column_count];
    let mut x_domains: Vec<Vec<String>> = vec![Vec::new(); plan.column_count];
    for cell in &cells {
        for x in &cell.x {
            if seen[cell.col].insert(x.as_str()) {
                x_domains[cell.col].push(x.clone());
            }
        }
    }

    tracing::debug!(
        rows = plan.row_count,
        columns = plan.column_count,
        cells = cells.len(),
        "assembled facet grid"
    );

    Ok(Grid {
        row_count: plan.row_count,
        column_count: plan.column_count,
        chart: plan.chart,
        cells,
        x_domains,
    })
}
