use serde::Serialize;

use crate::axis::{compute_row_axes, RowAxis};
use crate::data::TabularData;
use crate::error::{FacetError, Result};
use crate::grid::{assemble_grid, Grid};
use crate::layout::{compute_column_layout, compute_measure_layout, FacetPlan};
use crate::request::{ChartKind, FacetRequest};

/// The complete answer to one request, ready for a renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacetOutput {
    pub plan: FacetPlan,
    pub grid: Grid,
    pub axes: Vec<RowAxis>,
}

/// Validate a request against `table`, then lay out and fill the grid.
///
/// All validation happens before any computation: a failed request returns
/// an error and nothing else.
pub fn build_facet_grid<T: TabularData>(table: &T, request: &FacetRequest) -> Result<FacetOutput> {
    // 1. Validate selections
    if request.group_by.is_empty() {
        return Err(FacetError::EmptyGroupSpec);
    }
    let measures = compute_measure_layout(&request.measures, request.aggregate)?;
    let chart: ChartKind = request.chart.parse()?;

    let mut referenced: Vec<&str> = request.group_by.iter().map(String::as_str).collect();
    referenced.extend(measures.measures.iter().map(|m| m.column.as_str()));
    for column in &referenced {
        table.column_index(column)?;
    }

    // 2. Drop rows with a null in any referenced column
    let data = table.drop_nulls(&referenced)?;
    tracing::debug!(
        input_rows = table.row_count(),
        kept_rows = data.row_count(),
        "dropped rows with nulls in referenced columns"
    );

    for measure in &measures.measures {
        data.numeric_values(&measure.column)?;
    }

    // 3. Layout
    let columns = compute_column_layout(&data, &request.group_by)?;
    let plan = FacetPlan::new(&request.group_by, columns, &measures, chart, &request.title_delimiter);

    // 4. Series
    let grid = assemble_grid(&plan, &measures, &data)?;
    let axes = compute_row_axes(&measures, plan.innermost(), &grid);

    tracing::info!(
        rows = plan.row_count,
        columns = plan.column_count,
        chart = %plan.chart,
        "built facet plan"
    );

    Ok(FacetOutput { plan, grid, axes })
}
