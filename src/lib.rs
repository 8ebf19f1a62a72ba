// Library exports for facetplan

pub mod aggregate;
pub mod axis;
pub mod csv_reader;
pub mod data;
pub mod error;
pub mod grid;
pub mod layout;
pub mod pipeline;
pub mod request;

pub use aggregate::AggregationFunction;
pub use data::{ColumnKind, Table, TabularData};
pub use error::FacetError;
pub use grid::{assemble_grid, CellSeries, Grid};
pub use layout::{
    compute_column_layout, compute_measure_layout, compute_subplot_titles, ColumnLayout, ColumnPath,
    FacetPlan, MeasureLayout, TitleHierarchy,
};
pub use pipeline::{build_facet_grid, FacetOutput};
pub use request::{ChartKind, FacetRequest, MeasureSpec};
