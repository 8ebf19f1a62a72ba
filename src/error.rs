use thiserror::Error;

pub type Result<T> = std::result::Result<T, FacetError>;

/// Input-validation failures. All of them are raised before any grid is
/// assembled, so a failed request leaves nothing half-built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FacetError {
    #[error("At least one grouping column is required")]
    EmptyGroupSpec,

    /// Column names are matched exactly, case included.
    #[error("Column '{0}' not found")]
    ColumnNotFound(String),

    #[error("No measure columns selected")]
    NoMeasuresSelected,

    #[error("Unknown aggregation function '{0}'")]
    UnknownAggregationFunction(String),

    #[error("Measure '{0}' has no aggregation function but aggregation is enabled")]
    MissingAggregation(String),

    #[error("Unknown chart kind '{0}' (expected bar, line or scatter)")]
    UnknownChartKind(String),

    #[error("Failed to parse value '{value}' in column '{column}' as a number")]
    NonNumericValue { column: String, value: String },
}
