use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FacetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Bar,
    #[serde(alias = "plot")]
    Line,
    Scatter,
}

impl ChartKind {
    /// Raw rows have no single y value per category, so they are always
    /// drawn as points.
    pub fn effective(self, is_aggregated: bool) -> ChartKind {
        if is_aggregated { self } else { ChartKind::Scatter }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Scatter => "scatter",
        };
        f.write_str(name)
    }
}

impl FromStr for ChartKind {
    type Err = FacetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bar" => Ok(ChartKind::Bar),
            "line" | "plot" => Ok(ChartKind::Line),
            "scatter" => Ok(ChartKind::Scatter),
            _ => Err(FacetError::UnknownChartKind(s.to_string())),
        }
    }
}

/// One measure column and the name of the aggregation to apply to it.
/// The name is validated later so that a bad name surfaces as
/// `UnknownAggregationFunction` rather than a deserialisation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureSpec {
    pub column: String,
    #[serde(default)]
    pub aggregation: Option<String>,
}

impl MeasureSpec {
    pub fn new(column: impl Into<String>, aggregation: Option<&str>) -> Self {
        Self {
            column: column.into(),
            aggregation: aggregation.map(str::to_string),
        }
    }
}

/// The selections of one user interaction.
#[derive(Debug, Clone, Deserialize)]
pub struct FacetRequest {
    #[serde(default)]
    pub group_by: Vec<String>,
    #[serde(default)]
    pub measures: Vec<MeasureSpec>,
    #[serde(default = "default_aggregate")]
    pub aggregate: bool,
    #[serde(default = "default_chart")]
    pub chart: String,
    #[serde(default = "default_title_delimiter")]
    pub title_delimiter: String,
}

fn default_aggregate() -> bool { true }
fn default_chart() -> String { ChartKind::Bar.to_string() }
fn default_title_delimiter() -> String { " | ".to_string() }

impl Default for FacetRequest {
    fn default() -> Self {
        Self {
            group_by: Vec::new(),
            measures: Vec::new(),
            aggregate: true,
            chart: default_chart(),
            title_delimiter: default_title_delimiter(),
        }
    }
}

impl FacetRequest {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
