use std::collections::HashSet;

use serde::Serialize;

use crate::aggregate::AggregationFunction;
use crate::data::TabularData;
use crate::error::{FacetError, Result};
use crate::request::{ChartKind, MeasureSpec};

/// Separator between the values of a column path in its label.
pub const PATH_DELIMITER: &str = " / ";

// =============================================================================
// Columns
// =============================================================================

/// One value of one grouping depth. Nodes at the innermost depth are leaves,
/// every other node has at least one child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetNode {
    pub value: String,
    pub children: Vec<FacetNode>,
}

impl FacetNode {
    fn leaf(value: String) -> Self {
        Self { value, children: Vec::new() }
    }

    pub fn leaf_count(&self) -> usize {
        if self.children.is_empty() {
            1
        } else {
            self.children.iter().map(FacetNode::leaf_count).sum()
        }
    }
}

/// The grouping values that identify one subplot column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnPath {
    /// Values of the outer grouping columns, outermost first.
    pub outer: Vec<String>,
    /// Value of the innermost grouping column reached at this leaf.
    pub inner: String,
    pub label: String,
}

impl ColumnPath {
    fn new(outer: Vec<String>, inner: String) -> Self {
        let label = outer
            .iter()
            .chain(std::iter::once(&inner))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(PATH_DELIMITER);
        Self { outer, inner, label }
    }

    /// Equality predicates, one per grouping column, that select this
    /// column's rows.
    pub fn constraints<'a>(&'a self, group_cols: &'a [String]) -> Vec<(&'a str, &'a str)> {
        group_cols
            .iter()
            .map(String::as_str)
            .zip(self.outer.iter().chain(std::iter::once(&self.inner)).map(String::as_str))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnLayout {
    pub tree: Vec<FacetNode>,
    pub column_paths: Vec<ColumnPath>,
}

impl ColumnLayout {
    pub fn column_count(&self) -> usize {
        self.column_paths.len()
    }
}

/// Discover every combination of grouping values present in `table`.
///
/// Outer depths are split recursively on the subset filtered by all
/// shallower depths; each distinct innermost value inside a subset is one
/// leaf, i.e. one subplot column. Combinations that never occur in the data
/// produce no column. `table` is expected to be null-free already.
pub fn compute_column_layout<T: TabularData>(table: &T, group_cols: &[String]) -> Result<ColumnLayout> {
    if group_cols.is_empty() {
        return Err(FacetError::EmptyGroupSpec);
    }
    for col in group_cols {
        table.column_index(col)?;
    }

    let tree = partition(table, group_cols, 0)?;

    let mut column_paths = Vec::new();
    let mut prefix = Vec::with_capacity(group_cols.len() - 1);
    flatten(&tree, &mut prefix, &mut column_paths);

    debug_assert_eq!(
        column_paths.len(),
        tree.iter().map(FacetNode::leaf_count).sum::<usize>()
    );

    Ok(ColumnLayout { tree, column_paths })
}

fn partition<T: TabularData>(table: &T, group_cols: &[String], depth: usize) -> Result<Vec<FacetNode>> {
    let column = &group_cols[depth];
    let values = table.unique_values(column)?;

    if depth + 1 == group_cols.len() {
        return Ok(values.into_iter().map(FacetNode::leaf).collect());
    }

    let mut nodes = Vec::with_capacity(values.len());
    for value in values {
        let subset = table.filter_eq(column, &value)?;
        let children = partition(&subset, group_cols, depth + 1)?;
        nodes.push(FacetNode { value, children });
    }
    Ok(nodes)
}

fn flatten(nodes: &[FacetNode], prefix: &mut Vec<String>, out: &mut Vec<ColumnPath>) {
    for node in nodes {
        if node.children.is_empty() {
            out.push(ColumnPath::new(prefix.clone(), node.value.clone()));
        } else {
            prefix.push(node.value.clone());
            flatten(&node.children, prefix, out);
            prefix.pop();
        }
    }
}

// =============================================================================
// Titles
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleLevel {
    pub column: String,
    pub values: Vec<String>,
}

/// Distinct values of every outer grouping depth. The innermost grouping
/// labels the x-axis and never appears here.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TitleHierarchy {
    pub levels: Vec<TitleLevel>,
}

impl TitleHierarchy {
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// One line per outer depth. Without outer depths the title is the name
    /// of the single grouping column.
    pub fn render(&self, delimiter: &str, group_cols: &[String]) -> String {
        if self.levels.is_empty() {
            return group_cols.last().cloned().unwrap_or_default();
        }
        self.levels
            .iter()
            .map(|level| level.values.join(delimiter))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn compute_subplot_titles(column_paths: &[ColumnPath], group_cols: &[String]) -> TitleHierarchy {
    let outer_depths = group_cols.len().saturating_sub(1);
    let levels = (0..outer_depths)
        .map(|depth| {
            let mut seen = HashSet::new();
            let mut values = Vec::new();
            for path in column_paths {
                if let Some(value) = path.outer.get(depth) {
                    if seen.insert(value.as_str()) {
                        values.push(value.clone());
                    }
                }
            }
            TitleLevel {
                column: group_cols[depth].clone(),
                values,
            }
        })
        .collect();
    TitleHierarchy { levels }
}

// =============================================================================
// Rows
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedMeasure {
    pub column: String,
    pub aggregation: Option<AggregationFunction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeasureLayout {
    pub row_count: usize,
    pub is_aggregated: bool,
    pub measures: Vec<ResolvedMeasure>,
}

/// One subplot row per measure. With aggregation on, every measure must name
/// a known aggregation; with it off, names are ignored.
pub fn compute_measure_layout(measures: &[MeasureSpec], is_aggregated: bool) -> Result<MeasureLayout> {
    if measures.is_empty() {
        return Err(FacetError::NoMeasuresSelected);
    }

    let measures = measures
        .iter()
        .map(|spec| {
            let aggregation = if is_aggregated {
                let name = spec
                    .aggregation
                    .as_deref()
                    .ok_or_else(|| FacetError::MissingAggregation(spec.column.clone()))?;
                Some(name.parse::<AggregationFunction>()?)
            } else {
                None
            };
            Ok(ResolvedMeasure {
                column: spec.column.clone(),
                aggregation,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(MeasureLayout {
        row_count: measures.len(),
        is_aggregated,
        measures,
    })
}

// =============================================================================
// Plan
// =============================================================================

/// Everything a renderer needs to lay out the subplot grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetPlan {
    pub group_cols: Vec<String>,
    pub row_count: usize,
    pub column_count: usize,
    pub column_paths: Vec<ColumnPath>,
    pub title_hierarchy: TitleHierarchy,
    pub title: String,
    pub chart: ChartKind,
}

impl FacetPlan {
    pub fn new(
        group_cols: &[String],
        columns: ColumnLayout,
        measures: &MeasureLayout,
        chart: ChartKind,
        title_delimiter: &str,
    ) -> Self {
        let title_hierarchy = compute_subplot_titles(&columns.column_paths, group_cols);
        let title = title_hierarchy.render(title_delimiter, group_cols);
        Self {
            group_cols: group_cols.to_vec(),
            row_count: measures.row_count,
            column_count: columns.column_count(),
            column_paths: columns.column_paths,
            title_hierarchy,
            title,
            chart: chart.effective(measures.is_aggregated),
        }
    }

    pub fn innermost(&self) -> &str {
        self.group_cols.last().map(String::as_str).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Table;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn make_table() -> Table {
        let rows = [
            ["East", "Tech", "Phones", "10"],
            ["East", "Office", "Paper", "4"],
            ["West", "Tech", "Phones", "7"],
            ["East", "Tech", "Laptops", "12"],
            ["West", "Tech", "Phones", "1"],
        ];
        Table::new(
            cols(&["Region", "Category", "Item", "Sales"]),
            rows.iter().map(|r| cols(r)).collect(),
        )
    }

    #[test]
    fn test_single_group_is_flat() {
        let layout = compute_column_layout(&make_table(), &cols(&["Region"])).unwrap();
        assert_eq!(layout.column_count(), 2);
        assert_eq!(layout.column_paths[0].inner, "East");
        assert!(layout.column_paths[0].outer.is_empty());
        assert!(layout.tree.iter().all(|n| n.children.is_empty()));
    }

    #[test]
    fn test_absent_combination_has_no_column() {
        let layout = compute_column_layout(&make_table(), &cols(&["Region", "Category"])).unwrap();
        assert_eq!(layout.column_count(), 3);
        let labels: Vec<&str> = layout.column_paths.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["East / Tech", "East / Office", "West / Tech"]);
    }

    #[test]
    fn test_three_levels() {
        let group = cols(&["Region", "Category", "Item"]);
        let layout = compute_column_layout(&make_table(), &group).unwrap();
        assert_eq!(layout.column_count(), 4);
        assert_eq!(layout.tree.len(), 2);
        assert_eq!(layout.tree[0].leaf_count(), 3);
        assert_eq!(layout.tree[1].leaf_count(), 1);

        let last = &layout.column_paths[3];
        assert_eq!(last.outer, vec!["West", "Tech"]);
        assert_eq!(
            last.constraints(&group),
            vec![("Region", "West"), ("Category", "Tech"), ("Item", "Phones")]
        );
    }

    #[test]
    fn test_layout_errors() {
        let table = make_table();
        assert_eq!(compute_column_layout(&table, &[]).unwrap_err(), FacetError::EmptyGroupSpec);
        assert_eq!(
            compute_column_layout(&table, &cols(&["Region", "Segment"])).unwrap_err(),
            FacetError::ColumnNotFound("Segment".to_string())
        );
    }

    #[test]
    fn test_titles_exclude_innermost() {
        let group = cols(&["Region", "Category", "Item"]);
        let layout = compute_column_layout(&make_table(), &group).unwrap();
        let titles = compute_subplot_titles(&layout.column_paths, &group);
        assert_eq!(titles.levels.len(), 2);
        assert_eq!(titles.levels[0].values, vec!["East", "West"]);
        assert_eq!(titles.levels[1].values, vec!["Tech", "Office"]);
        assert_eq!(titles.render(" | ", &group), "East | West\nTech | Office");
    }

    #[test]
    fn test_single_group_title_is_column_name() {
        let group = cols(&["Region"]);
        let layout = compute_column_layout(&make_table(), &group).unwrap();
        let titles = compute_subplot_titles(&layout.column_paths, &group);
        assert!(titles.is_empty());
        assert_eq!(titles.render(" | ", &group), "Region");
    }

    #[test]
    fn test_measure_layout() {
        let measures = vec![
            MeasureSpec::new("Sales", Some("sum")),
            MeasureSpec::new("Profit", Some("mean")),
        ];
        let layout = compute_measure_layout(&measures, true).unwrap();
        assert_eq!(layout.row_count, 2);
        assert_eq!(layout.measures[1].aggregation, Some(AggregationFunction::Mean));

        let raw = compute_measure_layout(&measures, false).unwrap();
        assert!(raw.measures.iter().all(|m| m.aggregation.is_none()));
    }

    #[test]
    fn test_measure_layout_errors() {
        assert_eq!(compute_measure_layout(&[], true).unwrap_err(), FacetError::NoMeasuresSelected);
        assert_eq!(compute_measure_layout(&[], false).unwrap_err(), FacetError::NoMeasuresSelected);
        assert_eq!(
            compute_measure_layout(&[MeasureSpec::new("Sales", Some("prod"))], true).unwrap_err(),
            FacetError::UnknownAggregationFunction("prod".to_string())
        );
        assert_eq!(
            compute_measure_layout(&[MeasureSpec::new("Sales", None)], true).unwrap_err(),
            FacetError::MissingAggregation("Sales".to_string())
        );
    }
}
