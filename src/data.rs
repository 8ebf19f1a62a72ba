use std::collections::HashSet;

use serde::Serialize;

use crate::aggregate::AggregationFunction;
use crate::error::{self, FacetError};

/// Tokens treated as missing values, compared after trimming.
const NULL_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "#N/A",
    "#N/A N/A", "#NA", "<NA>", "1.#IND", "-1.#IND", "1.#QNAN", "-1.#QNAN",
];

/// A cell is null when it is a missing-value token or any spelling that
/// parses to NaN.
pub fn is_null_cell(cell: &str) -> bool {
    let cell = cell.trim();
    NULL_TOKENS.contains(&cell) || cell.parse::<f64>().is_ok_and(f64::is_nan)
}

/// The table operations the facet engine relies on.
///
/// Every operation returns owned results; nothing is shared between calls.
pub trait TabularData: Sized {
    fn headers(&self) -> &[String];

    fn row_count(&self) -> usize;

    /// Position of `name` among the headers (exact match).
    fn column_index(&self, name: &str) -> error::Result<usize> {
        self.headers()
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| FacetError::ColumnNotFound(name.to_string()))
    }

    /// Rows whose `column` equals `value`.
    fn filter_eq(&self, column: &str, value: &str) -> error::Result<Self>;

    /// Rows with a non-null cell in every one of `columns`.
    fn drop_nulls(&self, columns: &[&str]) -> error::Result<Self>;

    /// Raw cells of `column`, in row order.
    fn column_values(&self, column: &str) -> error::Result<Vec<String>>;

    /// Distinct values of `column` in first-seen order.
    fn unique_values(&self, column: &str) -> error::Result<Vec<String>> {
        let mut seen = HashSet::new();
        let mut unique = Vec::new();
        for value in self.column_values(column)? {
            if seen.insert(value.clone()) {
                unique.push(value);
            }
        }
        Ok(unique)
    }

    /// Cells of `column` parsed as numbers.
    fn numeric_values(&self, column: &str) -> error::Result<Vec<f64>> {
        self.column_values(column)?
            .into_iter()
            .map(|cell| {
                cell.trim().parse::<f64>().map_err(|_| FacetError::NonNumericValue {
                    column: column.to_string(),
                    value: cell.clone(),
                })
            })
            .collect()
    }

    /// Group rows by `by` (first-seen order) and reduce `measure` per group.
    fn group_aggregate(
        &self,
        by: &str,
        measure: &str,
        aggregation: AggregationFunction,
    ) -> error::Result<(Vec<String>, Vec<f64>)> {
        let keys = self.unique_values(by)?;
        let mut values = Vec::with_capacity(keys.len());
        for key in &keys {
            let group = self.filter_eq(by, key)?;
            values.push(aggregation.apply(&group.numeric_values(measure)?));
        }
        Ok((keys, values))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Categorical,
    Numerical,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Create a Table from an existing CsvData struct
    pub fn from_csv(csv: crate::csv_reader::CsvData) -> Self {
        Self {
            headers: csv.headers,
            rows: csv.rows,
        }
    }

    fn with_rows(&self, rows: Vec<Vec<String>>) -> Self {
        Self {
            headers: self.headers.clone(),
            rows,
        }
    }

    /// A column is numerical when every non-null cell parses as a number
    /// and at least one such cell exists.
    pub fn infer_column_kinds(&self) -> Vec<(String, ColumnKind)> {
        self.headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                let mut non_null = self.rows
                    .iter()
                    .filter_map(|row| row.get(idx))
                    .filter(|cell| !is_null_cell(cell))
                    .peekable();
                let has_values = non_null.peek().is_some();
                let all_numeric = non_null.all(|cell| cell.trim().parse::<f64>().is_ok());
                let kind = if has_values && all_numeric {
                    ColumnKind::Numerical
                } else {
                    ColumnKind::Categorical
                };
                (header.clone(), kind)
            })
            .collect()
    }

    pub fn columns_of_kind(&self, kind: ColumnKind) -> Vec<String> {
        self.infer_column_kinds()
            .into_iter()
            .filter(|(_, k)| *k == kind)
            .map(|(name, _)| name)
            .collect()
    }
}

impl TabularData for Table {
    fn headers(&self) -> &[String] {
        &self.headers
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn filter_eq(&self, column: &str, value: &str) -> error::Result<Self> {
        let idx = self.column_index(column)?;
        let rows = self.rows
            .iter()
            .filter(|row| row.get(idx).map(String::as_str) == Some(value))
            .cloned()
            .collect();
        Ok(self.with_rows(rows))
    }

    fn drop_nulls(&self, columns: &[&str]) -> error::Result<Self> {
        let indices = columns
            .iter()
            .map(|c| self.column_index(c))
            .collect::<error::Result<Vec<_>>>()?;
        let rows = self.rows
            .iter()
            .filter(|row| {
                indices
                    .iter()
                    .all(|&i| row.get(i).is_some_and(|cell| !is_null_cell(cell)))
            })
            .cloned()
            .collect();
        Ok(self.with_rows(rows))
    }

    fn column_values(&self, column: &str) -> error::Result<Vec<String>> {
        let idx = self.column_index(column)?;
        Ok(self.rows
            .iter()
            .map(|row| row.get(idx).cloned().unwrap_or_default())
            .collect())
    }
}
