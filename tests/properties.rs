use std::collections::HashSet;

use proptest::prelude::*;

use facetplan::{
    build_facet_grid, compute_column_layout, compute_measure_layout, FacetError, FacetRequest,
    MeasureSpec, Table, TabularData,
};

const REGIONS: [&str; 4] = ["East", "West", "Central", ""];
const CATEGORIES: [&str; 4] = ["Tech", "Office", "Furniture", "NA"];
const SEGMENTS: [&str; 2] = ["Consumer", "Corporate"];

fn cols(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn table_strategy() -> impl Strategy<Value = Table> {
    prop::collection::vec(
        (0..4usize, 0..4usize, 0..2usize, prop::option::of(-50..500i32)),
        1..40,
    )
    .prop_map(|rows| {
        let rows = rows
            .into_iter()
            .map(|(r, c, s, sales)| {
                vec![
                    REGIONS[r].to_string(),
                    CATEGORIES[c].to_string(),
                    SEGMENTS[s].to_string(),
                    sales.map(|v| v.to_string()).unwrap_or_default(),
                ]
            })
            .collect();
        Table::new(cols(&["Region", "Category", "Segment", "Sales"]), rows)
    })
}

fn clean(table: &Table, group: &[String]) -> Table {
    let mut referenced: Vec<&str> = group.iter().map(String::as_str).collect();
    referenced.push("Sales");
    table.drop_nulls(&referenced).unwrap()
}

proptest! {
    #[test]
    fn single_group_columns_are_the_unique_values(table in table_strategy()) {
        let group = cols(&["Region"]);
        let data = clean(&table, &group);
        let layout = compute_column_layout(&data, &group).unwrap();

        let inner: Vec<&String> = layout.column_paths.iter().map(|p| &p.inner).collect();
        let distinct: HashSet<&String> = inner.iter().copied().collect();
        prop_assert_eq!(distinct.len(), inner.len());

        let expected: HashSet<String> = data.column_values("Region").unwrap().into_iter().collect();
        prop_assert_eq!(layout.column_count(), expected.len());
        prop_assert!(layout.column_paths.iter().all(|p| p.outer.is_empty()));
    }

    #[test]
    fn nested_leaf_counts_match_columns(table in table_strategy()) {
        let group = cols(&["Region", "Category", "Segment"]);
        let data = clean(&table, &group);
        let layout = compute_column_layout(&data, &group).unwrap();

        let leaves: usize = layout.tree.iter().map(|n| n.leaf_count()).sum();
        prop_assert_eq!(leaves, layout.column_count());

        for path in &layout.column_paths {
            let mut subset = data.clone();
            for (column, value) in path.constraints(&group) {
                subset = subset.filter_eq(column, value).unwrap();
            }
            prop_assert!(subset.row_count() > 0);
        }
    }

    #[test]
    fn column_layout_is_idempotent(table in table_strategy()) {
        let group = cols(&["Category", "Region"]);
        let data = clean(&table, &group);
        let first = compute_column_layout(&data, &group).unwrap();
        let second = compute_column_layout(&data, &group).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn empty_measures_always_fail(aggregate in any::<bool>()) {
        prop_assert_eq!(compute_measure_layout(&[], aggregate).unwrap_err(), FacetError::NoMeasuresSelected);
    }

    #[test]
    fn grid_rows_conserve_non_null_rows(table in table_strategy(), aggregate in any::<bool>()) {
        let group = cols(&["Region", "Category"]);
        let non_null = clean(&table, &group).row_count();
        prop_assume!(non_null > 0);

        let request = FacetRequest {
            group_by: group,
            measures: vec![
                MeasureSpec::new("Sales", Some("sum")),
                MeasureSpec::new("Sales", Some("median")),
            ],
            aggregate,
            ..Default::default()
        };
        let output = build_facet_grid(&table, &request).unwrap();
        prop_assert_eq!(output.plan.row_count, 2);
        prop_assert_eq!(output.plan.column_count, output.plan.column_paths.len());

        for row in 0..output.grid.row_count {
            let total: usize = output.grid.row(row).map(|c| c.input_rows).sum();
            prop_assert_eq!(total, non_null);
        }

        for col in 0..output.grid.column_count {
            let top = &output.grid.cell(0, col).unwrap().constraints;
            let bottom = &output.grid.cell(1, col).unwrap().constraints;
            prop_assert_eq!(top, bottom);
        }
    }
}
