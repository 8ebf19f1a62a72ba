use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

use facetplan::csv_reader;
use facetplan::{build_facet_grid, AggregationFunction, ColumnKind, FacetRequest, MeasureSpec, Table};

#[derive(Parser, Debug)]
#[command(name = "facetplan")]
#[command(about = "Compute a faceted chart layout and its series from CSV data", long_about = None)]
struct Args {
    /// Request JSON (e.g., '{"group_by": ["Region"], "measures": [{"column": "Sales", "aggregation": "sum"}]}')
    request: String,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Fill in missing grouping/measure columns from the inferred column kinds
    #[arg(long)]
    infer: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    // Read CSV from stdin
    let csv_data = csv_reader::read_csv_from_stdin()
        .context("Failed to read CSV from stdin")?;
    let table = Table::from_csv(csv_data);

    let mut request = FacetRequest::from_json(&args.request)
        .context("Failed to parse request JSON")?;

    if args.infer {
        fill_from_inferred_kinds(&mut request, &table);
    }

    let output = build_facet_grid(&table, &request)
        .context("Failed to build facet grid")?;

    let json = if args.pretty {
        serde_json::to_vec_pretty(&output)
    } else {
        serde_json::to_vec(&output)
    }
    .context("Failed to serialize output")?;

    // Write JSON to stdout
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle.write_all(&json).context("Failed to write output to stdout")?;
    handle.write_all(b"\n").context("Failed to write output to stdout")?;
    handle.flush().context("Failed to flush stdout")?;

    Ok(())
}

/// Default the first categorical column as grouping and every numerical
/// column as a summed measure, for whichever of the two the request omits.
fn fill_from_inferred_kinds(request: &mut FacetRequest, table: &Table) {
    if request.group_by.is_empty() {
        request.group_by = table
            .columns_of_kind(ColumnKind::Categorical)
            .into_iter()
            .take(1)
            .collect();
        tracing::info!(group_by = ?request.group_by, "inferred grouping columns");
    }
    if request.measures.is_empty() {
        let aggregation = AggregationFunction::Sum.name();
        request.measures = table
            .columns_of_kind(ColumnKind::Numerical)
            .into_iter()
            .map(|column| MeasureSpec::new(column, Some(aggregation)))
            .collect();
        tracing::info!(measures = request.measures.len(), "inferred measure columns");
    }
}
