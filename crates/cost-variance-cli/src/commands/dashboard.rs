use clap::Args;
use serde_json::Value;
use std::time::Instant;

use cost_variance_core::analytics::filter::filter;
use cost_variance_core::analytics::ranking::product_ranking;
use cost_variance_core::dashboard::{compute_with_options, DashboardOptions};
use cost_variance_core::types::with_metadata;

use super::source::{SelectionArgs, SourceArgs};

/// Arguments for the dashboard bundle
#[derive(Args)]
pub struct DashboardArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Number of cost centers in the top cost-center view
    #[arg(long, default_value_t = 10)]
    pub top_cost_centers: usize,

    /// Number of products in the financial-impact ranking
    #[arg(long, default_value_t = 10)]
    pub top_products: usize,
}

/// Arguments for commands that print a slice of rows
#[derive(Args)]
pub struct SliceArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub selection: SelectionArgs,
}

/// Arguments for listing selectable values
#[derive(Args)]
pub struct OptionsArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

pub fn run_dashboard(args: DashboardArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let context = args.source.load()?;
    let selection = args.selection.resolve(&context)?;
    let options = DashboardOptions {
        top_n_cost_centers: args.top_cost_centers,
        top_n_products: args.top_products,
    };
    let result = compute_with_options(&selection, &context, &options);
    Ok(serde_json::to_value(result)?)
}

pub fn run_analytical_table(args: SliceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let context = args.source.load()?;
    let selection = args.selection.resolve(&context)?;
    let rows = filter(context.analytical_table(), &selection);

    let warnings = if rows.is_empty() {
        vec!["Selection matches no analytical rows".to_string()]
    } else {
        Vec::new()
    };
    let result = with_metadata(
        "Production left-joined with productive cost and standard cost",
        &serde_json::json!({
            "periods": selection.periods,
            "cost_centers": selection.cost_centers,
        }),
        warnings,
        start.elapsed().as_micros() as u64,
        rows,
    );
    Ok(serde_json::to_value(result)?)
}

pub fn run_ranking(args: SliceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let context = args.source.load()?;
    let selection = args.selection.resolve(&context)?;
    let rows = filter(context.analytical_table(), &selection);

    let result = with_metadata(
        "Per-product financial impact of unit cost deviation, descending",
        &serde_json::json!({
            "periods": selection.periods,
            "cost_centers": selection.cost_centers,
        }),
        Vec::new(),
        start.elapsed().as_micros() as u64,
        product_ranking(&rows),
    );
    Ok(serde_json::to_value(result)?)
}

pub fn run_options(args: OptionsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let context = args.source.load()?;
    Ok(serde_json::json!({
        "periods": context.periods(),
        "cost_centers": context.cost_centers(),
    }))
}
