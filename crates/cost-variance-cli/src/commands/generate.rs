use clap::Args;
use serde_json::Value;
use std::path::PathBuf;

use cost_variance_core::dataset::write_dataset;
use cost_variance_core::generator::{generate_dataset, GeneratorConfig};

use crate::input;

/// Arguments for synthetic dataset generation
#[derive(Args)]
pub struct GenerateArgs {
    /// Directory to write the CSV files into
    #[arg(long, default_value = "data")]
    pub out: PathBuf,

    /// JSON or YAML generator config; flags below override it
    #[arg(long)]
    pub config: Option<String>,

    /// RNG seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of production records
    #[arg(long)]
    pub production_rows: Option<usize>,

    /// Number of cost postings
    #[arg(long)]
    pub posting_rows: Option<usize>,
}

pub fn run_generate(args: GenerateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut config: GeneratorConfig = match args.config {
        Some(ref path) => input::file::read_structured(path)?,
        None => GeneratorConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(n) = args.production_rows {
        config.production_rows = n;
    }
    if let Some(n) = args.posting_rows {
        config.posting_rows = n;
    }

    let dataset = generate_dataset(&config)?;
    write_dataset(&args.out, &dataset)?;

    Ok(serde_json::json!({
        "directory": args.out.display().to_string(),
        "seed": config.seed,
        "cost_centers": dataset.cost_centers.len(),
        "products": dataset.products.len(),
        "production": dataset.production.len(),
        "postings": dataset.postings.len(),
        "total_rows": dataset.cost_centers.len()
            + dataset.products.len()
            + dataset.production.len()
            + dataset.postings.len(),
    }))
}
