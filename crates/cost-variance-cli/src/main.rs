mod commands;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::dashboard::{DashboardArgs, OptionsArgs, SliceArgs};
#[cfg(feature = "generator")]
use commands::generate::GenerateArgs;

/// Manufacturing cost-variance dashboard
#[derive(Parser)]
#[command(
    name = "costvar",
    version,
    about = "Manufacturing cost-variance dashboard",
    long_about = "Loads cost postings, production records and the product master, \
                  derives realized vs standard unit cost per period, cost center and \
                  product, and reports cost KPIs, deviation severity and the products \
                  with the largest financial impact for a selection of periods and \
                  cost centers."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the dashboard KPIs, chart series and product ranking
    Dashboard(DashboardArgs),
    /// Print the realized vs standard unit cost table
    AnalyticalTable(SliceArgs),
    /// Print the full per-product financial impact ranking
    Ranking(SliceArgs),
    /// List the periods and cost centers available for selection
    Options(OptionsArgs),
    /// Write a synthetic dataset
    #[cfg(feature = "generator")]
    Generate(GenerateArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Dashboard(args) => commands::dashboard::run_dashboard(args),
        Commands::AnalyticalTable(args) => commands::dashboard::run_analytical_table(args),
        Commands::Ranking(args) => commands::dashboard::run_ranking(args),
        Commands::Options(args) => commands::dashboard::run_options(args),
        #[cfg(feature = "generator")]
        Commands::Generate(args) => commands::generate::run_generate(args),
        Commands::Version => {
            println!("costvar {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
