use clap::Args;
use std::path::PathBuf;

use cost_variance_core::analytics::filter::Selection;
use cost_variance_core::dashboard::DashboardContext;
use cost_variance_core::dataset::period::normalize_period;
use cost_variance_core::dataset::DatasetPaths;

use crate::input;

/// Where to read the source tables from
#[derive(Args, Clone)]
pub struct SourceArgs {
    /// Directory holding cost_postings.csv, production.csv, products.csv
    /// and optionally cost_centers.csv
    #[arg(long, env = "COSTVAR_DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,

    /// Cost postings file (overrides --data-dir)
    #[arg(long)]
    pub postings: Option<PathBuf>,

    /// Production file (overrides --data-dir)
    #[arg(long)]
    pub production: Option<PathBuf>,

    /// Product master file (overrides --data-dir)
    #[arg(long)]
    pub products: Option<PathBuf>,

    /// Cost-center master, used to resolve postings without a cost nature
    #[arg(long)]
    pub cost_centers: Option<PathBuf>,

    /// Field delimiter of the source files
    #[arg(long, env = "COSTVAR_DELIMITER", default_value_t = ',')]
    pub delimiter: char,
}

impl SourceArgs {
    pub fn paths(&self) -> Result<DatasetPaths, Box<dyn std::error::Error>> {
        if !self.delimiter.is_ascii() {
            return Err(format!(
                "Delimiter must be a single ASCII character, got '{}'",
                self.delimiter
            )
            .into());
        }
        let mut paths = DatasetPaths::from_dir(&self.data_dir).with_delimiter(self.delimiter as u8);
        if let Some(p) = &self.postings {
            paths.postings = p.clone();
        }
        if let Some(p) = &self.production {
            paths.production = p.clone();
        }
        if let Some(p) = &self.products {
            paths.products = p.clone();
        }
        if let Some(p) = &self.cost_centers {
            paths.cost_centers = Some(p.clone());
        }
        Ok(paths)
    }

    pub fn load(&self) -> Result<DashboardContext, Box<dyn std::error::Error>> {
        let paths = self.paths()?;
        tracing::debug!(
            postings = %paths.postings.display(),
            production = %paths.production.display(),
            products = %paths.products.display(),
            "loading sources"
        );
        Ok(DashboardContext::load(&paths)?)
    }
}

/// Which periods and cost centers to analyse
#[derive(Args, Clone)]
pub struct SelectionArgs {
    /// Period to include (YYYY-MM); repeatable. Defaults to every known period.
    #[arg(long = "period", value_name = "YYYY-MM")]
    pub periods: Vec<String>,

    /// Cost center to include; repeatable. Defaults to every known cost center.
    #[arg(long = "cost-center", value_name = "ID")]
    pub cost_centers: Vec<String>,

    /// JSON or YAML file with {"periods": [...], "cost_centers": [...]}
    #[arg(long)]
    pub selection: Option<String>,
}

impl SelectionArgs {
    /// Resolve the selection: a selection file, then flags, then piped JSON,
    /// then every known value. A file or piped selection is taken verbatim,
    /// so empty lists there really select nothing. With flags, a dimension
    /// left unspecified means all of its known values. Periods from every
    /// source are normalized to `YYYY-MM`.
    pub fn resolve(
        &self,
        context: &DashboardContext,
    ) -> Result<Selection, Box<dyn std::error::Error>> {
        self.resolve_with(context, input::stdin::read_stdin::<Selection>)
    }

    fn resolve_with<F>(
        &self,
        context: &DashboardContext,
        piped: F,
    ) -> Result<Selection, Box<dyn std::error::Error>>
    where
        F: FnOnce() -> Result<Option<Selection>, Box<dyn std::error::Error>>,
    {
        if let Some(ref path) = self.selection {
            let selection: Selection = input::file::read_structured(path)?;
            return normalize_selection(selection);
        }

        if !self.periods.is_empty() || !self.cost_centers.is_empty() {
            let periods = if self.periods.is_empty() {
                context.periods().to_vec()
            } else {
                normalize_periods(&self.periods)?
            };
            let cost_centers = if self.cost_centers.is_empty() {
                context.cost_centers().to_vec()
            } else {
                self.cost_centers.clone()
            };
            return Ok(Selection::new(periods, cost_centers));
        }

        if let Some(selection) = piped()? {
            return normalize_selection(selection);
        }

        Ok(context.all_selection())
    }
}

fn normalize_periods<'a>(
    raw: impl IntoIterator<Item = &'a String>,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    raw.into_iter()
        .map(|p| {
            normalize_period(p).ok_or_else(|| {
                Box::<dyn std::error::Error>::from(format!("Invalid period '{}'", p))
            })
        })
        .collect()
}

fn normalize_selection(selection: Selection) -> Result<Selection, Box<dyn std::error::Error>> {
    Ok(Selection {
        periods: normalize_periods(&selection.periods)?.into_iter().collect(),
        cost_centers: selection.cost_centers,
    })
}
