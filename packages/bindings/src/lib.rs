use cost_variance_core::analytics::filter::Selection;
use cost_variance_core::dashboard::{self, DashboardContext, DashboardOptions};
use cost_variance_core::dataset::DatasetPaths;
use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Selection plus optional view truncation, as sent from JavaScript.
#[derive(Debug, Default, Deserialize)]
struct ComputeRequest {
    #[serde(default)]
    periods: Vec<String>,
    #[serde(default)]
    cost_centers: Vec<String>,
    #[serde(default)]
    options: Option<DashboardOptions>,
}

impl ComputeRequest {
    fn parse(input_json: &str) -> NapiResult<Self> {
        if input_json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(input_json).map_err(to_napi_error)
    }

    fn selection(&self) -> Selection {
        Selection::new(self.periods.iter().cloned(), self.cost_centers.iter().cloned())
    }
}

// ---------------------------------------------------------------------------
// Dashboard session
// ---------------------------------------------------------------------------

/// Loaded dataset held on the native side so repeated selections do not
/// re-read the CSV files.
#[napi]
pub struct CostDashboard {
    context: DashboardContext,
}

#[napi]
impl CostDashboard {
    /// `paths_json` is either `{"dir": "..."}` or an explicit
    /// `{"postings", "production", "products", "cost_centers"?}` object.
    #[napi(constructor)]
    pub fn new(paths_json: String) -> napi::Result<Self> {
        let paths = parse_paths(&paths_json)?;
        let context = DashboardContext::load(&paths).map_err(to_napi_error)?;
        Ok(CostDashboard { context })
    }

    /// Known periods and cost centers, for populating the filter widgets.
    #[napi]
    pub fn options(&self) -> NapiResult<String> {
        serde_json::to_string(&serde_json::json!({
            "periods": self.context.periods(),
            "cost_centers": self.context.cost_centers(),
        }))
        .map_err(to_napi_error)
    }

    #[napi]
    pub fn all_selection(&self) -> NapiResult<String> {
        serde_json::to_string(&self.context.all_selection()).map_err(to_napi_error)
    }

    #[napi]
    pub fn compute(&self, selection_json: String) -> NapiResult<String> {
        let request = ComputeRequest::parse(&selection_json)?;
        let options = request.options.unwrap_or_default();
        let output =
            dashboard::compute_with_options(&request.selection(), &self.context, &options);
        serde_json::to_string(&output).map_err(to_napi_error)
    }

    #[napi]
    pub fn analytical_table(&self, selection_json: String) -> NapiResult<String> {
        let request = ComputeRequest::parse(&selection_json)?;
        let (_, rows) = dashboard::slice(&request.selection(), &self.context);
        serde_json::to_string(&rows).map_err(to_napi_error)
    }
}

// ---------------------------------------------------------------------------
// One-shot
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_dashboard(paths_json: String, selection_json: String) -> NapiResult<String> {
    CostDashboard::new(paths_json)?.compute(selection_json)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PathsInput {
    Dir {
        dir: String,
        #[serde(default)]
        delimiter: Option<String>,
    },
    Explicit(DatasetPaths),
}

fn parse_paths(paths_json: &str) -> NapiResult<DatasetPaths> {
    let input: PathsInput = serde_json::from_str(paths_json).map_err(to_napi_error)?;
    match input {
        PathsInput::Dir { dir, delimiter } => {
            let paths = DatasetPaths::from_dir(dir);
            match delimiter.as_deref().map(str::as_bytes) {
                None => Ok(paths),
                Some([b]) => Ok(paths.with_delimiter(*b)),
                Some(_) => Err(to_napi_error("delimiter must be a single ASCII character")),
            }
        }
        PathsInput::Explicit(paths) => Ok(paths),
    }
}
