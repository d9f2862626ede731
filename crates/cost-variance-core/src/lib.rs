pub mod analytics;
pub mod dataset;
pub mod error;
pub mod types;

#[cfg(feature = "dashboard")]
pub mod dashboard;

#[cfg(feature = "generator")]
pub mod generator;

pub use error::{CostVarianceError, LoadError};
pub use types::*;

/// Standard result type for all cost-variance operations
pub type CostVarianceResult<T> = Result<T, CostVarianceError>;
