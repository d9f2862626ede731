pub mod compute;
pub mod context;

pub use compute::{compute, compute_with_options, slice, DashboardOptions, DashboardOutput};
pub use context::DashboardContext;
