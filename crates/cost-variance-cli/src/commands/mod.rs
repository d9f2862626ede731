pub mod dashboard;
#[cfg(feature = "generator")]
pub mod generate;
pub mod source;
