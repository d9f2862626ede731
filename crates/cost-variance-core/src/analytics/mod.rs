pub mod aggregate;
pub mod analytical;
pub mod filter;
pub mod metrics;
pub mod ranking;

pub use aggregate::{aggregate_production, aggregate_productive_cost};
pub use analytical::{build_analytical_table, AnalyticalRow};
pub use filter::{filter, Selection, SelectionKey};
pub use metrics::SeverityBand;
pub use ranking::{product_ranking, ProductImpact};
