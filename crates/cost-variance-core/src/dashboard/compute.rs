use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::context::DashboardContext;
use crate::analytics::analytical::{count_undefined, AnalyticalRow};
use crate::analytics::filter::{filter, Selection};
use crate::analytics::metrics::{
    self, CostCenterTotal, CostTypeTotal, PeriodTotal, ScatterPoint, SeverityBand,
};
use crate::analytics::ranking::{self, ProductImpact};
use crate::dataset::CostPosting;
use crate::types::{with_metadata, ComputationOutput, Money, Percent};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Truncation of the ranked views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardOptions {
    #[serde(default = "default_top_n")]
    pub top_n_cost_centers: usize,
    #[serde(default = "default_top_n")]
    pub top_n_products: usize,
}

fn default_top_n() -> usize {
    10
}

impl Default for DashboardOptions {
    fn default() -> Self {
        DashboardOptions {
            top_n_cost_centers: default_top_n(),
            top_n_products: default_top_n(),
        }
    }
}

/// Everything the dashboard shows for one selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardOutput {
    pub total_cost: Money,
    /// Percent of total cost that is indirect; 0 when total cost is not positive
    pub indirect_percentage: Percent,
    /// Quantity-weighted deviation against standard, in percent
    pub weighted_average_deviation: Percent,
    pub severity_band: SeverityBand,
    /// Σ(deviation × quantity) over the selected analytical rows
    pub financial_impact: Money,
    pub posting_count: usize,
    pub analytical_row_count: usize,
    pub time_series: Vec<PeriodTotal>,
    pub breakdown_by_type: Vec<CostTypeTotal>,
    pub top_cost_centers: Vec<CostCenterTotal>,
    pub scatter_points: Vec<ScatterPoint>,
    pub product_ranking: Vec<ProductImpact>,
}

// ---------------------------------------------------------------------------
// Slicing
// ---------------------------------------------------------------------------

/// Postings and analytical rows inside `selection`.
pub fn slice(
    selection: &Selection,
    context: &DashboardContext,
) -> (Vec<CostPosting>, Vec<AnalyticalRow>) {
    (
        filter(&context.dataset().postings, selection),
        filter(context.analytical_table(), selection),
    )
}

// ---------------------------------------------------------------------------
// Compute
// ---------------------------------------------------------------------------

/// Recompute the dashboard for `selection` with the default top-10 views.
pub fn compute(
    selection: &Selection,
    context: &DashboardContext,
) -> ComputationOutput<DashboardOutput> {
    compute_with_options(selection, context, &DashboardOptions::default())
}

/// Pure function of the selection and the context: filter both tables, then
/// derive headline metrics, chart series and the product ranking. Never
/// fails; an empty selection yields zeros and empty series.
pub fn compute_with_options(
    selection: &Selection,
    context: &DashboardContext,
    options: &DashboardOptions,
) -> ComputationOutput<DashboardOutput> {
    let start = Instant::now();
    let mut warnings = selection_warnings(selection, context);

    let (postings, rows) = slice(selection, context);

    let negative = postings.iter().filter(|p| p.amount < Decimal::ZERO).count();
    if negative > 0 {
        warnings.push(format!(
            "{negative} posting(s) with negative amounts included in totals"
        ));
    }
    let (no_realized, no_standard) = count_undefined(&rows);
    if no_realized > 0 {
        warnings.push(format!(
            "{no_realized} analytical row(s) have no realized unit cost (no productive cost or zero quantity)"
        ));
    }
    if no_standard > 0 {
        warnings.push(format!(
            "{no_standard} analytical row(s) reference products missing from the product master"
        ));
    }

    let weighted_average_deviation = metrics::weighted_average_deviation(&rows);
    let output = DashboardOutput {
        total_cost: metrics::total_cost(&postings),
        indirect_percentage: metrics::indirect_percentage(&postings),
        weighted_average_deviation,
        severity_band: metrics::severity_band(weighted_average_deviation),
        financial_impact: metrics::financial_impact(&rows),
        posting_count: postings.len(),
        analytical_row_count: rows.len(),
        time_series: metrics::time_series(&postings),
        breakdown_by_type: metrics::breakdown_by_type(&postings),
        top_cost_centers: metrics::top_cost_centers(&postings, options.top_n_cost_centers),
        scatter_points: metrics::scatter_points(&rows),
        product_ranking: ranking::top_products(&rows, options.top_n_products),
    };

    debug!(
        postings = output.posting_count,
        rows = output.analytical_row_count,
        "dashboard computed"
    );

    let elapsed = start.elapsed().as_micros() as u64;

    with_metadata(
        "Realized vs Standard Unit Cost Variance (quantity-weighted)",
        &serde_json::json!({
            "periods": selection.periods,
            "cost_centers": selection.cost_centers,
            "productive_nature_only": true,
            "acceptable_band_pct": [0, 5],
            "top_n_cost_centers": options.top_n_cost_centers,
            "top_n_products": options.top_n_products,
        }),
        warnings,
        elapsed,
        output,
    )
}

fn selection_warnings(selection: &Selection, context: &DashboardContext) -> Vec<String> {
    let mut warnings = Vec::new();
    if selection.periods.is_empty() {
        warnings.push("No period selected; all metrics default to zero".to_string());
    }
    if selection.cost_centers.is_empty() {
        warnings.push("No cost center selected; all metrics default to zero".to_string());
    }

    let unknown_periods: Vec<&str> = selection
        .periods
        .iter()
        .filter(|p| !context.periods().contains(*p))
        .map(String::as_str)
        .collect();
    if !unknown_periods.is_empty() {
        warnings.push(format!("Unknown period(s): {}", unknown_periods.join(", ")));
    }

    let unknown_centers: Vec<&str> = selection
        .cost_centers
        .iter()
        .filter(|cc| !context.cost_centers().contains(*cc))
        .map(String::as_str)
        .collect();
    if !unknown_centers.is_empty() {
        warnings.push(format!(
            "Unknown cost center(s): {}",
            unknown_centers.join(", ")
        ));
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{
        CostNature, CostPosting, CostType, Dataset, Product, ProductionRecord,
    };
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn example_context() -> DashboardContext {
        DashboardContext::new(Dataset {
            postings: vec![
                CostPosting {
                    posting_id: "1".to_string(),
                    period: "2024-01".to_string(),
                    cost_center: Some("CC100".to_string()),
                    cost_type: CostType::Indirect,
                    cost_nature: CostNature::Administrative,
                    category: None,
                    amount: dec!(100),
                    supplier: None,
                    production_order: None,
                },
                CostPosting {
                    posting_id: "2".to_string(),
                    period: "2024-01".to_string(),
                    cost_center: Some("CC100".to_string()),
                    cost_type: CostType::Direct,
                    cost_nature: CostNature::Productive,
                    category: None,
                    amount: dec!(300),
                    supplier: None,
                    production_order: None,
                },
            ],
            production: vec![ProductionRecord {
                date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                period: "2024-01".to_string(),
                product: "P1".to_string(),
                production_line: None,
                quantity_produced: dec!(10),
                machine_hours: None,
                cost_center: "CC100".to_string(),
            }],
            products: vec![Product {
                product: "P1".to_string(),
                category: None,
                standard_unit_cost: dec!(30),
            }],
            cost_centers: vec![],
        })
    }

    #[test]
    fn test_reference_scenario() {
        let ctx = example_context();
        let out = compute(&ctx.all_selection(), &ctx);
        let r = &out.result;
        assert_eq!(r.total_cost, dec!(400));
        assert_eq!(r.indirect_percentage, dec!(25));
        assert_eq!(r.weighted_average_deviation, dec!(0));
        assert_eq!(r.severity_band, SeverityBand::Acceptable);
        assert_eq!(r.financial_impact, dec!(0));
        assert_eq!(r.scatter_points[0].realized_unit_cost, Some(dec!(30)));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_empty_selection_is_neutral() {
        let ctx = example_context();
        let sel = Selection::new(ctx.periods().to_vec(), Vec::<String>::new());
        let out = compute(&sel, &ctx);
        let r = &out.result;
        assert_eq!(r.total_cost, dec!(0));
        assert_eq!(r.indirect_percentage, dec!(0));
        assert_eq!(r.weighted_average_deviation, dec!(0));
        assert_eq!(r.financial_impact, dec!(0));
        assert_eq!(r.severity_band, SeverityBand::Acceptable);
        assert!(r.product_ranking.is_empty());
        assert!(r.time_series.is_empty());
        assert!(r.scatter_points.is_empty());
        assert!(out.warnings.iter().any(|w| w.contains("No cost center")));
    }

    #[test]
    fn test_unknown_selection_values_are_reported() {
        let ctx = example_context();
        let sel = Selection::new(["2030-01"], ["CC999"]);
        let out = compute(&sel, &ctx);
        assert_eq!(out.result.posting_count, 0);
        assert!(out.warnings.iter().any(|w| w.contains("2030-01")));
        assert!(out.warnings.iter().any(|w| w.contains("CC999")));
    }

    #[test]
    fn test_compute_leaves_context_untouched() {
        let ctx = example_context();
        let before = ctx.analytical_table().to_vec();
        let _ = compute(&Selection::new(["2024-01"], ["CC100"]), &ctx);
        let _ = compute(&Selection::default(), &ctx);
        assert_eq!(ctx.analytical_table(), before.as_slice());
    }
}
