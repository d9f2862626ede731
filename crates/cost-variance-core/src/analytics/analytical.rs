use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::aggregate::{AggregatedProduction, AggregatedProductiveCost};
use crate::dataset::Product;
use crate::types::{Money, Percent, Period, Quantity};

/// One (period, cost center, product) with realized vs standard unit cost.
///
/// `None` marks a value that cannot be derived: no productive cost for the
/// period/center, an unknown product, or a zero divisor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticalRow {
    pub period: Period,
    pub cost_center: String,
    pub product: String,
    pub quantity_produced: Quantity,
    /// Productive cost of the whole period/center, not of this product alone
    pub productive_cost_total: Option<Money>,
    /// productive_cost_total / quantity_produced
    pub realized_unit_cost: Option<Money>,
    pub standard_unit_cost: Option<Money>,
    /// realized - standard
    pub absolute_deviation: Option<Money>,
    /// absolute_deviation / standard * 100
    pub percent_deviation: Option<Percent>,
}

impl AnalyticalRow {
    /// absolute_deviation * quantity_produced, the money effect of the deviation.
    pub fn deviation_impact(&self) -> Option<Money> {
        self.absolute_deviation.map(|d| d * self.quantity_produced)
    }

    /// standard_unit_cost * quantity_produced, the expected spend.
    pub fn standard_cost(&self) -> Option<Money> {
        self.standard_unit_cost.map(|s| s * self.quantity_produced)
    }
}

/// Left-join aggregated production with productive cost on (period, cost
/// center), then with the product master on product, and derive the
/// deviation columns. Produces exactly one row per production aggregate, in
/// the same order.
pub fn build_analytical_table(
    agg_production: &[AggregatedProduction],
    agg_cost: &[AggregatedProductiveCost],
    products: &[Product],
) -> Vec<AnalyticalRow> {
    let costs: HashMap<(&str, &str), Money> = agg_cost
        .iter()
        .map(|c| ((c.period.as_str(), c.cost_center.as_str()), c.productive_cost_total))
        .collect();
    let standards: HashMap<&str, Money> = products
        .iter()
        .map(|p| (p.product.as_str(), p.standard_unit_cost))
        .collect();

    agg_production
        .iter()
        .map(|a| {
            let productive_cost_total = costs
                .get(&(a.period.as_str(), a.cost_center.as_str()))
                .copied();
            let realized_unit_cost =
                productive_cost_total.and_then(|cost| cost.checked_div(a.quantity_produced));
            let standard_unit_cost = standards.get(a.product.as_str()).copied();

            let absolute_deviation = match (realized_unit_cost, standard_unit_cost) {
                (Some(real), Some(std)) => real.checked_sub(std),
                _ => None,
            };
            let percent_deviation = match (absolute_deviation, standard_unit_cost) {
                (Some(dev), Some(std)) => dev
                    .checked_div(std)
                    .and_then(|ratio| ratio.checked_mul(dec!(100))),
                _ => None,
            };

            AnalyticalRow {
                period: a.period.clone(),
                cost_center: a.cost_center.clone(),
                product: a.product.clone(),
                quantity_produced: a.quantity_produced,
                productive_cost_total,
                realized_unit_cost,
                standard_unit_cost,
                absolute_deviation,
                percent_deviation,
            }
        })
        .collect()
}

/// Rows whose realized or standard unit cost could not be derived.
pub fn count_undefined(rows: &[AnalyticalRow]) -> (usize, usize) {
    let no_realized = rows.iter().filter(|r| r.realized_unit_cost.is_none()).count();
    let no_standard = rows.iter().filter(|r| r.standard_unit_cost.is_none()).count();
    (no_realized, no_standard)
}
