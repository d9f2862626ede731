use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::dataset::{CostPosting, ProductionRecord};
use crate::types::{Money, Period, Quantity};

/// Produced quantity per (period, cost center, product).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedProduction {
    pub period: Period,
    pub cost_center: String,
    pub product: String,
    pub quantity_produced: Quantity,
}

/// Productive cost per (period, cost center).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedProductiveCost {
    pub period: Period,
    pub cost_center: String,
    pub productive_cost_total: Money,
}

/// Sum produced quantity by (period, cost center, product).
///
/// Only keys present in the input appear in the output; nothing is
/// zero-filled. Rows come out sorted by key.
pub fn aggregate_production(records: &[ProductionRecord]) -> Vec<AggregatedProduction> {
    let mut groups: BTreeMap<(&str, &str, &str), Quantity> = BTreeMap::new();
    for r in records {
        *groups
            .entry((r.period.as_str(), r.cost_center.as_str(), r.product.as_str()))
            .or_insert(Decimal::ZERO) += r.quantity_produced;
    }

    groups
        .into_iter()
        .map(|((period, cost_center, product), quantity_produced)| AggregatedProduction {
            period: period.to_string(),
            cost_center: cost_center.to_string(),
            product: product.to_string(),
            quantity_produced,
        })
        .collect()
}

/// Sum the amount of `Productive` postings by (period, cost center).
///
/// Negative amounts are summed like any other. Postings with no cost center
/// cannot be attributed and are skipped.
pub fn aggregate_productive_cost(postings: &[CostPosting]) -> Vec<AggregatedProductiveCost> {
    let mut groups: BTreeMap<(&str, &str), Money> = BTreeMap::new();
    for p in postings.iter().filter(|p| p.cost_nature.is_productive()) {
        if let Some(cc) = p.cost_center.as_deref() {
            *groups
                .entry((p.period.as_str(), cc))
                .or_insert(Decimal::ZERO) += p.amount;
        }
    }

    groups
        .into_iter()
        .map(|((period, cost_center), productive_cost_total)| AggregatedProductiveCost {
            period: period.to_string(),
            cost_center: cost_center.to_string(),
            productive_cost_total,
        })
        .collect()
}
