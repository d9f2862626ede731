use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::analytical::AnalyticalRow;
use crate::dataset::{CostPosting, CostType};
use crate::types::{Money, Percent, Period};

/// Upper bound (inclusive) of the `Acceptable` band, in percent.
pub const ACCEPTABLE_DEVIATION_CEILING: Decimal = dec!(5);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Traffic-light classification of the weighted average deviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeverityBand {
    /// Below standard cost
    Favorable,
    /// 0% to 5% above standard, both ends inclusive
    Acceptable,
    /// More than 5% above standard
    Critical,
}

impl fmt::Display for SeverityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SeverityBand::Favorable => "Favorable",
            SeverityBand::Acceptable => "Acceptable",
            SeverityBand::Critical => "Critical",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodTotal {
    pub period: Period,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostTypeTotal {
    pub cost_type: CostType,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostCenterTotal {
    pub cost_center: String,
    pub total: Money,
}

/// Realized vs standard unit cost of one analytical row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub period: Period,
    pub cost_center: String,
    pub product: String,
    pub standard_unit_cost: Option<Money>,
    pub realized_unit_cost: Option<Money>,
    pub percent_deviation: Option<Percent>,
}

// ---------------------------------------------------------------------------
// Headline metrics
// ---------------------------------------------------------------------------

/// Sum of all posting amounts, negatives included.
pub fn total_cost(postings: &[CostPosting]) -> Money {
    postings.iter().map(|p| p.amount).sum()
}

/// Share of indirect cost in percent. Zero whenever total cost is not
/// positive, so a net-negative slice never reports a share.
pub fn indirect_percentage(postings: &[CostPosting]) -> Percent {
    let total = total_cost(postings);
    if total <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let indirect: Money = postings
        .iter()
        .filter(|p| p.cost_type == CostType::Indirect)
        .map(|p| p.amount)
        .sum();
    indirect / total * dec!(100)
}

/// Sum of deviation * quantity over the rows where the deviation is defined.
pub fn financial_impact(rows: &[AnalyticalRow]) -> Money {
    rows.iter().filter_map(AnalyticalRow::deviation_impact).sum()
}

/// Quantity-weighted deviation against standard cost, in percent:
/// Σ(deviation × qty) / Σ(standard × qty) × 100.
///
/// Undefined terms are left out of each sum. Zero when the slice is empty or
/// the standard-cost denominator is not positive.
pub fn weighted_average_deviation(rows: &[AnalyticalRow]) -> Percent {
    if rows.is_empty() {
        return Decimal::ZERO;
    }
    let numerator = financial_impact(rows);
    let denominator: Money = rows.iter().filter_map(AnalyticalRow::standard_cost).sum();
    if denominator <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    numerator / denominator * dec!(100)
}

pub fn severity_band(weighted_average_deviation: Percent) -> SeverityBand {
    if weighted_average_deviation < Decimal::ZERO {
        SeverityBand::Favorable
    } else if weighted_average_deviation <= ACCEPTABLE_DEVIATION_CEILING {
        SeverityBand::Acceptable
    } else {
        SeverityBand::Critical
    }
}

// ---------------------------------------------------------------------------
// Chart series
// ---------------------------------------------------------------------------

/// Cost per period, oldest first.
pub fn time_series(postings: &[CostPosting]) -> Vec<PeriodTotal> {
    let mut totals: BTreeMap<&str, Money> = BTreeMap::new();
    for p in postings {
        *totals.entry(p.period.as_str()).or_insert(Decimal::ZERO) += p.amount;
    }
    totals
        .into_iter()
        .map(|(period, total)| PeriodTotal {
            period: period.to_string(),
            total,
        })
        .collect()
}

/// Cost per cost type (Direct, then Indirect). Types absent from the slice
/// are absent from the result.
pub fn breakdown_by_type(postings: &[CostPosting]) -> Vec<CostTypeTotal> {
    let mut totals: BTreeMap<CostType, Money> = BTreeMap::new();
    for p in postings {
        *totals.entry(p.cost_type).or_insert(Decimal::ZERO) += p.amount;
    }
    totals
        .into_iter()
        .map(|(cost_type, total)| CostTypeTotal { cost_type, total })
        .collect()
}

/// Cost per cost center, largest first; equal totals ordered by id.
/// Postings without a cost center are attributed to `UNASSIGNED`.
pub fn cost_center_totals(postings: &[CostPosting]) -> Vec<CostCenterTotal> {
    let mut totals: BTreeMap<&str, Money> = BTreeMap::new();
    for p in postings {
        *totals.entry(p.cost_center_key()).or_insert(Decimal::ZERO) += p.amount;
    }
    let mut out: Vec<CostCenterTotal> = totals
        .into_iter()
        .map(|(cost_center, total)| CostCenterTotal {
            cost_center: cost_center.to_string(),
            total,
        })
        .collect();
    out.sort_by(|a, b| b.total.cmp(&a.total));
    out
}

pub fn top_cost_centers(postings: &[CostPosting], n: usize) -> Vec<CostCenterTotal> {
    let mut totals = cost_center_totals(postings);
    totals.truncate(n);
    totals
}

pub fn scatter_points(rows: &[AnalyticalRow]) -> Vec<ScatterPoint> {
    rows.iter()
        .map(|r| ScatterPoint {
            period: r.period.clone(),
            cost_center: r.cost_center.clone(),
            product: r.product.clone(),
            standard_unit_cost: r.standard_unit_cost,
            realized_unit_cost: r.realized_unit_cost,
            percent_deviation: r.percent_deviation,
        })
        .collect()
}
