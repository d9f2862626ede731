use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::analytical::AnalyticalRow;
use crate::types::Money;

/// Financial impact of one product's cost deviation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductImpact {
    pub product: String,
    /// Σ(absolute_deviation × quantity_produced); 0 when every term is undefined
    pub financial_impact: Money,
}

/// Per-product financial impact, highest first.
///
/// Sorted by the signed sum, so favorable products sink to the bottom.
/// Products with equal impact keep the order in which they first appear in
/// `rows`. The full ranking is returned; callers truncate for top-N views.
pub fn product_ranking(rows: &[AnalyticalRow]) -> Vec<ProductImpact> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut ranking: Vec<ProductImpact> = Vec::new();

    for row in rows {
        let slot = *index.entry(row.product.as_str()).or_insert_with(|| {
            ranking.push(ProductImpact {
                product: row.product.clone(),
                financial_impact: Decimal::ZERO,
            });
            ranking.len() - 1
        });
        if let Some(impact) = row.deviation_impact() {
            ranking[slot].financial_impact += impact;
        }
    }

    // stable: ties stay in first-appearance order
    ranking.sort_by(|a, b| b.financial_impact.cmp(&a.financial_impact));
    ranking
}

pub fn top_products(rows: &[AnalyticalRow], n: usize) -> Vec<ProductImpact> {
    let mut ranking = product_ranking(rows);
    ranking.truncate(n);
    ranking
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn row(product: &str, qty: Decimal, deviation: Option<Decimal>) -> AnalyticalRow {
        AnalyticalRow {
            period: "2024-01".to_string(),
            cost_center: "CC100".to_string(),
            product: product.to_string(),
            quantity_produced: qty,
            productive_cost_total: None,
            realized_unit_cost: None,
            standard_unit_cost: Some(dec!(10)),
            absolute_deviation: deviation,
            percent_deviation: None,
        }
    }

    #[test]
    fn test_ranking_sums_per_product_descending() {
        let rows = vec![
            row("A", dec!(10), Some(dec!(1))),
            row("B", dec!(10), Some(dec!(5))),
            row("A", dec!(20), Some(dec!(2))),
            row("C", dec!(10), Some(dec!(-3))),
        ];
        let ranking = product_ranking(&rows);
        let got: Vec<(&str, Decimal)> = ranking
            .iter()
            .map(|p| (p.product.as_str(), p.financial_impact))
            .collect();
        assert_eq!(got, vec![("A", dec!(50)), ("B", dec!(50)), ("C", dec!(-30))]);
    }

    #[test]
    fn test_ranking_ties_keep_first_appearance() {
        let rows = vec![
            row("Z", dec!(1), Some(dec!(1))),
            row("M", dec!(1), Some(dec!(1))),
            row("A", dec!(1), Some(dec!(1))),
        ];
        let names: Vec<String> = product_ranking(&rows).into_iter().map(|p| p.product).collect();
        assert_eq!(names, vec!["Z", "M", "A"]);
    }

    #[test]
    fn test_ranking_undefined_product_scores_zero() {
        let rows = vec![
            row("A", dec!(10), None),
            row("B", dec!(10), Some(dec!(-1))),
        ];
        let ranking = product_ranking(&rows);
        assert_eq!(ranking[0].product, "A");
        assert_eq!(ranking[0].financial_impact, dec!(0));
        assert_eq!(ranking[1].financial_impact, dec!(-10));
    }

    #[test]
    fn test_ranking_empty_and_truncated() {
        assert!(product_ranking(&[]).is_empty());
        let rows: Vec<AnalyticalRow> = (0..15)
            .map(|i| row(&format!("P{i}"), dec!(1), Some(Decimal::from(i))))
            .collect();
        let top = top_products(&rows, 10);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].product, "P14");
    }
}
