use std::fs;

use chrono::NaiveDate;
use cost_variance_core::analytics::filter::{filter, Selection};
use cost_variance_core::analytics::SeverityBand;
use cost_variance_core::dashboard::{compute, compute_with_options, DashboardContext, DashboardOptions};
use cost_variance_core::dataset::{
    CostNature, CostPosting, CostType, Dataset, DatasetPaths, Product, ProductionRecord,
    UNASSIGNED_COST_CENTER,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::TempDir;

fn posting(
    id: &str,
    period: &str,
    cc: &str,
    cost_type: CostType,
    nature: CostNature,
    amount: Decimal,
) -> CostPosting {
    CostPosting {
        posting_id: id.to_string(),
        period: period.to_string(),
        cost_center: Some(cc.to_string()),
        cost_type,
        cost_nature: nature,
        category: None,
        amount,
        supplier: None,
        production_order: None,
    }
}

fn production(y: i32, m: u32, d: u32, cc: &str, product: &str, qty: Decimal) -> ProductionRecord {
    let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
    ProductionRecord {
        date,
        period: format!("{y:04}-{m:02}"),
        product: product.to_string(),
        production_line: None,
        quantity_produced: qty,
        machine_hours: None,
        cost_center: cc.to_string(),
    }
}

fn product(id: &str, std: Decimal) -> Product {
    Product {
        product: id.to_string(),
        category: None,
        standard_unit_cost: std,
    }
}

/// Two months, two production centers, one administrative center.
fn plant() -> DashboardContext {
    use CostNature::*;
    use CostType::*;
    DashboardContext::new(Dataset {
        postings: vec![
            posting("1", "2024-01", "CC100", Direct, Productive, dec!(1100)),
            posting("2", "2024-01", "CC100", Indirect, Productive, dec!(100)),
            posting("3", "2024-01", "CC200", Direct, Productive, dec!(450)),
            posting("4", "2024-01", "CC500", Indirect, Administrative, dec!(800)),
            posting("5", "2024-02", "CC100", Direct, Productive, dec!(900)),
            posting("6", "2024-02", "CC200", Direct, Productive, dec!(-50)),
        ],
        production: vec![
            production(2024, 1, 5, "CC100", "A", dec!(20)),
            production(2024, 1, 25, "CC100", "A", dec!(20)),
            production(2024, 1, 9, "CC200", "B", dec!(30)),
            production(2024, 2, 2, "CC100", "A", dec!(50)),
            production(2024, 2, 3, "CC200", "C", dec!(10)),
            production(2024, 2, 4, "CC300", "A", dec!(5)),
        ],
        products: vec![product("A", dec!(25)), product("B", dec!(16))],
        cost_centers: vec![],
    })
}

// ===========================================================================
// Analytical table
// ===========================================================================

#[test]
fn test_analytical_table_values() {
    let ctx = plant();
    let rows = ctx.analytical_table();
    assert_eq!(rows.len(), 5);

    // Jan CC100 A: 1200 / 40 = 30 vs 25 → +5, +20%
    let jan_a = &rows[0];
    assert_eq!((jan_a.period.as_str(), jan_a.cost_center.as_str()), ("2024-01", "CC100"));
    assert_eq!(jan_a.quantity_produced, dec!(40));
    assert_eq!(jan_a.realized_unit_cost, Some(dec!(30)));
    assert_eq!(jan_a.absolute_deviation, Some(dec!(5)));
    assert_eq!(jan_a.percent_deviation, Some(dec!(20)));

    // Jan CC200 B: 450 / 30 = 15 vs 16 → -1
    assert_eq!(rows[1].absolute_deviation, Some(dec!(-1)));

    // Feb CC200 C: product unknown
    let feb_c = rows.iter().find(|r| r.product == "C").unwrap();
    assert_eq!(feb_c.realized_unit_cost, Some(dec!(-5)));
    assert_eq!(feb_c.standard_unit_cost, None);
    assert_eq!(feb_c.absolute_deviation, None);

    // Feb CC300 A: no productive cost booked
    let feb_cc300 = rows.iter().find(|r| r.cost_center == "CC300").unwrap();
    assert_eq!(feb_cc300.productive_cost_total, None);
    assert_eq!(feb_cc300.realized_unit_cost, None);
}

// ===========================================================================
// Dashboard bundle
// ===========================================================================

#[test]
fn test_full_selection_totals_whole_table() {
    let ctx = plant();
    let out = compute(&ctx.all_selection(), &ctx).result;
    let expected: Decimal = ctx.dataset().postings.iter().map(|p| p.amount).sum();
    assert_eq!(out.total_cost, expected);
    assert_eq!(out.total_cost, dec!(3300));
    // indirect = 900 / 3300 ≈ 27.27%
    let expected_share = dec!(900) / dec!(3300) * dec!(100);
    assert!(
        (out.indirect_percentage - expected_share).abs() < dec!(0.0000001),
        "Expected indirect share ~27.27%, got {}",
        out.indirect_percentage
    );
    assert_eq!(out.posting_count, 6);
}

#[test]
fn test_full_selection_weighted_deviation_and_impact() {
    let ctx = plant();
    let out = compute(&ctx.all_selection(), &ctx).result;
    // defined impacts: Jan A 5*40 = 200, Jan B -1*30 = -30, Feb A (900/50=18) -7*50 = -350
    assert_eq!(out.financial_impact, dec!(-180));
    // standard cost: 25*40 + 16*30 + 25*50 = 2730 (CC300 is not a posting
    // cost center, so its row falls outside the full selection)
    let expected = dec!(-180) / dec!(2730) * dec!(100);
    assert!(
        (out.weighted_average_deviation - expected).abs() < dec!(0.0000001),
        "Expected ~-6.59%, got {}",
        out.weighted_average_deviation
    );
    assert_eq!(out.severity_band, SeverityBand::Favorable);
}

#[test]
fn test_january_cc100_is_critical() {
    let ctx = plant();
    let out = compute(&Selection::new(["2024-01"], ["CC100"]), &ctx).result;
    assert_eq!(out.total_cost, dec!(1200));
    assert_eq!(out.weighted_average_deviation, dec!(20));
    assert_eq!(out.severity_band, SeverityBand::Critical);
    assert_eq!(out.financial_impact, dec!(200));
    assert_eq!(out.product_ranking.len(), 1);
    assert_eq!(out.product_ranking[0].product, "A");
}

#[test]
fn test_chart_series_follow_selection() {
    let ctx = plant();
    let out = compute(&ctx.all_selection(), &ctx).result;

    let months: Vec<(&str, Decimal)> = out
        .time_series
        .iter()
        .map(|p| (p.period.as_str(), p.total))
        .collect();
    assert_eq!(months, vec![("2024-01", dec!(2450)), ("2024-02", dec!(850))]);

    assert_eq!(out.breakdown_by_type[0].cost_type, CostType::Direct);
    assert_eq!(out.breakdown_by_type[0].total, dec!(2400));

    let centers: Vec<&str> = out
        .top_cost_centers
        .iter()
        .map(|c| c.cost_center.as_str())
        .collect();
    assert_eq!(centers, vec!["CC100", "CC500", "CC200"]);
    assert_eq!(out.scatter_points.len(), 4);
}

#[test]
fn test_product_ranking_order() {
    let ctx = plant();
    let out = compute(&ctx.all_selection(), &ctx).result;
    let ranking: Vec<(&str, Decimal)> = out
        .product_ranking
        .iter()
        .map(|p| (p.product.as_str(), p.financial_impact))
        .collect();
    // A = 200 - 350, B = -30, C undefined → 0
    assert_eq!(
        ranking,
        vec![("C", dec!(0)), ("B", dec!(-30)), ("A", dec!(-150))]
    );
}

#[test]
fn test_options_truncate_views() {
    let ctx = plant();
    let options = DashboardOptions {
        top_n_cost_centers: 1,
        top_n_products: 2,
    };
    let out = compute_with_options(&ctx.all_selection(), &ctx, &options).result;
    assert_eq!(out.top_cost_centers.len(), 1);
    assert_eq!(out.product_ranking.len(), 2);
}

#[test]
fn test_empty_selection_defaults() {
    let ctx = plant();
    for sel in [
        Selection::default(),
        Selection::new(ctx.periods().to_vec(), Vec::<String>::new()),
        Selection::new(Vec::<String>::new(), ctx.cost_centers().to_vec()),
    ] {
        let out = compute(&sel, &ctx).result;
        assert_eq!(out.total_cost, Decimal::ZERO);
        assert_eq!(out.indirect_percentage, Decimal::ZERO);
        assert_eq!(out.weighted_average_deviation, Decimal::ZERO);
        assert_eq!(out.financial_impact, Decimal::ZERO);
        assert!(out.product_ranking.is_empty());
        assert!(out.top_cost_centers.is_empty());
    }
}

#[test]
fn test_filter_idempotent_on_analytical_table() {
    let ctx = plant();
    let sel = Selection::new(["2024-02"], ["CC100", "CC200"]);
    let once = filter(ctx.analytical_table(), &sel);
    assert_eq!(once.len(), 2);
    assert_eq!(filter(&once, &sel), once);
}

#[test]
fn test_known_values_come_from_postings() {
    let ctx = plant();
    assert_eq!(ctx.periods(), ["2024-01".to_string(), "2024-02".to_string()]);
    assert_eq!(
        ctx.cost_centers(),
        ["CC100".to_string(), "CC200".to_string(), "CC500".to_string()]
    );
}

#[test]
fn test_context_rebuild_is_deterministic() {
    assert_eq!(plant().analytical_table(), plant().analytical_table());
}

#[test]
fn test_reference_scenario_from_files() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(
        dir.join("cost_postings.csv"),
        "posting_id,period,cost_center,cost_type,cost_nature,amount\n\
         1,2024-01,CC100,Indirect,Administrative,100\n\
         2,2024-01,CC100,Direct,Productive,300\n",
    )
    .unwrap();
    fs::write(
        dir.join("production.csv"),
        "date,product,quantity_produced,cost_center\n2024-01-15,P1,10,CC100\n",
    )
    .unwrap();
    fs::write(dir.join("products.csv"), "product,standard_unit_cost\nP1,30\n").unwrap();

    let ctx = DashboardContext::load(&DatasetPaths::from_dir(dir)).unwrap();
    let out = compute(&ctx.all_selection(), &ctx);
    assert_eq!(out.result.total_cost, dec!(400));
    assert_eq!(out.result.indirect_percentage, dec!(25));
    assert_eq!(ctx.analytical_table()[0].realized_unit_cost, Some(dec!(30)));
    assert_eq!(out.result.weighted_average_deviation, dec!(0));
    assert_eq!(out.result.severity_band, SeverityBand::Acceptable);
    assert_eq!(out.result.financial_impact, dec!(0));
    assert_eq!(out.methodology, "Realized vs Standard Unit Cost Variance (quantity-weighted)");
}

#[test]
fn test_blank_cost_center_counts_in_full_selection() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(
        dir.join("cost_postings.csv"),
        "posting_id,period,cost_center,cost_type,cost_nature,amount\n\
         1,2024-01,CC100,Direct,Productive,300\n\
         2,2024-01,,Indirect,Administrative,100\n",
    )
    .unwrap();
    fs::write(
        dir.join("production.csv"),
        "date,product,quantity_produced,cost_center\n2024-01-15,P1,10,CC100\n",
    )
    .unwrap();
    fs::write(dir.join("products.csv"), "product,standard_unit_cost\nP1,30\n").unwrap();

    let ctx = DashboardContext::load(&DatasetPaths::from_dir(dir)).unwrap();
    assert_eq!(
        ctx.cost_centers(),
        ["CC100".to_string(), UNASSIGNED_COST_CENTER.to_string()]
    );

    let out = compute(&ctx.all_selection(), &ctx).result;
    assert_eq!(out.total_cost, dec!(400));
    assert_eq!(out.indirect_percentage, dec!(25));
    let centers: Vec<(&str, Decimal)> = out
        .top_cost_centers
        .iter()
        .map(|c| (c.cost_center.as_str(), c.total))
        .collect();
    assert_eq!(centers, vec![("CC100", dec!(300)), (UNASSIGNED_COST_CENTER, dec!(100))]);

    let named_only = compute(&Selection::new(["2024-01"], ["CC100"]), &ctx).result;
    assert_eq!(named_only.total_cost, dec!(300));
}
