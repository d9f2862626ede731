use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dataset::period::period_of;
use crate::dataset::{
    CostCenter, CostNature, CostPosting, CostType, Dataset, Product, ProductionRecord,
};
use crate::error::CostVarianceError;
use crate::CostVarianceResult;

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

const COST_CENTERS: &[(&str, &str, &str, bool)] = &[
    ("CC100", "Production Line A", "Carlos Silva", true),
    ("CC200", "Production Line B", "Ana Souza", true),
    ("CC300", "Maintenance", "Marcos Lima", true),
    ("CC400", "Logistics", "Fernanda Rocha", true),
    ("CC500", "Administration", "Juliana Alves", false),
];

/// (product, category, standard unit cost in cents)
const PRODUCTS: &[(&str, &str, i64)] = &[
    ("PROD_A", "Finished Good", 2500),
    ("PROD_B", "Finished Good", 3250),
    ("PROD_C", "Finished Good", 1870),
    ("PROD_D", "Semi-finished", 1230),
    ("PROD_E", "Semi-finished", 980),
];

/// Only these centers book production.
const PRODUCTION_CENTERS: &[&str] = &["CC100", "CC200"];
const PRODUCTION_LINES: &[&str] = &["Line 1", "Line 2"];

const CATEGORIES: &[&str] = &[
    "Raw Material",
    "Energy",
    "Labor",
    "Maintenance",
    "Freight",
    "Third-party Services",
];

const SUPPLIERS: &[&str] = &[
    "Supplier A",
    "Supplier B",
    "Supplier C",
    "SUPP-XYZ",
    "Services Ltd",
    "Energy Co",
];

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Shape of the synthetic dataset. Same seed, same dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub seed: u64,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub production_rows: usize,
    pub posting_rows: usize,
    /// Share of postings whose amount is negated (ledger noise)
    pub negative_amount_rate: f64,
    /// Share of postings whose cost center is blanked
    pub missing_cost_center_rate: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            seed: 42,
            start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or(NaiveDate::MIN),
            end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or(NaiveDate::MIN),
            production_rows: 300,
            posting_rows: 800,
            negative_amount_rate: 0.03,
            missing_cost_center_rate: 0.05,
        }
    }
}

impl GeneratorConfig {
    fn validate(&self) -> CostVarianceResult<()> {
        if self.start > self.end {
            return Err(CostVarianceError::InvalidInput {
                field: "start".to_string(),
                reason: format!("start {} is after end {}", self.start, self.end),
            });
        }
        for (field, rate) in [
            ("negative_amount_rate", self.negative_amount_rate),
            ("missing_cost_center_rate", self.missing_cost_center_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(CostVarianceError::InvalidInput {
                    field: field.to_string(),
                    reason: format!("rate must lie in [0, 1], got {rate}"),
                });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Fabricate cost-center and product masters, production bookings and cost
/// postings, including the usual dirt: lowercase categories, a few negated
/// amounts and some postings with a blank cost center.
pub fn generate_dataset(config: &GeneratorConfig) -> CostVarianceResult<Dataset> {
    config.validate()?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let span_days = (config.end - config.start).num_days();

    let cost_centers: Vec<CostCenter> = COST_CENTERS
        .iter()
        .map(|&(id, description, manager, productive)| CostCenter {
            cost_center: id.to_string(),
            description: Some(description.to_string()),
            manager: Some(manager.to_string()),
            nature: if productive {
                CostNature::Productive
            } else {
                CostNature::Administrative
            },
        })
        .collect();

    let products: Vec<Product> = PRODUCTS
        .iter()
        .map(|&(id, category, cents)| Product {
            product: id.to_string(),
            category: Some(category.to_string()),
            standard_unit_cost: Decimal::new(cents, 2),
        })
        .collect();

    let production: Vec<ProductionRecord> = (0..config.production_rows)
        .map(|_| {
            let product = pick(&mut rng, PRODUCTS).0;
            let cost_center = *pick(&mut rng, PRODUCTION_CENTERS);
            let date = config.start + Duration::days(rng.gen_range(0..=span_days));
            ProductionRecord {
                date,
                period: period_of(date),
                product: product.to_string(),
                production_line: Some(pick(&mut rng, PRODUCTION_LINES).to_string()),
                quantity_produced: Decimal::from(rng.gen_range(50i64..=500)),
                machine_hours: Some(Decimal::new(rng.gen_range(500..=4000), 2)),
                cost_center: cost_center.to_string(),
            }
        })
        .collect();

    let mut postings: Vec<CostPosting> = (1..=config.posting_rows)
        .map(|id| {
            let cost_type = if rng.gen_bool(0.5) {
                CostType::Direct
            } else {
                CostType::Indirect
            };
            let category = pick(&mut rng, CATEGORIES).to_lowercase();
            let mut amount = Decimal::new(rng.gen_range(10_000..=2_000_000), 2);
            if rng.gen_bool(config.negative_amount_rate) {
                amount = -amount;
            }
            let date = config.start + Duration::days(rng.gen_range(0..=span_days));
            let center = &cost_centers[rng.gen_range(0..cost_centers.len())];
            let supplier = pick(&mut rng, SUPPLIERS).to_string();
            let production_order = rng
                .gen_bool(0.5)
                .then(|| format!("OP{}", rng.gen_range(1000..=9999)));

            CostPosting {
                posting_id: id.to_string(),
                period: period_of(date),
                cost_center: Some(center.cost_center.clone()),
                cost_type,
                cost_nature: center.nature.clone(),
                category: Some(category),
                amount,
                supplier: Some(supplier),
                production_order,
            }
        })
        .collect();

    let blanked = (postings.len() as f64 * config.missing_cost_center_rate).round() as usize;
    for i in index::sample(&mut rng, postings.len(), blanked.min(postings.len())) {
        postings[i].cost_center = None;
    }

    info!(
        seed = config.seed,
        production = production.len(),
        postings = postings.len(),
        blanked,
        "synthetic dataset generated"
    );

    Ok(Dataset {
        postings,
        production,
        products,
        cost_centers,
    })
}

fn pick<'a, T>(rng: &mut StdRng, items: &'a [T]) -> &'a T {
    &items[rng.gen_range(0..items.len())]
}
