use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::period::{normalize_period, parse_date, period_of};
use super::records::{
    CostCenter, CostNature, CostPosting, CostType, Dataset, Product, ProductionRecord,
};
use crate::error::LoadError;

pub const POSTINGS_FILE: &str = "cost_postings.csv";
pub const PRODUCTION_FILE: &str = "production.csv";
pub const PRODUCTS_FILE: &str = "products.csv";
pub const COST_CENTERS_FILE: &str = "cost_centers.csv";

/// Where the source tables live and how they are delimited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetPaths {
    pub postings: PathBuf,
    pub production: PathBuf,
    pub products: PathBuf,
    /// Optional master used to resolve the cost nature of postings that lack one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_centers: Option<PathBuf>,
    #[serde(default = "default_delimiter")]
    pub delimiter: u8,
}

fn default_delimiter() -> u8 {
    b','
}

impl DatasetPaths {
    /// Standard file names inside `dir`. The cost-center master is only
    /// picked up when the file exists.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let cost_centers = dir.join(COST_CENTERS_FILE);
        DatasetPaths {
            postings: dir.join(POSTINGS_FILE),
            production: dir.join(PRODUCTION_FILE),
            products: dir.join(PRODUCTS_FILE),
            cost_centers: cost_centers.is_file().then_some(cost_centers),
            delimiter: default_delimiter(),
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

// ---------------------------------------------------------------------------
// Raw rows (header names as exported, legacy Portuguese headers as aliases)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawPosting {
    #[serde(alias = "id_lancamento")]
    posting_id: String,
    #[serde(default, alias = "ano_mes")]
    period: Option<String>,
    #[serde(default, alias = "data")]
    date: Option<String>,
    #[serde(default, alias = "centro_custo")]
    cost_center: Option<String>,
    #[serde(alias = "tipo_custo")]
    cost_type: String,
    #[serde(default, alias = "tipo")]
    cost_nature: Option<String>,
    #[serde(default, alias = "categoria")]
    category: Option<String>,
    #[serde(alias = "valor")]
    amount: String,
    #[serde(default, alias = "fornecedor")]
    supplier: Option<String>,
    #[serde(default, alias = "ordem_producao")]
    production_order: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawProduction {
    #[serde(alias = "data")]
    date: String,
    #[serde(alias = "produto")]
    product: String,
    #[serde(default, alias = "linha_producao")]
    production_line: Option<String>,
    #[serde(alias = "quantidade_produzida")]
    quantity_produced: String,
    #[serde(default, alias = "horas_maquina")]
    machine_hours: Option<String>,
    #[serde(default, alias = "centro_custo")]
    cost_center: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawProduct {
    #[serde(alias = "produto")]
    product: String,
    #[serde(default, alias = "categoria_produto")]
    category: Option<String>,
    #[serde(alias = "custo_padrao_unitario")]
    standard_unit_cost: String,
}

#[derive(Debug, Deserialize)]
struct RawCostCenter {
    #[serde(alias = "centro_custo")]
    cost_center: String,
    #[serde(default, alias = "descricao")]
    description: Option<String>,
    #[serde(default, alias = "gestor")]
    manager: Option<String>,
    #[serde(alias = "tipo")]
    nature: String,
}

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Load every source table. Fails on the first unreadable file, missing
/// column or unparseable value.
pub fn load_dataset(paths: &DatasetPaths) -> Result<Dataset, LoadError> {
    let cost_centers = match &paths.cost_centers {
        Some(path) => load_cost_centers(path, paths.delimiter)?,
        None => Vec::new(),
    };
    let postings = load_postings(&paths.postings, paths.delimiter, &cost_centers)?;
    let production = load_production(&paths.production, paths.delimiter)?;
    let products = load_products(&paths.products, paths.delimiter)?;

    info!(
        postings = postings.len(),
        production = production.len(),
        products = products.len(),
        cost_centers = cost_centers.len(),
        "dataset loaded"
    );

    Ok(Dataset {
        postings,
        production,
        products,
        cost_centers,
    })
}

/// Load cost postings. Postings without a `cost_nature` value take the
/// nature of their cost center from `cost_centers`, or `Unassigned`.
pub fn load_postings(
    path: &Path,
    delimiter: u8,
    cost_centers: &[CostCenter],
) -> Result<Vec<CostPosting>, LoadError> {
    let natures: HashMap<&str, &CostNature> = cost_centers
        .iter()
        .map(|cc| (cc.cost_center.as_str(), &cc.nature))
        .collect();
    let mut unassigned = 0usize;
    let mut negative = 0usize;

    let postings = read_table(
        path,
        delimiter,
        &[
            &["posting_id", "id_lancamento"],
            &["period", "ano_mes", "date", "data"],
            &["cost_center", "centro_custo"],
            &["cost_type", "tipo_custo"],
            &["amount", "valor"],
        ],
        |raw: RawPosting| {
            let period_source = raw
                .period
                .as_deref()
                .or(raw.date.as_deref())
                .ok_or_else(|| "missing period and date".to_string())?;
            let period = normalize_period(period_source)
                .ok_or_else(|| format!("unrecognized period '{period_source}'"))?;
            let cost_type = CostType::from_str(&raw.cost_type)?;

            let cost_nature = match raw.cost_nature.as_deref() {
                Some(label) => CostNature::from_str(label)?,
                None => match raw
                    .cost_center
                    .as_deref()
                    .and_then(|cc| natures.get(cc))
                {
                    Some(nature) => (*nature).clone(),
                    None => {
                        unassigned += 1;
                        CostNature::unassigned()
                    }
                },
            };

            let amount = parse_decimal(&raw.amount, "amount")?;
            if amount < Decimal::ZERO {
                negative += 1;
            }

            Ok(CostPosting {
                posting_id: raw.posting_id,
                period,
                cost_center: raw.cost_center,
                cost_type,
                cost_nature,
                category: raw.category,
                amount,
                supplier: raw.supplier,
                production_order: raw.production_order,
            })
        },
    )?;

    if unassigned > 0 {
        warn!(
            path = %path.display(),
            unassigned,
            "postings without a resolvable cost nature were marked Unassigned"
        );
    }
    if negative > 0 {
        debug!(path = %path.display(), negative, "negative posting amounts kept as-is");
    }
    Ok(postings)
}

pub fn load_production(path: &Path, delimiter: u8) -> Result<Vec<ProductionRecord>, LoadError> {
    let mut negative = 0usize;
    let records = read_table(
        path,
        delimiter,
        &[
            &["date", "data"],
            &["product", "produto"],
            &["quantity_produced", "quantidade_produzida"],
            &["cost_center", "centro_custo"],
        ],
        |raw: RawProduction| {
            let date = parse_date(&raw.date)
                .ok_or_else(|| format!("unrecognized date '{}'", raw.date))?;
            let quantity_produced = parse_decimal(&raw.quantity_produced, "quantity_produced")?;
            if quantity_produced < Decimal::ZERO {
                negative += 1;
            }
            let machine_hours = raw
                .machine_hours
                .as_deref()
                .map(|h| parse_decimal(h, "machine_hours"))
                .transpose()?;
            let cost_center = raw
                .cost_center
                .ok_or_else(|| "blank cost_center".to_string())?;

            Ok(ProductionRecord {
                date,
                period: period_of(date),
                product: raw.product,
                production_line: raw.production_line,
                quantity_produced,
                machine_hours,
                cost_center,
            })
        },
    )?;

    if negative > 0 {
        warn!(path = %path.display(), negative, "negative produced quantities kept as-is");
    }
    Ok(records)
}

pub fn load_products(path: &Path, delimiter: u8) -> Result<Vec<Product>, LoadError> {
    let products = read_table(
        path,
        delimiter,
        &[
            &["product", "produto"],
            &["standard_unit_cost", "custo_padrao_unitario"],
        ],
        |raw: RawProduct| {
            Ok(Product {
                standard_unit_cost: parse_decimal(&raw.standard_unit_cost, "standard_unit_cost")?,
                product: raw.product,
                category: raw.category,
            })
        },
    )?;
    ensure_unique(path, "product", products.iter().map(|p| p.product.as_str()))?;
    Ok(products)
}

pub fn load_cost_centers(path: &Path, delimiter: u8) -> Result<Vec<CostCenter>, LoadError> {
    let centers = read_table(
        path,
        delimiter,
        &[&["cost_center", "centro_custo"], &["nature", "tipo"]],
        |raw: RawCostCenter| {
            Ok(CostCenter {
                nature: CostNature::from_str(&raw.nature)?,
                cost_center: raw.cost_center,
                description: raw.description,
                manager: raw.manager,
            })
        },
    )?;
    ensure_unique(
        path,
        "cost center",
        centers.iter().map(|c| c.cost_center.as_str()),
    )?;
    Ok(centers)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Read a delimited file, check that each group of alternative column names
/// has at least one match, and convert every row.
fn read_table<R, T, F>(
    path: &Path,
    delimiter: u8,
    required: &[&[&str]],
    mut convert: F,
) -> Result<Vec<T>, LoadError>
where
    R: DeserializeOwned,
    F: FnMut(R) -> Result<T, String>,
{
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(Trim::All)
        .from_reader(file);

    let csv_err = |source: csv::Error| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let headers: StringRecord = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_lowercase())
        .collect();

    for alternatives in required {
        if !alternatives.iter().any(|name| headers.iter().any(|h| h == *name)) {
            return Err(LoadError::MissingColumn {
                path: path.to_path_buf(),
                expected: alternatives.iter().map(|s| s.to_string()).collect(),
            });
        }
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let raw: R = record.deserialize(Some(&headers)).map_err(csv_err)?;
        let row = convert(raw).map_err(|reason| LoadError::InvalidRecord {
            path: path.to_path_buf(),
            line,
            reason,
        })?;
        rows.push(row);
    }

    debug!(path = %path.display(), rows = rows.len(), "table read");
    Ok(rows)
}

fn parse_decimal(raw: &str, field: &str) -> Result<Decimal, String> {
    let s = raw.trim();
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .map_err(|_| format!("{field}: '{s}' is not a number"))
}

fn ensure_unique<'a>(
    path: &Path,
    entity: &str,
    keys: impl Iterator<Item = &'a str>,
) -> Result<(), LoadError> {
    let mut seen = HashSet::new();
    for key in keys {
        if !seen.insert(key) {
            return Err(LoadError::DuplicateKey {
                path: path.to_path_buf(),
                entity: entity.to_string(),
                key: key.to_string(),
            });
        }
    }
    Ok(())
}
