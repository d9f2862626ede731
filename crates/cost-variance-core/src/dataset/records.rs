use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Period, Quantity};

// ---------------------------------------------------------------------------
// Classifications
// ---------------------------------------------------------------------------

/// Direct costs are traceable to a production order; indirect costs are not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CostType {
    Direct,
    Indirect,
}

impl CostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CostType::Direct => "Direct",
            CostType::Indirect => "Indirect",
        }
    }
}

impl fmt::Display for CostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CostType {
    type Err = String;

    /// Case-insensitive; accepts the Portuguese labels used by legacy exports.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "direct" | "direto" => Ok(CostType::Direct),
            "indirect" | "indireto" => Ok(CostType::Indirect),
            other => Err(format!("unknown cost type '{other}'")),
        }
    }
}

/// Nature of the cost center a posting belongs to. Only `Productive` postings
/// feed the realized unit cost.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CostNature {
    Productive,
    Administrative,
    Other(String),
}

impl CostNature {
    pub fn unassigned() -> Self {
        CostNature::Other("Unassigned".to_string())
    }

    pub fn is_productive(&self) -> bool {
        matches!(self, CostNature::Productive)
    }

    pub fn label(&self) -> &str {
        match self {
            CostNature::Productive => "Productive",
            CostNature::Administrative => "Administrative",
            CostNature::Other(s) => s,
        }
    }
}

impl fmt::Display for CostNature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CostNature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("empty cost nature".to_string());
        }
        Ok(match trimmed.to_lowercase().as_str() {
            "productive" | "produtivo" => CostNature::Productive,
            "administrative" | "administrativo" => CostNature::Administrative,
            _ => CostNature::Other(trimmed.to_string()),
        })
    }
}

// ---------------------------------------------------------------------------
// Source tables
// ---------------------------------------------------------------------------

/// Selection key of postings whose source row carried a blank cost center.
pub const UNASSIGNED_COST_CENTER: &str = "UNASSIGNED";

/// A single cost posting from the general ledger extract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostPosting {
    pub posting_id: String,
    pub period: Period,
    /// `None` when the source row carried a blank cost center
    pub cost_center: Option<String>,
    pub cost_type: CostType,
    pub cost_nature: CostNature,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Signed; negative values are kept as-is
    pub amount: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_order: Option<String>,
}

impl CostPosting {
    /// Cost center used for selection and attribution; blank ones fall
    /// under [`UNASSIGNED_COST_CENTER`].
    pub fn cost_center_key(&self) -> &str {
        self.cost_center.as_deref().unwrap_or(UNASSIGNED_COST_CENTER)
    }
}

/// One production booking: units of a product made on a line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionRecord {
    pub date: NaiveDate,
    pub period: Period,
    pub product: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_line: Option<String>,
    pub quantity_produced: Quantity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub machine_hours: Option<Decimal>,
    pub cost_center: String,
}

/// Product master entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub standard_unit_cost: Money,
}

/// Cost center master entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostCenter {
    pub cost_center: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager: Option<String>,
    pub nature: CostNature,
}

/// The loaded source tables. Read-only once constructed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub postings: Vec<CostPosting>,
    pub production: Vec<ProductionRecord>,
    pub products: Vec<Product>,
    #[serde(default)]
    pub cost_centers: Vec<CostCenter>,
}
