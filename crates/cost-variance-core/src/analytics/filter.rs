use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::analytical::AnalyticalRow;
use crate::dataset::CostPosting;

/// The periods and cost centers a user has picked.
///
/// An empty set selects nothing. Callers wanting "everything" pass every
/// known value explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    #[serde(default)]
    pub periods: BTreeSet<String>,
    #[serde(default)]
    pub cost_centers: BTreeSet<String>,
}

impl Selection {
    pub fn new<P, C>(periods: P, cost_centers: C) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Selection {
            periods: periods.into_iter().map(Into::into).collect(),
            cost_centers: cost_centers.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty() || self.cost_centers.is_empty()
    }

    pub fn matches(&self, period: &str, cost_center: &str) -> bool {
        self.periods.contains(period) && self.cost_centers.contains(cost_center)
    }
}

/// Rows that can be sliced by period and cost center.
pub trait SelectionKey {
    fn period(&self) -> &str;
    fn cost_center(&self) -> &str;
}

impl SelectionKey for CostPosting {
    fn period(&self) -> &str {
        &self.period
    }

    fn cost_center(&self) -> &str {
        self.cost_center_key()
    }
}

impl SelectionKey for AnalyticalRow {
    fn period(&self) -> &str {
        &self.period
    }

    fn cost_center(&self) -> &str {
        &self.cost_center
    }
}

/// Rows whose period is in `selection.periods` and whose cost center is in
/// `selection.cost_centers`. Postings without a cost center match
/// `UNASSIGNED`. The source slice is left untouched.
pub fn filter<T: SelectionKey + Clone>(rows: &[T], selection: &Selection) -> Vec<T> {
    if selection.is_empty() {
        return Vec::new();
    }
    rows.iter()
        .filter(|r| selection.matches(r.period(), r.cost_center()))
        .cloned()
        .collect()
}
