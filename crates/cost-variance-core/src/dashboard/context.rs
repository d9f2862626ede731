use std::collections::BTreeSet;

use tracing::{info, warn};

use crate::analytics::aggregate::{
    aggregate_production, aggregate_productive_cost, AggregatedProduction,
    AggregatedProductiveCost,
};
use crate::analytics::analytical::{build_analytical_table, count_undefined, AnalyticalRow};
use crate::analytics::filter::Selection;
use crate::dataset::{load_dataset, CostPosting, Dataset, DatasetPaths};
use crate::types::Period;
use crate::CostVarianceResult;

/// Everything a dashboard pass reads: the source tables plus the analytical
/// table derived from them. Built once; immutable afterwards, so it can be
/// shared across threads without locking.
#[derive(Debug, Clone)]
pub struct DashboardContext {
    dataset: Dataset,
    production_aggregates: Vec<AggregatedProduction>,
    productive_cost_aggregates: Vec<AggregatedProductiveCost>,
    analytical: Vec<AnalyticalRow>,
    periods: Vec<Period>,
    cost_centers: Vec<String>,
}

impl DashboardContext {
    pub fn new(dataset: Dataset) -> Self {
        let production_aggregates = aggregate_production(&dataset.production);
        let productive_cost_aggregates = aggregate_productive_cost(&dataset.postings);
        let analytical = build_analytical_table(
            &production_aggregates,
            &productive_cost_aggregates,
            &dataset.products,
        );

        let (no_realized, no_standard) = count_undefined(&analytical);
        if no_realized > 0 || no_standard > 0 {
            warn!(
                no_realized,
                no_standard, "analytical rows with undefined unit cost"
            );
        }

        let periods: BTreeSet<&str> = dataset.postings.iter().map(|p| p.period.as_str()).collect();
        let cost_centers: BTreeSet<&str> = dataset
            .postings
            .iter()
            .map(CostPosting::cost_center_key)
            .collect();
        let periods: Vec<Period> = periods.into_iter().map(str::to_string).collect();
        let cost_centers: Vec<String> = cost_centers.into_iter().map(str::to_string).collect();

        info!(
            analytical_rows = analytical.len(),
            periods = periods.len(),
            cost_centers = cost_centers.len(),
            "dashboard context built"
        );

        DashboardContext {
            dataset,
            production_aggregates,
            productive_cost_aggregates,
            analytical,
            periods,
            cost_centers,
        }
    }

    /// Load the source tables and build the context. Load failures abort.
    pub fn load(paths: &DatasetPaths) -> CostVarianceResult<Self> {
        Ok(Self::new(load_dataset(paths)?))
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn production_aggregates(&self) -> &[AggregatedProduction] {
        &self.production_aggregates
    }

    pub fn productive_cost_aggregates(&self) -> &[AggregatedProductiveCost] {
        &self.productive_cost_aggregates
    }

    pub fn analytical_table(&self) -> &[AnalyticalRow] {
        &self.analytical
    }

    /// Distinct posting periods, ascending.
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// Distinct posting cost centers, ascending. Includes `UNASSIGNED` when
    /// any posting has a blank cost center.
    pub fn cost_centers(&self) -> &[String] {
        &self.cost_centers
    }

    /// A selection naming every known period and cost center.
    pub fn all_selection(&self) -> Selection {
        Selection::new(self.periods.iter().cloned(), self.cost_centers.iter().cloned())
    }
}
