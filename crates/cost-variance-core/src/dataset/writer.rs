use std::fs;
use std::path::Path;

use csv::Writer;
use tracing::info;

use super::loader::{COST_CENTERS_FILE, POSTINGS_FILE, PRODUCTION_FILE, PRODUCTS_FILE};
use super::records::Dataset;
use crate::error::LoadError;

/// Write the four tables into `dir` under the standard file names, creating
/// the directory when needed. The output loads back with
/// [`super::loader::load_dataset`] via `DatasetPaths::from_dir`.
pub fn write_dataset(dir: &Path, dataset: &Dataset) -> Result<(), LoadError> {
    fs::create_dir_all(dir).map_err(|source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    write_table(
        &dir.join(POSTINGS_FILE),
        &[
            "posting_id",
            "period",
            "cost_center",
            "cost_type",
            "cost_nature",
            "category",
            "amount",
            "supplier",
            "production_order",
        ],
        dataset.postings.iter().map(|p| {
            vec![
                p.posting_id.clone(),
                p.period.clone(),
                p.cost_center.clone().unwrap_or_default(),
                p.cost_type.to_string(),
                p.cost_nature.to_string(),
                p.category.clone().unwrap_or_default(),
                p.amount.to_string(),
                p.supplier.clone().unwrap_or_default(),
                p.production_order.clone().unwrap_or_default(),
            ]
        }),
    )?;

    write_table(
        &dir.join(PRODUCTION_FILE),
        &[
            "date",
            "product",
            "production_line",
            "quantity_produced",
            "machine_hours",
            "cost_center",
        ],
        dataset.production.iter().map(|r| {
            vec![
                r.date.format("%Y-%m-%d").to_string(),
                r.product.clone(),
                r.production_line.clone().unwrap_or_default(),
                r.quantity_produced.to_string(),
                r.machine_hours.map(|h| h.to_string()).unwrap_or_default(),
                r.cost_center.clone(),
            ]
        }),
    )?;

    write_table(
        &dir.join(PRODUCTS_FILE),
        &["product", "category", "standard_unit_cost"],
        dataset.products.iter().map(|p| {
            vec![
                p.product.clone(),
                p.category.clone().unwrap_or_default(),
                p.standard_unit_cost.to_string(),
            ]
        }),
    )?;

    if !dataset.cost_centers.is_empty() {
        write_table(
            &dir.join(COST_CENTERS_FILE),
            &["cost_center", "description", "manager", "nature"],
            dataset.cost_centers.iter().map(|c| {
                vec![
                    c.cost_center.clone(),
                    c.description.clone().unwrap_or_default(),
                    c.manager.clone().unwrap_or_default(),
                    c.nature.to_string(),
                ]
            }),
        )?;
    }

    info!(
        dir = %dir.display(),
        postings = dataset.postings.len(),
        production = dataset.production.len(),
        products = dataset.products.len(),
        "dataset written"
    );
    Ok(())
}

fn write_table(
    path: &Path,
    headers: &[&str],
    rows: impl Iterator<Item = Vec<String>>,
) -> Result<(), LoadError> {
    let csv_err = |source: csv::Error| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut wtr = Writer::from_path(path).map_err(csv_err)?;
    wtr.write_record(headers).map_err(csv_err)?;
    for row in rows {
        wtr.write_record(&row).map_err(csv_err)?;
    }
    wtr.flush().map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}
