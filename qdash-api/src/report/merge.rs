//! Merger: table discovery → concurrent full scans → one record sequence

use futures::future::try_join_all;
use qdash_common::family::{family_for, TableFamily};
use qdash_common::{EventRecord, Result};
use tracing::debug;

use crate::source::RowSource;

/// Read every table that belongs to a configured family and project its rows
///
/// Reads are issued concurrently and joined all-or-nothing: if any table fails,
/// the whole merge fails. Output order is tables ascending by name, then row order
/// within each table.
pub async fn merge_records(
    source: &dyn RowSource,
    families: &[TableFamily],
) -> Result<Vec<EventRecord>> {
    let mut tables = source.list_tables().await?;
    tables.sort();

    let selected: Vec<(String, &TableFamily)> = tables
        .into_iter()
        .filter_map(|table| match family_for(families, &table) {
            Some(family) => Some((table, family)),
            None => {
                debug!(table = %table, "Skipping table outside every family");
                None
            }
        })
        .collect();

    let reads = selected.iter().map(|(table, _)| source.read_all(table));
    let results = try_join_all(reads).await?;

    let records: Vec<EventRecord> = selected
        .iter()
        .zip(results)
        .flat_map(|((table, family), rows)| {
            rows.into_iter()
                .map(move |row| EventRecord::from_row(table, &row, family))
        })
        .collect();

    debug!(
        tables = selected.len(),
        records = records.len(),
        "Merged production tables"
    );

    Ok(records)
}

/// Distinct non-empty vehicle types, sorted ascending
pub fn distinct_car_types(records: &[EventRecord]) -> Vec<String> {
    let mut types: Vec<String> = records
        .iter()
        .filter_map(|record| record.car_type.clone())
        .collect();
    types.sort();
    types.dedup();
    types
}
