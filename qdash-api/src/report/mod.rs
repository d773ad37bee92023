//! Report pipeline
//!
//! Row source → merge → dedup → filter → aggregate → shape. Every request runs the
//! whole pipeline against fresh rows; nothing is cached between requests.
//!
//! Unit-level shapes (summary, daily and shift bars) deduplicate the full merged set
//! by unit id before filtering. Defect-level shapes (pies, ranking) work on rows that
//! carry a defect label and are never deduplicated, since one unit may carry many
//! defects.

pub mod aggregate;
pub mod dedup;
pub mod filter;
pub mod merge;
pub mod shape;

use chrono::NaiveDate;
use futures::future::try_join_all;
use qdash_common::config::ReportSettings;
use qdash_common::{EventRecord, Result, ResultCode, TableFamily};
use serde::Serialize;
use std::sync::Arc;

use crate::source::{ColumnInfo, RowSource};
use aggregate::ShiftWindow;
pub use filter::{CarTypeFilter, ReportQuery};
use shape::{DailyBar, DefectSlice, ShiftBar, Summary, WeeklyDefectSlice};

/// Dashboard widget selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportShape {
    Summary,
    Daily(ResultCode),
    Shift(ResultCode),
    DefectsAll,
    DefectsWeek,
    TopDefects,
}

impl ReportShape {
    fn is_defect_level(&self) -> bool {
        matches!(
            self,
            ReportShape::DefectsAll | ReportShape::DefectsWeek | ReportShape::TopDefects
        )
    }

    fn is_pass_fail(&self) -> bool {
        matches!(self, ReportShape::Daily(_) | ReportShape::Shift(_))
    }
}

/// Widget payload; serializes as the bare widget shape
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportOutput {
    Summary(Summary),
    Daily(Vec<DailyBar>),
    Shift(Vec<ShiftBar>),
    Defects(Vec<DefectSlice>),
    WeeklyDefects(Vec<WeeklyDefectSlice>),
}

/// Table name with its column layout
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    pub table_name: String,
    pub columns: Vec<ColumnInfo>,
}

/// Runs report queries against a row source
#[derive(Clone)]
pub struct ReportEngine {
    source: Arc<dyn RowSource>,
    families: Arc<Vec<TableFamily>>,
    settings: Arc<ReportSettings>,
}

impl ReportEngine {
    pub fn new(
        source: Arc<dyn RowSource>,
        families: Vec<TableFamily>,
        settings: ReportSettings,
    ) -> Self {
        Self {
            source,
            families: Arc::new(families),
            settings: Arc::new(settings),
        }
    }

    /// Normalize a raw `carType` request parameter with the configured prefix
    pub fn normalize_car_type(&self, raw: Option<&str>) -> CarTypeFilter {
        CarTypeFilter::normalize(raw, &self.settings.type_prefix)
    }

    /// Build one widget payload
    pub async fn run(
        &self,
        kind: ReportShape,
        query: &ReportQuery,
        today: NaiveDate,
    ) -> Result<ReportOutput> {
        let records = merge::merge_records(self.source.as_ref(), &self.families).await?;
        Ok(build_report(kind, records, query, &self.settings, today))
    }

    /// Distinct vehicle types across every mapped table, sorted
    pub async fn car_types(&self) -> Result<Vec<String>> {
        let records = merge::merge_records(self.source.as_ref(), &self.families).await?;
        Ok(merge::distinct_car_types(&records))
    }

    /// Column layout of every table in the source
    pub async fn table_schemas(&self) -> Result<Vec<TableSchema>> {
        let tables = self.source.list_tables().await?;
        let layouts = try_join_all(tables.iter().map(|table| self.source.describe_table(table))).await?;

        Ok(tables
            .into_iter()
            .zip(layouts)
            .map(|(table_name, columns)| TableSchema {
                table_name,
                columns,
            })
            .collect())
    }
}

/// Pure part of the pipeline: merged records → widget payload
pub fn build_report(
    kind: ReportShape,
    records: Vec<EventRecord>,
    query: &ReportQuery,
    settings: &ReportSettings,
    today: NaiveDate,
) -> ReportOutput {
    let rows = if kind.is_defect_level() {
        let defects = records.into_iter().filter(|r| r.errtype.is_some()).collect();
        query.apply(defects, today)
    } else if kind.is_pass_fail() {
        // A later defect row must not shadow the unit's verdict
        let verdicts = records.into_iter().filter(|r| !r.is_defect_only()).collect();
        query.apply(dedup::dedup_latest(verdicts), today)
    } else {
        query.apply(dedup::dedup_latest(records), today)
    };

    match kind {
        ReportShape::Summary => ReportOutput::Summary(shape::summary(
            aggregate::summarize(&rows, today),
            &query.car_type,
            settings,
        )),
        ReportShape::Daily(result) => ReportOutput::Daily(shape::daily_bars(
            aggregate::daily_counts(&rows, result, today),
            today,
        )),
        ReportShape::Shift(result) => {
            let window = ShiftWindow {
                start: settings.day_shift_start,
                end: settings.day_shift_end,
            };
            ReportOutput::Shift(shape::shift_bars(
                aggregate::shift_counts(&rows, result, window, today),
                today,
            ))
        }
        ReportShape::DefectsAll => {
            ReportOutput::Defects(shape::defect_slices(aggregate::defect_counts(&rows)))
        }
        ReportShape::DefectsWeek => ReportOutput::WeeklyDefects(shape::weekly_defect_slices(
            aggregate::recent_defect_counts(&rows),
        )),
        ReportShape::TopDefects => {
            ReportOutput::Defects(shape::defect_slices(aggregate::top_defects_by_units(&rows)))
        }
    }
}
