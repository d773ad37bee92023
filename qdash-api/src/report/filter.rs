//! Filter stage: vehicle type and today-only predicates

use chrono::NaiveDate;
use qdash_common::EventRecord;

/// Sentinel meaning "no vehicle type filter"
pub const ALL_TYPES: &str = "ALL";

/// Normalized vehicle type request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CarTypeFilter {
    All,
    Code(String),
}

impl CarTypeFilter {
    /// Normalize a requested vehicle type
    ///
    /// Blank or `ALL` (any case) → `All`. Otherwise the code is uppercased and
    /// `prefix` is prepended unless already present, so `"254"` → `"V254"`.
    /// `normalize(normalize(x).as_str()) == normalize(x)`.
    pub fn normalize(input: Option<&str>, prefix: &str) -> Self {
        let value = input.unwrap_or_default().trim().to_uppercase();
        if value.is_empty() || value == ALL_TYPES {
            return CarTypeFilter::All;
        }

        let prefix = prefix.trim().to_uppercase();
        if value.starts_with(&prefix) {
            CarTypeFilter::Code(value)
        } else {
            CarTypeFilter::Code(format!("{}{}", prefix, value))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CarTypeFilter::All => ALL_TYPES,
            CarTypeFilter::Code(code) => code,
        }
    }

    /// Type predicate: exact match on the record's vehicle type
    pub fn matches(&self, record: &EventRecord) -> bool {
        match self {
            CarTypeFilter::All => true,
            CarTypeFilter::Code(code) => record.car_type.as_deref() == Some(code.as_str()),
        }
    }
}

/// Recency predicate: the record is dated `today`
///
/// Records without a valid timestamp never pass.
pub fn is_today(record: &EventRecord, today: NaiveDate) -> bool {
    record.date() == Some(today)
}

/// Per-request filter parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportQuery {
    pub car_type: CarTypeFilter,
    pub today_only: bool,
}

impl Default for ReportQuery {
    fn default() -> Self {
        Self {
            car_type: CarTypeFilter::All,
            today_only: false,
        }
    }
}

impl ReportQuery {
    pub fn new(car_type: CarTypeFilter, today_only: bool) -> Self {
        Self {
            car_type,
            today_only,
        }
    }

    /// Whether `record` passes both filters
    pub fn keep(&self, record: &EventRecord, today: NaiveDate) -> bool {
        self.car_type.matches(record) && (!self.today_only || is_today(record, today))
    }

    /// Apply both filters
    pub fn apply(&self, records: Vec<EventRecord>, today: NaiveDate) -> Vec<EventRecord> {
        records
            .into_iter()
            .filter(|record| self.keep(record, today))
            .collect()
    }
}
