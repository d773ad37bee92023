//! Aggregator: reducers from filtered records to counts
//!
//! Every "recent N days" window here is a data-date window: the N most recent
//! distinct dates that actually have matching records, not a calendar span.

use chrono::NaiveDate;
use qdash_common::{EventRecord, ResultCode};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Number of data-dates kept by windowed reducers
pub const WINDOW_DAYS: usize = 7;

/// Number of defects kept by the ranking
pub const TOP_DEFECTS: usize = 5;

/// Shift of a production event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    Day,
    Night,
}

/// Day shift hours `[start, end)`; every other hour is night shift
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftWindow {
    pub start: u32,
    pub end: u32,
}

impl Default for ShiftWindow {
    fn default() -> Self {
        Self { start: 7, end: 19 }
    }
}

impl ShiftWindow {
    /// Records without a valid timestamp count as night shift
    pub fn classify(&self, hour: Option<u32>) -> Shift {
        match hour {
            Some(h) if (self.start..self.end).contains(&h) => Shift::Day,
            _ => Shift::Night,
        }
    }
}

/// Per-date count of records with the given result, newest first, at most 7 dates
///
/// Records without a valid timestamp are counted under `today`.
pub fn daily_counts(
    records: &[EventRecord],
    result: ResultCode,
    today: NaiveDate,
) -> Vec<(NaiveDate, u64)> {
    let mut by_date: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for record in records.iter().filter(|r| r.result == Some(result)) {
        *by_date.entry(record.date().unwrap_or(today)).or_default() += 1;
    }

    by_date.into_iter().rev().take(WINDOW_DAYS).collect()
}

/// Per-date (day shift, night shift) counts, oldest first, over the 7 most recent dates
///
/// Date fallback matches `daily_counts`; a date seen in only one shift reports 0
/// for the other.
pub fn shift_counts(
    records: &[EventRecord],
    result: ResultCode,
    window: ShiftWindow,
    today: NaiveDate,
) -> Vec<(NaiveDate, u64, u64)> {
    let mut by_date: BTreeMap<NaiveDate, (u64, u64)> = BTreeMap::new();
    for record in records.iter().filter(|r| r.result == Some(result)) {
        let counts = by_date.entry(record.date().unwrap_or(today)).or_default();
        match window.classify(record.hour()) {
            Shift::Day => counts.0 += 1,
            Shift::Night => counts.1 += 1,
        }
    }

    let skip = by_date.len().saturating_sub(WINDOW_DAYS);
    by_date
        .into_iter()
        .skip(skip)
        .map(|(date, (day, night))| (date, day, night))
        .collect()
}

/// Occurrences of each defect label, in first-encounter order
pub fn defect_counts<'a, I>(records: I) -> Vec<(String, u64)>
where
    I: IntoIterator<Item = &'a EventRecord>,
{
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, u64)> = Vec::new();

    for errtype in records.into_iter().filter_map(|r| r.errtype.as_deref()) {
        match slots.get(errtype) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                slots.insert(errtype, counts.len());
                counts.push((errtype.to_string(), 1));
            }
        }
    }

    counts
}

/// Defect occurrences restricted to the 7 most recent dates that have defect rows
///
/// Rows without a valid timestamp cannot be placed in the window and are skipped.
pub fn recent_defect_counts(records: &[EventRecord]) -> Vec<(String, u64)> {
    let dated = records
        .iter()
        .filter(|r| r.errtype.is_some())
        .filter_map(|r| r.date().map(|date| (date, r)));

    let dates: HashSet<NaiveDate> = dated.clone().map(|(date, _)| date).collect();
    let window = recent_dates(dates, WINDOW_DAYS);

    defect_counts(
        dated
            .filter(|(date, _)| window.contains(date))
            .map(|(_, record)| record),
    )
}

/// Defects ranked by number of distinct units carrying them, top 5
///
/// Rows without a unit identifier are ignored. Equal counts keep first-encounter
/// order (stable sort).
pub fn top_defects_by_units(records: &[EventRecord]) -> Vec<(String, u64)> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut units: Vec<(&str, HashSet<&str>)> = Vec::new();

    for record in records {
        let (Some(errtype), Some(unit_id)) = (record.errtype.as_deref(), record.unit_id.as_deref())
        else {
            continue;
        };
        let slot = *slots.entry(errtype).or_insert_with(|| {
            units.push((errtype, HashSet::new()));
            units.len() - 1
        });
        units[slot].1.insert(unit_id);
    }

    let mut ranked: Vec<(String, u64)> = units
        .into_iter()
        .map(|(errtype, set)| (errtype.to_string(), set.len() as u64))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(TOP_DEFECTS);
    ranked
}

/// Unique-unit counters behind the summary widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryCounts {
    /// Distinct units dated today
    pub today: u64,
    /// Sum of per-date distinct units over the 7 most recent data-dates
    pub week: u64,
    /// Distinct units over all time (timestamp not required)
    pub total: u64,
    /// First vehicle type encountered
    pub first_model: Option<String>,
}

pub fn summarize(records: &[EventRecord], today: NaiveDate) -> SummaryCounts {
    let mut per_date: HashMap<NaiveDate, HashSet<&str>> = HashMap::new();
    let mut all_units: HashSet<&str> = HashSet::new();

    for record in records {
        let Some(unit_id) = record.unit_id.as_deref() else {
            continue;
        };
        all_units.insert(unit_id);
        if let Some(date) = record.date() {
            per_date.entry(date).or_default().insert(unit_id);
        }
    }

    let today_count = per_date.get(&today).map_or(0, |units| units.len() as u64);
    let week = recent_dates(per_date.keys().copied().collect(), WINDOW_DAYS)
        .iter()
        .map(|date| per_date.get(date).map_or(0, |units| units.len() as u64))
        .sum();

    SummaryCounts {
        today: today_count,
        week,
        total: all_units.len() as u64,
        first_model: records.iter().find_map(|r| r.car_type.clone()),
    }
}

/// The `n` most recent of `dates`, newest first
fn recent_dates(dates: HashSet<NaiveDate>, n: usize) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = dates.into_iter().collect();
    dates.sort_unstable_by(|a, b| b.cmp(a));
    dates.truncate(n);
    dates
}
