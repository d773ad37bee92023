//! Shape assembler: reducer output → dashboard widget payloads
//!
//! Each widget expects an exact JSON layout. Empty results get the placeholder the
//! widget needs to render instead of an error.

use chrono::NaiveDate;
use qdash_common::config::ReportSettings;
use qdash_common::time::format_date;
use serde::Serialize;

use super::aggregate::SummaryCounts;
use super::filter::CarTypeFilter;

/// Label of the weekly defect placeholder ("no data")
pub const NO_DATA_LABEL: &str = "无数据";

/// Unit suffix of the summary total ("thousand")
pub const THOUSAND_SUFFIX: &str = "千";

/// Summary widget
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub today_count: u64,
    pub week_count: u64,
    pub total_count: String,
    pub current_model: String,
    /// Normalized vehicle type the summary was computed for
    pub car_type: String,
}

/// One bar of the daily OK/NG chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyBar {
    pub name: String,
    pub value: u64,
}

/// One date of the shift chart: `value1` day shift, `value2` night shift
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShiftBar {
    pub name: String,
    pub value1: u64,
    pub value2: u64,
}

/// One slice of a defect pie or one point of the defect ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefectSlice {
    pub name: String,
    pub value: u64,
}

/// Weekly defect slice with a 1-based sequential id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyDefectSlice {
    pub id: u64,
    pub name: String,
    pub value: u64,
}

/// Render a unit total in thousands, discarding the remainder: 1999 → "1 千"
pub fn format_thousands(total: u64) -> String {
    format!("{} {}", total / 1000, THOUSAND_SUFFIX)
}

pub fn summary(counts: SummaryCounts, car_type: &CarTypeFilter, settings: &ReportSettings) -> Summary {
    let current_model = counts.first_model.unwrap_or_else(|| match car_type {
        CarTypeFilter::All => settings.default_model.clone(),
        CarTypeFilter::Code(code) => code.clone(),
    });

    Summary {
        today_count: counts.today,
        week_count: counts.week,
        total_count: format_thousands(counts.total),
        current_model,
        car_type: car_type.as_str().to_string(),
    }
}

pub fn daily_bars(counts: Vec<(NaiveDate, u64)>, today: NaiveDate) -> Vec<DailyBar> {
    if counts.is_empty() {
        return vec![DailyBar {
            name: format_date(today),
            value: 0,
        }];
    }

    counts
        .into_iter()
        .map(|(date, value)| DailyBar {
            name: format_date(date),
            value,
        })
        .collect()
}

pub fn shift_bars(counts: Vec<(NaiveDate, u64, u64)>, today: NaiveDate) -> Vec<ShiftBar> {
    if counts.is_empty() {
        return vec![ShiftBar {
            name: format_date(today),
            value1: 0,
            value2: 0,
        }];
    }

    counts
        .into_iter()
        .map(|(date, value1, value2)| ShiftBar {
            name: format_date(date),
            value1,
            value2,
        })
        .collect()
}

/// Defect slices; an empty result stays empty
pub fn defect_slices(counts: Vec<(String, u64)>) -> Vec<DefectSlice> {
    counts
        .into_iter()
        .map(|(name, value)| DefectSlice { name, value })
        .collect()
}

pub fn weekly_defect_slices(counts: Vec<(String, u64)>) -> Vec<WeeklyDefectSlice> {
    if counts.is_empty() {
        return vec![WeeklyDefectSlice {
            id: 1,
            name: NO_DATA_LABEL.to_string(),
            value: 0,
        }];
    }

    counts
        .into_iter()
        .zip(1u64..)
        .map(|((name, value), id)| WeeklyDefectSlice { id, name, value })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
    }

    fn counts(first_model: Option<&str>, total: u64) -> SummaryCounts {
        SummaryCounts {
            today: 3,
            week: 10,
            total,
            first_model: first_model.map(str::to_string),
        }
    }

    #[test]
    fn test_format_thousands_floors() {
        assert_eq!(format_thousands(0), "0 千");
        assert_eq!(format_thousands(999), "0 千");
        assert_eq!(format_thousands(1999), "1 千");
        assert_eq!(format_thousands(25_000), "25 千");
    }

    #[test]
    fn test_summary_model_fallbacks() {
        let settings = ReportSettings::default();

        let found = summary(counts(Some("V206"), 10), &CarTypeFilter::All, &settings);
        assert_eq!(found.current_model, "V206");

        let default = summary(counts(None, 10), &CarTypeFilter::All, &settings);
        assert_eq!(default.current_model, "V254");
        assert_eq!(default.car_type, "ALL");

        let requested = CarTypeFilter::Code("V214".to_string());
        let echoed = summary(counts(None, 10), &requested, &settings);
        assert_eq!(echoed.current_model, "V214");
        assert_eq!(echoed.car_type, "V214");
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let settings = ReportSettings::default();
        let value = serde_json::to_value(summary(counts(None, 1999), &CarTypeFilter::All, &settings))
            .unwrap();
        assert_eq!(
            value,
            json!({
                "todayCount": 3,
                "weekCount": 10,
                "totalCount": "1 千",
                "currentModel": "V254",
                "carType": "ALL"
            })
        );
    }

    #[test]
    fn test_daily_bars_placeholder() {
        assert_eq!(
            daily_bars(Vec::new(), today()),
            vec![DailyBar {
                name: "2024-05-20".to_string(),
                value: 0
            }]
        );
    }

    #[test]
    fn test_shift_bars_placeholder_and_render() {
        assert_eq!(
            serde_json::to_value(shift_bars(Vec::new(), today())).unwrap(),
            json!([{ "name": "2024-05-20", "value1": 0, "value2": 0 }])
        );

        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(
            shift_bars(vec![(date, 4, 2)], today()),
            vec![ShiftBar {
                name: "2024-05-01".to_string(),
                value1: 4,
                value2: 2
            }]
        );
    }

    #[test]
    fn test_defect_slices_empty_stays_empty() {
        assert!(defect_slices(Vec::new()).is_empty());
    }

    #[test]
    fn test_weekly_slices_ids_and_placeholder() {
        let slices = weekly_defect_slices(vec![("dent".to_string(), 3), ("gap".to_string(), 1)]);
        assert_eq!(
            serde_json::to_value(&slices).unwrap(),
            json!([
                { "id": 1, "name": "dent", "value": 3 },
                { "id": 2, "name": "gap", "value": 1 }
            ])
        );

        assert_eq!(
            weekly_defect_slices(Vec::new()),
            vec![WeeklyDefectSlice {
                id: 1,
                name: NO_DATA_LABEL.to_string(),
                value: 0
            }]
        );
    }
}
