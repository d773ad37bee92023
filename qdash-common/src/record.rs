//! Event record model
//!
//! An `EventRecord` is one row of some production table, projected through its
//! table family's column mapping. Records are read-only snapshots built per request.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;
use serde_json::Value;

use crate::family::TableFamily;
use crate::time::parse_timestamp;

/// One untyped source row: column name → value
pub type RawRow = serde_json::Map<String, Value>;

/// Pass/fail flag of a unit-level record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ResultCode {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "NG")]
    Ng,
}

impl ResultCode {
    /// Parse `"OK"` / `"NG"`; anything else is not a result code
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "OK" => Some(ResultCode::Ok),
            "NG" => Some(ResultCode::Ng),
            _ => None,
        }
    }
}

/// A production event projected onto the dashboard's field set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    /// Table the row was read from (used for deterministic dedup tie-breaks)
    pub source_table: String,
    pub unit_id: Option<String>,
    /// Local wall-clock time; `None` when missing or unparsable
    pub recorded_at: Option<NaiveDateTime>,
    pub car_type: Option<String>,
    pub result: Option<ResultCode>,
    /// Defect label, present on point-level rows only
    pub errtype: Option<String>,
}

impl EventRecord {
    /// Project a raw row through `family`'s column mapping
    ///
    /// Missing columns, nulls and blank strings all become `None`.
    pub fn from_row(source_table: &str, row: &RawRow, family: &TableFamily) -> Self {
        let text = |field: &str| row.get(field).and_then(value_as_text);

        Self {
            source_table: source_table.to_string(),
            unit_id: text(&family.unit_id_field),
            recorded_at: text(&family.datetime_field).and_then(|raw| parse_timestamp(&raw)),
            car_type: text(&family.car_type_field),
            result: text(&family.result_field).and_then(|raw| ResultCode::parse(&raw)),
            errtype: text(&family.errtype_field),
        }
    }

    /// Calendar date of the event, if it carries a valid timestamp
    pub fn date(&self) -> Option<NaiveDate> {
        self.recorded_at.map(|dt| dt.date())
    }

    /// Hour of day of the event, if it carries a valid timestamp
    pub fn hour(&self) -> Option<u32> {
        self.recorded_at.map(|dt| dt.hour())
    }

    /// Defect detail row: carries a defect label but no pass/fail verdict
    pub fn is_defect_only(&self) -> bool {
        self.errtype.is_some() && self.result.is_none()
    }
}

/// Render a scalar cell as trimmed text
///
/// Integer identifiers (e.g. `PN` stored as INTEGER) become their decimal form.
fn value_as_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> RawRow {
        match value {
            Value::Object(map) => map,
            _ => panic!("row fixture must be an object"),
        }
    }

    #[test]
    fn test_from_row_default_family() {
        let raw = row(json!({
            "ordernum": "A-001",
            "datetime": "2024-05-01 08:00:00",
            "cartype": "V254",
            "result": "NG",
            "errtype": "scratch"
        }));
        let record = EventRecord::from_row("Qualitydata_1", &raw, &TableFamily::default());

        assert_eq!(record.source_table, "Qualitydata_1");
        assert_eq!(record.unit_id.as_deref(), Some("A-001"));
        assert_eq!(record.hour(), Some(8));
        assert_eq!(record.car_type.as_deref(), Some("V254"));
        assert_eq!(record.result, Some(ResultCode::Ng));
        assert_eq!(record.errtype.as_deref(), Some("scratch"));
    }

    #[test]
    fn test_from_row_custom_family_and_integer_id() {
        let family = TableFamily {
            name: "pn".to_string(),
            unit_id_field: "PN".to_string(),
            car_type_field: "carType".to_string(),
            ..TableFamily::default()
        };
        let raw = row(json!({ "PN": 1042, "carType": "V206", "result": "OK" }));
        let record = EventRecord::from_row("t", &raw, &family);

        assert_eq!(record.unit_id.as_deref(), Some("1042"));
        assert_eq!(record.car_type.as_deref(), Some("V206"));
        assert_eq!(record.result, Some(ResultCode::Ok));
        assert!(record.recorded_at.is_none());
        assert!(record.errtype.is_none());
    }

    #[test]
    fn test_blank_and_null_fields_are_missing() {
        let raw = row(json!({
            "ordernum": "  ",
            "datetime": null,
            "cartype": "",
            "result": "maybe",
            "errtype": null
        }));
        let record = EventRecord::from_row("t", &raw, &TableFamily::default());

        assert!(record.unit_id.is_none());
        assert!(record.recorded_at.is_none());
        assert!(record.car_type.is_none());
        assert!(record.result.is_none());
        assert!(record.errtype.is_none());
    }

    #[test]
    fn test_unparsable_datetime_is_missing() {
        let raw = row(json!({ "ordernum": "A", "datetime": "not a date" }));
        let record = EventRecord::from_row("t", &raw, &TableFamily::default());
        assert!(record.date().is_none());
        assert!(record.hour().is_none());
    }

    #[test]
    fn test_result_code_parse() {
        assert_eq!(ResultCode::parse("OK"), Some(ResultCode::Ok));
        assert_eq!(ResultCode::parse(" NG "), Some(ResultCode::Ng));
        assert_eq!(ResultCode::parse("ok"), None);
        assert_eq!(serde_json::to_value(ResultCode::Ng).unwrap(), json!("NG"));
    }

    #[test]
    fn test_defect_only_rows() {
        let family = TableFamily::default();
        let point = EventRecord::from_row(
            "Pointdata_1",
            &row(json!({ "ordernum": "A", "errtype": "paint" })),
            &family,
        );
        let inspection = EventRecord::from_row(
            "Qualitydata_1",
            &row(json!({ "ordernum": "A", "result": "NG" })),
            &family,
        );
        let inspection_with_defect = EventRecord::from_row(
            "Qualitydata_1",
            &row(json!({ "ordernum": "A", "result": "NG", "errtype": "paint" })),
            &family,
        );

        assert!(point.is_defect_only());
        assert!(!inspection.is_defect_only());
        assert!(!inspection_with_defect.is_defect_only());
    }
}
