//! Table family field mappings
//!
//! Source tables do not agree on column names: one family calls the unit
//! identifier `ordernum`, another calls it `PN`. A family binds a table-name prefix
//! to the column names used for each record field.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Column mapping for every table whose name starts with `table_prefix`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableFamily {
    /// Human readable family name (logs only)
    pub name: String,

    /// Table name prefix; empty matches every table
    #[serde(default)]
    pub table_prefix: String,

    /// Column holding the unit identifier (deduplication key)
    #[serde(default = "default_unit_id_field")]
    pub unit_id_field: String,

    #[serde(default = "default_datetime_field")]
    pub datetime_field: String,

    #[serde(default = "default_car_type_field")]
    pub car_type_field: String,

    #[serde(default = "default_result_field")]
    pub result_field: String,

    #[serde(default = "default_errtype_field")]
    pub errtype_field: String,
}

fn default_unit_id_field() -> String {
    "ordernum".to_string()
}

fn default_datetime_field() -> String {
    "datetime".to_string()
}

fn default_car_type_field() -> String {
    "cartype".to_string()
}

fn default_result_field() -> String {
    "result".to_string()
}

fn default_errtype_field() -> String {
    "errtype".to_string()
}

impl Default for TableFamily {
    fn default() -> Self {
        Self {
            name: "production".to_string(),
            table_prefix: String::new(),
            unit_id_field: default_unit_id_field(),
            datetime_field: default_datetime_field(),
            car_type_field: default_car_type_field(),
            result_field: default_result_field(),
            errtype_field: default_errtype_field(),
        }
    }
}

impl TableFamily {
    /// Whether `table` belongs to this family
    pub fn matches(&self, table: &str) -> bool {
        table.starts_with(&self.table_prefix)
    }

    /// Reject mappings with blank column names
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("unit_id_field", &self.unit_id_field),
            ("datetime_field", &self.datetime_field),
            ("car_type_field", &self.car_type_field),
            ("result_field", &self.result_field),
            ("errtype_field", &self.errtype_field),
        ];
        for (key, value) in fields {
            if value.trim().is_empty() {
                return Err(Error::Config(format!(
                    "family '{}': {} must not be empty",
                    self.name, key
                )));
            }
        }
        Ok(())
    }
}

/// Pick the first family matching `table`
pub fn family_for<'a>(families: &'a [TableFamily], table: &str) -> Option<&'a TableFamily> {
    families.iter().find(|family| family.matches(table))
}
