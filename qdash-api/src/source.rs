//! Row source abstraction
//!
//! The report pipeline only needs two questions answered: which tables exist, and
//! what rows does a table hold. Production reads come from SQLite
//! (`db::SqliteRowSource`); tests use `MemoryRowSource`.

use async_trait::async_trait;
use qdash_common::record::RawRow;
use qdash_common::{Error, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Column metadata as reported by `PRAGMA table_info`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnInfo {
    pub cid: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
    pub notnull: i64,
    pub dflt_value: Option<String>,
    pub pk: i64,
}

/// Read-only access to production tables
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Names of all user tables, ascending
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Full scan of one table
    async fn read_all(&self, table: &str) -> Result<Vec<RawRow>>;

    /// Column layout of one table
    async fn describe_table(&self, table: &str) -> Result<Vec<ColumnInfo>>;
}

/// In-memory row source
///
/// Tables listed in `failing` return an error from `read_all`, which lets callers
/// exercise the all-or-nothing fan-in.
#[derive(Debug, Clone, Default)]
pub struct MemoryRowSource {
    tables: BTreeMap<String, Vec<RawRow>>,
    failing: BTreeSet<String>,
}

impl MemoryRowSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a table
    pub fn with_table(mut self, name: &str, rows: Vec<RawRow>) -> Self {
        self.tables.insert(name.to_string(), rows);
        self
    }

    /// Add a table whose reads always fail
    pub fn with_failing_table(mut self, name: &str) -> Self {
        self.tables.insert(name.to_string(), Vec::new());
        self.failing.insert(name.to_string());
        self
    }
}

#[async_trait]
impl RowSource for MemoryRowSource {
    async fn list_tables(&self) -> Result<Vec<String>> {
        Ok(self.tables.keys().cloned().collect())
    }

    async fn read_all(&self, table: &str) -> Result<Vec<RawRow>> {
        if self.failing.contains(table) {
            return Err(Error::Source(format!("read of table {} failed", table)));
        }
        self.tables
            .get(table)
            .cloned()
            .ok_or_else(|| Error::Source(format!("no such table: {}", table)))
    }

    async fn describe_table(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let rows = self
            .tables
            .get(table)
            .ok_or_else(|| Error::Source(format!("no such table: {}", table)))?;

        let names: BTreeSet<&String> = rows.iter().flat_map(|row| row.keys()).collect();
        Ok(names
            .into_iter()
            .enumerate()
            .map(|(cid, name)| ColumnInfo {
                cid: cid as i64,
                name: name.clone(),
                column_type: String::new(),
                notnull: 0,
                dflt_value: None,
                pk: 0,
            })
            .collect())
    }
}
