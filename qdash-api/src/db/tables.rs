//! Table listing and full-scan queries

use async_trait::async_trait;
use qdash_common::record::RawRow;
use qdash_common::Result;
use serde_json::{json, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, SqlitePool, ValueRef};

use crate::source::{ColumnInfo, RowSource};

/// `RowSource` backed by the shared read-only SQLite pool
#[derive(Clone)]
pub struct SqliteRowSource {
    pool: SqlitePool,
}

impl SqliteRowSource {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RowSource for SqliteRowSource {
    async fn list_tables(&self) -> Result<Vec<String>> {
        list_tables(&self.pool).await
    }

    async fn read_all(&self, table: &str) -> Result<Vec<RawRow>> {
        read_table(&self.pool, table).await
    }

    async fn describe_table(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        table_columns(&self.pool, table).await
    }
}

/// List all user tables
///
/// Returns tables in alphabetical order, excluding SQLite internal tables.
pub async fn list_tables(pool: &SqlitePool) -> Result<Vec<String>> {
    let tables = sqlx::query_scalar::<_, String>(
        r#"
        SELECT name
        FROM sqlite_master
        WHERE type = 'table'
          AND name NOT LIKE 'sqlite_%'
        ORDER BY name ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(tables)
}

/// Read every row of `table` as column → JSON value maps
pub async fn read_table(pool: &SqlitePool, table: &str) -> Result<Vec<RawRow>> {
    let sql = format!("SELECT * FROM {}", quote_identifier(table));
    let rows = sqlx::query(&sql).fetch_all(pool).await?;

    Ok(rows.iter().map(row_to_map).collect())
}

/// Column layout of `table` via `PRAGMA table_info`
pub async fn table_columns(pool: &SqlitePool, table: &str) -> Result<Vec<ColumnInfo>> {
    let sql = format!("PRAGMA table_info({})", quote_identifier(table));
    let rows = sqlx::query(&sql).fetch_all(pool).await?;

    // PRAGMA table_info returns: (cid, name, type, notnull, dflt_value, pk)
    rows.iter()
        .map(|row| -> Result<ColumnInfo> {
            Ok(ColumnInfo {
                cid: row.try_get(0)?,
                name: row.try_get(1)?,
                column_type: row.try_get(2)?,
                notnull: row.try_get(3)?,
                dflt_value: row.try_get(4)?,
                pk: row.try_get(5)?,
            })
        })
        .collect()
}

/// Quote a table name for interpolation into SQL
///
/// Table names come from `sqlite_master`, not from requests, but may still contain
/// spaces or quotes.
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Convert one SQLite row to a JSON map
fn row_to_map(row: &SqliteRow) -> RawRow {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, column)| (column.name().to_string(), cell_to_json(row, i)))
        .collect()
}

/// Convert a single SQLite cell to JSON (TEXT, INTEGER, REAL; everything else null)
fn cell_to_json(row: &SqliteRow, index: usize) -> Value {
    row.try_get_raw(index)
        .ok()
        .and_then(|val| {
            if val.is_null() {
                Some(Value::Null)
            } else {
                row.try_get::<String, _>(index)
                    .ok()
                    .map(Value::String)
                    .or_else(|| row.try_get::<i64, _>(index).ok().map(|v| json!(v)))
                    .or_else(|| row.try_get::<f64, _>(index).ok().map(|v| json!(v)))
            }
        })
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool");

        for sql in [
            "CREATE TABLE \"Qualitydata_2024\" (ordernum TEXT, datetime TEXT, result TEXT, score REAL, PN INTEGER)",
            "INSERT INTO \"Qualitydata_2024\" VALUES ('A1', '2024-05-01 08:00:00', 'OK', 1.5, 42)",
            "INSERT INTO \"Qualitydata_2024\" VALUES ('A2', NULL, 'NG', NULL, NULL)",
            "CREATE TABLE \"odd \"\"name\"\"\" (x TEXT NOT NULL DEFAULT 'v')",
        ] {
            sqlx::query(sql).execute(&pool).await.unwrap();
        }
        pool
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("plain"), "\"plain\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }

    #[tokio::test]
    async fn test_list_tables_sorted_without_internal() {
        let pool = memory_pool().await;
        let tables = list_tables(&pool).await.unwrap();
        assert_eq!(tables, vec!["Qualitydata_2024", "odd \"name\""]);
    }

    #[tokio::test]
    async fn test_read_table_converts_cells() {
        let pool = memory_pool().await;
        let rows = read_table(&pool, "Qualitydata_2024").await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["ordernum"], json!("A1"));
        assert_eq!(rows[0]["score"], json!(1.5));
        assert_eq!(rows[0]["PN"], json!(42));
        assert_eq!(rows[1]["datetime"], Value::Null);
        assert_eq!(rows[1]["PN"], Value::Null);
    }

    #[tokio::test]
    async fn test_table_columns() {
        let pool = memory_pool().await;
        let columns = table_columns(&pool, "odd \"name\"").await.unwrap();

        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].name, "x");
        assert_eq!(columns[0].column_type, "TEXT");
        assert_eq!(columns[0].notnull, 1);
        assert_eq!(columns[0].dflt_value.as_deref(), Some("'v'"));
        assert_eq!(columns[0].pk, 0);
    }

    #[tokio::test]
    async fn test_missing_table_is_error() {
        let pool = memory_pool().await;
        assert!(read_table(&pool, "nope").await.is_err());
    }
}
