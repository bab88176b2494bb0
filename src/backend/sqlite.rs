use std::sync::{Mutex, MutexGuard};

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection};
use serde_json::Value;

use super::{check_filters, check_row, Backend, ColumnKind, Filter, Query, Row, Table};
use crate::db;

/// Local stand-in for the hosted backend, on a SQLite file or `:memory:`.
pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

/// Where a selected SQL column lands in the returned record.
enum Slot {
    Own(&'static str, ColumnKind),
    Embedded(usize, &'static str, ColumnKind),
    /// Joined row's primary key; NULL means the foreign key dangles.
    EmbedKey(usize),
}

impl SqliteBackend {
    pub fn open(path: &str) -> anyhow::Result<Self> {
        let conn = db::init_db(path)?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("database connection lock poisoned"))
    }

    fn select_rows(&self, query: &Query) -> anyhow::Result<Vec<Row>> {
        query.validate()?;

        let table = query.table;
        let mut slots = vec![];
        let mut selected = vec![];

        let columns: Vec<&'static str> = if query.columns.is_empty() {
            table.columns().iter().map(|(name, _)| *name).collect()
        } else {
            query.columns.clone()
        };
        for column in columns {
            selected.push(format!("t.\"{column}\""));
            slots.push(Slot::Own(column, table.check_column(column)?));
        }

        let mut joins = String::new();
        for (i, embed) in query.embeds.iter().enumerate() {
            let embed_columns: Vec<&'static str> = if embed.columns.is_empty() {
                embed.table.columns().iter().map(|(name, _)| *name).collect()
            } else {
                embed.columns.clone()
            };
            for column in embed_columns {
                selected.push(format!("e{i}.\"{column}\""));
                slots.push(Slot::Embedded(i, column, embed.table.check_column(column)?));
            }
            selected.push(format!("e{i}.\"id\""));
            slots.push(Slot::EmbedKey(i));
            joins.push_str(&format!(
                " LEFT JOIN \"{}\" AS e{i} ON e{i}.\"id\" = t.\"{}\"",
                embed.table.name(),
                embed.foreign_key
            ));
        }

        let (where_clause, values) = where_clause(table, &query.filters, "t.")?;
        let mut sql = format!(
            "SELECT {} FROM \"{}\" AS t{joins}{where_clause}",
            selected.join(", "),
            table.name()
        );
        if let Some(order) = &query.order {
            let direction = if order.ascending { "ASC" } else { "DESC" };
            sql.push_str(&format!(" ORDER BY t.\"{}\" {direction}", order.column));
        }

        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&sql)
            .with_context(|| format!("failed to prepare select on {}", table.name()))?;
        let mut rows = stmt.query(params_from_iter(values.iter()))?;

        let mut records = vec![];
        while let Some(row) = rows.next()? {
            let mut record = Row::new();
            let mut embedded: Vec<Row> = vec![Row::new(); query.embeds.len()];
            let mut present = vec![false; query.embeds.len()];

            for (idx, slot) in slots.iter().enumerate() {
                match slot {
                    Slot::Own(column, kind) => {
                        record.insert(column.to_string(), read_value(row.get_ref(idx)?, *kind)?);
                    }
                    Slot::Embedded(i, column, kind) => {
                        embedded[*i]
                            .insert(column.to_string(), read_value(row.get_ref(idx)?, *kind)?);
                    }
                    Slot::EmbedKey(i) => {
                        present[*i] = !matches!(row.get_ref(idx)?, ValueRef::Null);
                    }
                }
            }

            for (i, (embed, fields)) in query.embeds.iter().zip(embedded).enumerate() {
                let value = if present[i] {
                    Value::Object(fields)
                } else {
                    Value::Null
                };
                record.insert(embed.alias.to_string(), value);
            }
            records.push(record);
        }

        Ok(records)
    }

    fn insert_row(&self, table: Table, mut record: Row) -> anyhow::Result<Row> {
        check_row(table, &record)?;

        let id = match record.get("id") {
            Some(Value::String(id)) => id.clone(),
            _ => {
                let id = uuid::Uuid::new_v4().to_string();
                record.insert("id".to_string(), Value::String(id.clone()));
                id
            }
        };

        let mut columns = vec![];
        let mut values = vec![];
        for (column, value) in &record {
            let kind = table.check_column(column)?;
            columns.push(format!("\"{column}\""));
            values.push(to_sql_value(value, kind)?);
        }
        let placeholders = vec!["?"; columns.len()].join(", ");

        {
            let conn = self.lock()?;
            conn.execute(
                &format!(
                    "INSERT INTO \"{}\" ({}) VALUES ({placeholders})",
                    table.name(),
                    columns.join(", ")
                ),
                params_from_iter(values.iter()),
            )
            .with_context(|| format!("failed to insert into {}", table.name()))?;
        }

        self.select_rows(&Query::table(table).eq("id", id))?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("inserted row not found in {}", table.name()))
    }

    fn update_rows(&self, table: Table, changes: Row, filters: &[Filter]) -> anyhow::Result<u64> {
        check_row(table, &changes)?;
        check_filters(table, filters)?;
        anyhow::ensure!(!changes.is_empty(), "nothing to update in {}", table.name());

        let mut assignments = vec![];
        let mut values = vec![];
        for (column, value) in &changes {
            let kind = table.check_column(column)?;
            assignments.push(format!("\"{column}\" = ?"));
            values.push(to_sql_value(value, kind)?);
        }

        let (where_clause, filter_values) = where_clause(table, filters, "")?;
        values.extend(filter_values);

        let conn = self.lock()?;
        let count = conn
            .execute(
                &format!(
                    "UPDATE \"{}\" SET {}{where_clause}",
                    table.name(),
                    assignments.join(", ")
                ),
                params_from_iter(values.iter()),
            )
            .with_context(|| format!("failed to update {}", table.name()))?;

        Ok(count as u64)
    }
}

fn where_clause(
    table: Table,
    filters: &[Filter],
    prefix: &str,
) -> anyhow::Result<(String, Vec<SqlValue>)> {
    if filters.is_empty() {
        return Ok((String::new(), vec![]));
    }

    let mut conditions = vec![];
    let mut values = vec![];
    for filter in filters {
        let kind = table.check_column(filter.column)?;
        if filter.value.is_null() {
            conditions.push(format!("{prefix}\"{}\" IS NULL", filter.column));
        } else {
            conditions.push(format!("{prefix}\"{}\" = ?", filter.column));
            values.push(to_sql_value(&filter.value, kind)?);
        }
    }

    Ok((format!(" WHERE {}", conditions.join(" AND ")), values))
}

fn to_sql_value(value: &Value, kind: ColumnKind) -> anyhow::Result<SqlValue> {
    Ok(match (value, kind) {
        (Value::Null, _) => SqlValue::Null,
        (Value::Bool(b), _) => SqlValue::Integer(i64::from(*b)),
        (Value::Number(n), ColumnKind::Real) => SqlValue::Real(
            n.as_f64()
                .ok_or_else(|| anyhow::anyhow!("number out of range: {n}"))?,
        ),
        (Value::Number(n), _) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(
                n.as_f64()
                    .ok_or_else(|| anyhow::anyhow!("number out of range: {n}"))?,
            ),
        },
        (Value::String(s), ColumnKind::Timestamp) => SqlValue::Text(normalize_timestamp(s)?),
        (Value::String(s), _) => SqlValue::Text(s.clone()),
        (other, _) => anyhow::bail!("unsupported column value: {other}"),
    })
}

fn read_value(value: ValueRef<'_>, kind: ColumnKind) -> anyhow::Result<Value> {
    Ok(match (value, kind) {
        (ValueRef::Null, _) => Value::Null,
        (ValueRef::Integer(i), ColumnKind::Bool) => Value::Bool(i != 0),
        (ValueRef::Integer(i), ColumnKind::Real) => Value::from(i as f64),
        (ValueRef::Integer(i), _) => Value::from(i),
        (ValueRef::Real(f), _) => Value::from(f),
        (ValueRef::Text(bytes), _) => Value::String(
            std::str::from_utf8(bytes)
                .context("invalid UTF-8 in text column")?
                .to_string(),
        ),
        (ValueRef::Blob(_), _) => anyhow::bail!("unexpected blob column"),
    })
}

/// Timestamps are stored as UTC RFC 3339 with second precision so that
/// text ordering matches time ordering.
fn normalize_timestamp(s: &str) -> anyhow::Result<String> {
    let instant = DateTime::parse_from_rfc3339(s)
        .with_context(|| format!("invalid timestamp: {s}"))?
        .with_timezone(&Utc);
    Ok(instant.to_rfc3339_opts(SecondsFormat::Secs, true))
}

#[async_trait]
impl Backend for SqliteBackend {
    async fn select(&self, query: &Query) -> anyhow::Result<Vec<Row>> {
        self.select_rows(query)
    }

    async fn insert(&self, table: Table, record: Row) -> anyhow::Result<Row> {
        self.insert_row(table, record)
    }

    async fn update(&self, table: Table, changes: Row, filters: &[Filter]) -> anyhow::Result<u64> {
        self.update_rows(table, changes, filters)
    }
}
