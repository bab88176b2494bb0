pub mod postgrest;
pub mod schema;
pub mod sqlite;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use schema::{ColumnKind, Table};

/// One record as the backend hands it over: column name to JSON value.
/// Embedded (joined) records appear as nested objects under their alias.
pub type Row = serde_json::Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: &'static str,
    pub value: Value,
}

/// Equality filter, the only kind the booking screens need.
pub fn eq(column: &'static str, value: impl Into<Value>) -> Filter {
    Filter {
        column,
        value: value.into(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub column: &'static str,
    pub ascending: bool,
}

/// A record from another table reached through a foreign key column of the
/// queried table, returned under `alias` (or null when the key dangles).
#[derive(Debug, Clone, PartialEq)]
pub struct Embed {
    pub alias: &'static str,
    pub foreign_key: &'static str,
    pub table: Table,
    pub columns: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: Table,
    /// Empty means every column.
    pub columns: Vec<&'static str>,
    pub embeds: Vec<Embed>,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
}

impl Query {
    pub fn table(table: Table) -> Self {
        Self {
            table,
            columns: vec![],
            embeds: vec![],
            filters: vec![],
            order: None,
        }
    }

    pub fn columns(mut self, columns: &[&'static str]) -> Self {
        self.columns = columns.to_vec();
        self
    }

    pub fn embed(
        mut self,
        alias: &'static str,
        foreign_key: &'static str,
        table: Table,
        columns: &[&'static str],
    ) -> Self {
        self.embeds.push(Embed {
            alias,
            foreign_key,
            table,
            columns: columns.to_vec(),
        });
        self
    }

    pub fn eq(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.filters.push(eq(column, value));
        self
    }

    pub fn order(mut self, column: &'static str, ascending: bool) -> Self {
        self.order = Some(Order { column, ascending });
        self
    }

    /// Checks every column name against the schema.
    pub fn validate(&self) -> anyhow::Result<()> {
        for column in &self.columns {
            self.table.check_column(column)?;
        }
        for filter in &self.filters {
            self.table.check_column(filter.column)?;
        }
        if let Some(order) = &self.order {
            self.table.check_column(order.column)?;
        }
        for embed in &self.embeds {
            self.table.check_column(embed.foreign_key)?;
            for column in &embed.columns {
                embed.table.check_column(column)?;
            }
        }
        Ok(())
    }
}

pub fn check_row(table: Table, row: &Row) -> anyhow::Result<()> {
    for column in row.keys() {
        table.check_column(column)?;
    }
    Ok(())
}

pub fn check_filters(table: Table, filters: &[Filter]) -> anyhow::Result<()> {
    anyhow::ensure!(
        !filters.is_empty(),
        "refusing unfiltered update on {}",
        table.name()
    );
    for filter in filters {
        table.check_column(filter.column)?;
    }
    Ok(())
}

pub fn from_row<T: DeserializeOwned>(row: Row) -> anyhow::Result<T> {
    Ok(serde_json::from_value(Value::Object(row))?)
}

pub fn to_row<T: serde::Serialize>(record: &T) -> anyhow::Result<Row> {
    match serde_json::to_value(record)? {
        Value::Object(row) => Ok(row),
        other => Err(anyhow::anyhow!("record did not serialize to an object: {other}")),
    }
}

/// Query and mutation capability of the hosted data service.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn select(&self, query: &Query) -> anyhow::Result<Vec<Row>>;

    /// Inserts one record and returns it as stored, including generated fields.
    async fn insert(&self, table: Table, record: Row) -> anyhow::Result<Row>;

    /// Applies `changes` to every row matching all `filters`; returns the number of rows touched.
    async fn update(&self, table: Table, changes: Row, filters: &[Filter]) -> anyhow::Result<u64>;
}
