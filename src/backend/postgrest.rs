use anyhow::Context;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use super::{check_filters, check_row, Backend, Filter, Order, Query, Row, Table};

/// Client for the hosted backend's PostgREST endpoint (`{url}/rest/v1/{table}`).
pub struct PostgrestBackend {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl PostgrestBackend {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            base_url,
            api_key,
            client: reqwest::Client::new(),
        }
    }

    fn request(&self, method: Method, table: Table) -> reqwest::RequestBuilder {
        let url = format!(
            "{}/rest/v1/{}",
            self.base_url.trim_end_matches('/'),
            table.name()
        );
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

/// `select=` value: plain columns, then `alias:fk(cols)` per embed.
pub fn select_param(query: &Query) -> String {
    let mut parts: Vec<String> = if query.columns.is_empty() {
        vec!["*".to_string()]
    } else {
        query.columns.iter().map(|c| c.to_string()).collect()
    };

    for embed in &query.embeds {
        let columns = if embed.columns.is_empty() {
            "*".to_string()
        } else {
            embed.columns.join(",")
        };
        parts.push(format!("{}:{}({columns})", embed.alias, embed.foreign_key));
    }

    parts.join(",")
}

pub fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|f| {
            let condition = match &f.value {
                Value::Null => "is.null".to_string(),
                Value::String(s) => format!("eq.{s}"),
                other => format!("eq.{other}"),
            };
            (f.column.to_string(), condition)
        })
        .collect()
}

fn order_param(order: &Order) -> (String, String) {
    let direction = if order.ascending { "asc" } else { "desc" };
    ("order".to_string(), format!("{}.{direction}", order.column))
}

#[async_trait]
impl Backend for PostgrestBackend {
    async fn select(&self, query: &Query) -> anyhow::Result<Vec<Row>> {
        query.validate()?;

        let mut params = vec![("select".to_string(), select_param(query))];
        params.extend(filter_params(&query.filters));
        if let Some(order) = &query.order {
            params.push(order_param(order));
        }

        let rows: Vec<Row> = self
            .request(Method::GET, query.table)
            .query(&params)
            .send()
            .await
            .with_context(|| format!("failed to query {}", query.table.name()))?
            .error_for_status()
            .context("backend rejected select")?
            .json()
            .await
            .context("failed to parse backend rows")?;

        Ok(rows)
    }

    async fn insert(&self, table: Table, record: Row) -> anyhow::Result<Row> {
        check_row(table, &record)?;

        let rows: Vec<Row> = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(&record)
            .send()
            .await
            .with_context(|| format!("failed to insert into {}", table.name()))?
            .error_for_status()
            .context("backend rejected insert")?
            .json()
            .await
            .context("failed to parse inserted row")?;

        rows.into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("backend returned no inserted row"))
    }

    async fn update(&self, table: Table, changes: Row, filters: &[Filter]) -> anyhow::Result<u64> {
        check_row(table, &changes)?;
        check_filters(table, filters)?;

        let rows: Vec<Row> = self
            .request(Method::PATCH, table)
            .header("Prefer", "return=representation")
            .query(&filter_params(filters))
            .json(&changes)
            .send()
            .await
            .with_context(|| format!("failed to update {}", table.name()))?
            .error_for_status()
            .context("backend rejected update")?
            .json()
            .await
            .context("failed to parse updated rows")?;

        Ok(rows.len() as u64)
    }
}
