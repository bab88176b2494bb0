use serde::Serialize;

use crate::backend::{from_row, Backend, Query, Table};
use crate::errors::{Action, AppError};
use crate::models::Service;
use crate::services::format::{format_duration, format_price};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ServiceCard {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub duration: String,
}

impl From<&Service> for ServiceCard {
    fn from(service: &Service) -> Self {
        Self {
            id: service.id.clone(),
            name: service.name.clone(),
            description: service.description.clone().unwrap_or_default(),
            price: format_price(service.price),
            duration: format_duration(service.duration),
        }
    }
}

/// Active services, ordered by name.
pub async fn list_services(backend: &dyn Backend) -> Result<Vec<Service>, AppError> {
    let query = Query::table(Table::Services)
        .eq("is_active", true)
        .order("name", true);

    let rows = backend
        .select(&query)
        .await
        .map_err(|e| AppError::backend(Action::LoadServices, e))?;

    rows.into_iter()
        .map(from_row)
        .collect::<anyhow::Result<Vec<Service>>>()
        .map_err(|e| AppError::backend(Action::LoadServices, e))
}

pub async fn load_catalog(backend: &dyn Backend) -> Result<Vec<ServiceCard>, AppError> {
    let services = list_services(backend).await?;
    Ok(services.iter().map(ServiceCard::from).collect())
}
