use serde::{Deserialize, Serialize};

/// A bookable offering. Maintained by staff outside this application; read-only here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    /// Minutes.
    pub duration: i32,
    pub is_active: bool,
}

/// The service attributes joined onto an appointment. Every field is optional
/// because each screen projects a different subset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ServiceSummary {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub duration: Option<i32>,
}
