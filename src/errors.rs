use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::models::Notice;

/// Screen action a backend failure happened in; picks the generic message shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    LoadServices,
    Book,
    LoadAppointments,
    CancelAppointment,
    LoadDashboard,
    LoadProfile,
    SaveProfile,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::LoadServices => "load_services",
            Action::Book => "book",
            Action::LoadAppointments => "load_appointments",
            Action::CancelAppointment => "cancel_appointment",
            Action::LoadDashboard => "load_dashboard",
            Action::LoadProfile => "load_profile",
            Action::SaveProfile => "save_profile",
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self {
            Action::LoadServices => "Não foi possível carregar os serviços",
            Action::Book => "Não foi possível realizar o agendamento",
            Action::LoadAppointments => "Não foi possível carregar os agendamentos",
            Action::CancelAppointment => "Não foi possível cancelar o agendamento",
            Action::LoadDashboard => "Não foi possível carregar os dados do dashboard",
            Action::LoadProfile => "Não foi possível carregar o perfil",
            Action::SaveProfile => "Não foi possível salvar as alterações",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Rejected before any backend call; the message is shown to the user.
    #[error("{0}")]
    Validation(String),

    /// The cause is logged, never sent to the client.
    #[error("{}", .action.failure_message())]
    Backend {
        action: Action,
        cause: anyhow::Error,
    },

    #[error("{0}")]
    NotFound(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn backend(action: Action, cause: anyhow::Error) -> Self {
        tracing::error!(action = action.as_str(), error = %format!("{cause:#}"), "backend call failed");
        AppError::Backend { action, cause }
    }

    pub fn validation(message: &str) -> Self {
        AppError::Validation(message.to_string())
    }

    pub fn notice(&self) -> Notice {
        match self {
            AppError::Unauthorized => Notice::error("Sessão expirada, entre novamente"),
            AppError::Config(_) => Notice::error("Serviço indisponível"),
            other => Notice::error(&other.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "rejected request body");
        AppError::validation("Dados inválidos")
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Backend { .. } => StatusCode::BAD_GATEWAY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, axum::Json(self.notice())).into_response()
    }
}
