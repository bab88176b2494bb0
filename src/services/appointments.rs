use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use serde_json::json;

use crate::backend::{eq, from_row, to_row, Backend, Query, Table};
use crate::errors::{Action, AppError};
use crate::models::{
    status_badge, Appointment, AppointmentStatus, AppointmentWithService, BadgeColor, Notice,
};
use crate::services::format::{clock_time, format_duration, format_price, long_date, to_local};

pub const SERVICE_NOT_FOUND: &str = "Serviço não encontrado";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AppointmentCard {
    pub id: String,
    pub appointment_date: DateTime<Utc>,
    pub service_name: String,
    pub service_description: Option<String>,
    pub date: String,
    pub time: String,
    pub duration: String,
    pub price: String,
    pub notes: Option<String>,
    pub status: String,
    pub status_label: String,
    pub status_color: BadgeColor,
    pub can_cancel: bool,
    pub can_reschedule: bool,
}

impl AppointmentCard {
    pub fn new(appointment: &AppointmentWithService, now: DateTime<Utc>, offset: FixedOffset) -> Self {
        let service = appointment.service.clone().unwrap_or_default();
        let local = to_local(appointment.appointment_date, offset);
        let (status_label, status_color) = status_badge(&appointment.status);

        Self {
            id: appointment.id.clone(),
            appointment_date: appointment.appointment_date,
            service_name: service
                .name
                .unwrap_or_else(|| SERVICE_NOT_FOUND.to_string()),
            service_description: service.description,
            date: long_date(local.date()),
            time: clock_time(local.time()),
            duration: format_duration(service.duration.unwrap_or(0)),
            price: format_price(service.price.unwrap_or(0.0)),
            notes: appointment.notes.clone(),
            status: appointment.status.clone(),
            status_label,
            status_color,
            can_cancel: appointment.can_cancel(now),
            can_reschedule: appointment.can_reschedule(),
        }
    }
}

/// The user's appointments, earliest first, each joined with the requested service columns.
pub async fn fetch_for_user(
    backend: &dyn Backend,
    user_id: &str,
    columns: &[&'static str],
    service_columns: &[&'static str],
    action: Action,
) -> Result<Vec<AppointmentWithService>, AppError> {
    let query = Query::table(Table::Appointments)
        .columns(columns)
        .embed("service", "service_id", Table::Services, service_columns)
        .eq("user_id", user_id)
        .order("appointment_date", true);

    let rows = backend
        .select(&query)
        .await
        .map_err(|e| AppError::backend(action, e))?;

    rows.into_iter()
        .map(from_row)
        .collect::<anyhow::Result<Vec<AppointmentWithService>>>()
        .map_err(|e| AppError::backend(action, e))
}

pub async fn list_appointments(
    backend: &dyn Backend,
    user_id: &str,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Result<Vec<AppointmentCard>, AppError> {
    let appointments = fetch_for_user(
        backend,
        user_id,
        &["id", "appointment_date", "notes", "status"],
        &["name", "description", "price", "duration"],
        Action::LoadAppointments,
    )
    .await?;

    Ok(appointments
        .iter()
        .map(|a| AppointmentCard::new(a, now, offset))
        .collect())
}

/// Cancels one of the user's own appointments if it is still inside the cancellation rules.
/// The update is filtered by both the appointment and its owner.
pub async fn cancel_appointment(
    backend: &dyn Backend,
    user_id: &str,
    appointment_id: &str,
    now: DateTime<Utc>,
) -> Result<Notice, AppError> {
    let action = Action::CancelAppointment;
    let filters = [eq("id", appointment_id), eq("user_id", user_id)];

    let query = Query::table(Table::Appointments)
        .eq("id", appointment_id)
        .eq("user_id", user_id);
    let appointment: Appointment = match backend
        .select(&query)
        .await
        .map_err(|e| AppError::backend(action, e))?
        .into_iter()
        .next()
    {
        Some(row) => from_row(row).map_err(|e| AppError::backend(action, e))?,
        None => return Err(AppError::NotFound("Agendamento não encontrado".to_string())),
    };

    if !appointment.can_cancel(now) {
        return Err(AppError::validation(
            "Só é possível cancelar agendamentos pendentes com mais de 2 horas de antecedência",
        ));
    }

    let changes = to_row(&json!({ "status": AppointmentStatus::Cancelled.as_str() }))
        .map_err(|e| AppError::backend(action, e))?;
    let touched = backend
        .update(Table::Appointments, changes, &filters)
        .await
        .map_err(|e| AppError::backend(action, e))?;

    if touched == 0 {
        return Err(AppError::NotFound("Agendamento não encontrado".to_string()));
    }

    tracing::info!(appointment_id, user_id, "appointment cancelled");

    Ok(Notice::success(
        "Agendamento cancelado",
        "Seu agendamento foi cancelado com sucesso",
    ))
}
