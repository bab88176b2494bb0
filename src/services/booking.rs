use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::backend::{from_row, to_row, Backend, Table};
use crate::errors::{Action, AppError};
use crate::models::{Appointment, AppointmentStatus, NewAppointment, Notice};
use crate::services::catalog::{list_services, ServiceCard};
use crate::services::format::clock_time;

const FIRST_SLOT_MINUTES: u32 = 8 * 60;
const LAST_SLOT_MINUTES: u32 = 18 * 60;
const SLOT_STEP_MINUTES: usize = 30;

/// Half-hour slots from 08:00 through 18:00, the same for every date.
pub fn time_slots() -> Vec<NaiveTime> {
    (FIRST_SLOT_MINUTES..=LAST_SLOT_MINUTES)
        .step_by(SLOT_STEP_MINUTES)
        .filter_map(|m| NaiveTime::from_num_seconds_from_midnight_opt(m * 60, 0))
        .collect()
}

pub fn slot_labels() -> Vec<String> {
    time_slots().into_iter().map(clock_time).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingRequest {
    #[serde(default)]
    pub service_id: String,
    /// `YYYY-MM-DD`, on the shop's wall clock.
    #[serde(default)]
    pub date: String,
    /// `HH:MM`, one of [`time_slots`], on the shop's wall clock.
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BookingForm {
    pub services: Vec<ServiceCard>,
    pub selected_service: Option<ServiceCard>,
    pub time_slots: Vec<String>,
    /// Earliest selectable date (today), `YYYY-MM-DD`.
    pub min_date: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Booked {
    pub appointment: Appointment,
    pub notice: Notice,
}

pub async fn booking_form(
    backend: &dyn Backend,
    preselected_service_id: Option<&str>,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Result<BookingForm, AppError> {
    let services = list_services(backend).await?;
    let selected_service = preselected_service_id
        .and_then(|id| services.iter().find(|s| s.id == id))
        .map(ServiceCard::from);

    Ok(BookingForm {
        services: services.iter().map(ServiceCard::from).collect(),
        selected_service,
        time_slots: slot_labels(),
        min_date: now.with_timezone(&offset).date_naive().format("%Y-%m-%d").to_string(),
    })
}

/// Reads a wall-clock date and slot time in `offset` and returns the instant it denotes.
/// Times outside the fixed slot list are rejected.
pub fn compose_date_time(
    date: &str,
    time: &str,
    offset: FixedOffset,
) -> Result<DateTime<Utc>, AppError> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation("Data inválida"))?;
    let time = NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .map_err(|_| AppError::validation("Horário inválido"))?;
    if !time_slots().contains(&time) {
        return Err(AppError::validation("Horário inválido"));
    }

    offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| AppError::validation("Data inválida"))
}

/// Checks a request without touching the backend; returns the appointment instant.
pub fn validate_request(
    request: &BookingRequest,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Result<DateTime<Utc>, AppError> {
    if request.service_id.trim().is_empty() {
        return Err(AppError::validation("Selecione um serviço"));
    }

    let appointment_date = compose_date_time(&request.date, &request.time, offset)?;
    if appointment_date <= now {
        return Err(AppError::validation(
            "A data do agendamento deve ser no futuro",
        ));
    }

    Ok(appointment_date)
}

// TODO: reject a slot already taken for the same service once the backend exposes availability.
pub async fn book(
    backend: &dyn Backend,
    user_id: &str,
    request: BookingRequest,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Result<Booked, AppError> {
    let appointment_date = validate_request(&request, now, offset)?;

    let new = NewAppointment {
        user_id: user_id.to_string(),
        service_id: request.service_id.trim().to_string(),
        appointment_date,
        notes: request
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
        status: AppointmentStatus::Pending,
    };

    let record = to_row(&new).map_err(|e| AppError::backend(Action::Book, e))?;
    let row = backend
        .insert(Table::Appointments, record)
        .await
        .map_err(|e| AppError::backend(Action::Book, e))?;
    let appointment: Appointment =
        from_row(row).map_err(|e| AppError::backend(Action::Book, e))?;

    tracing::info!(
        appointment_id = %appointment.id,
        user_id,
        service_id = %appointment.service_id,
        "appointment booked"
    );

    Ok(Booked {
        appointment,
        notice: Notice::success(
            "Agendamento realizado!",
            "Seu agendamento foi criado com sucesso",
        ),
    })
}
