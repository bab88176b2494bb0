use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

use crate::backend::Backend;
use crate::errors::{Action, AppError};
use crate::models::{AppointmentStatus, AppointmentWithService};
use crate::services::appointments::{fetch_for_user, SERVICE_NOT_FOUND};
use crate::services::format::{format_price, long_date_time, to_local};

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub total_appointments: usize,
    pub pending_appointments: usize,
    pub next_appointment: Option<AppointmentWithService>,
}

/// Counts plus the earliest appointment still ahead of `now` that is not cancelled.
pub fn summarize(appointments: Vec<AppointmentWithService>, now: DateTime<Utc>) -> DashboardStats {
    let pending_appointments = appointments
        .iter()
        .filter(|a| a.status() == Some(AppointmentStatus::Pending))
        .count();
    let total_appointments = appointments.len();

    let next_appointment = appointments
        .into_iter()
        .filter(|a| {
            a.appointment_date > now && a.status() != Some(AppointmentStatus::Cancelled)
        })
        .min_by_key(|a| a.appointment_date);

    DashboardStats {
        total_appointments,
        pending_appointments,
        next_appointment,
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NextAppointment {
    pub id: String,
    pub service_name: String,
    pub price: String,
    pub when: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardView {
    pub greeting: Option<String>,
    pub total_appointments: usize,
    pub pending_appointments: usize,
    pub next_appointment: Option<NextAppointment>,
}

/// `"Olá, joao!"` for `joao@example.com`.
pub fn greeting(email: Option<&str>) -> Option<String> {
    let name = email?.split('@').next()?.trim();
    if name.is_empty() {
        return None;
    }
    Some(format!("Olá, {name}!"))
}

pub async fn load_dashboard(
    backend: &dyn Backend,
    user_id: &str,
    email: Option<&str>,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Result<DashboardView, AppError> {
    let appointments = fetch_for_user(
        backend,
        user_id,
        &["id", "appointment_date", "status"],
        &["name", "price"],
        Action::LoadDashboard,
    )
    .await?;

    let stats = summarize(appointments, now);
    let next_appointment = stats.next_appointment.map(|a| {
        let service = a.service.unwrap_or_default();
        NextAppointment {
            id: a.id,
            service_name: service
                .name
                .unwrap_or_else(|| SERVICE_NOT_FOUND.to_string()),
            price: format_price(service.price.unwrap_or(0.0)),
            when: long_date_time(to_local(a.appointment_date, offset)),
        }
    });

    Ok(DashboardView {
        greeting: greeting(email),
        total_appointments: stats.total_appointments,
        pending_appointments: stats.pending_appointments,
        next_appointment,
    })
}
