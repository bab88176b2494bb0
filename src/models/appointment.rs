use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::ServiceSummary;

/// How long before its start a pending appointment can still be cancelled.
pub const CANCELLATION_WINDOW_HOURS: i64 = 2;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: String,
    pub user_id: String,
    pub service_id: String,
    pub appointment_date: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Kept verbatim: staff tooling may write values outside `AppointmentStatus`.
    pub status: String,
}

impl Appointment {
    pub fn status(&self) -> Option<AppointmentStatus> {
        AppointmentStatus::parse(&self.status)
    }

    pub fn can_cancel(&self, now: DateTime<Utc>) -> bool {
        cancellation_allowed(self.status(), self.appointment_date, now)
    }
}

/// An appointment as listed to its owner, with the referenced service when it still exists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentWithService {
    pub id: String,
    pub appointment_date: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
    pub status: String,
    #[serde(default)]
    pub service: Option<ServiceSummary>,
}

impl AppointmentWithService {
    pub fn status(&self) -> Option<AppointmentStatus> {
        AppointmentStatus::parse(&self.status)
    }

    pub fn can_cancel(&self, now: DateTime<Utc>) -> bool {
        cancellation_allowed(self.status(), self.appointment_date, now)
    }

    pub fn can_reschedule(&self) -> bool {
        self.status() == Some(AppointmentStatus::Pending)
    }
}

/// Pending, and strictly more than the cancellation window away from `now`.
pub fn cancellation_allowed(
    status: Option<AppointmentStatus>,
    appointment_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> bool {
    status == Some(AppointmentStatus::Pending)
        && appointment_date - now > Duration::hours(CANCELLATION_WINDOW_HOURS)
}

#[derive(Debug, Clone, Serialize)]
pub struct NewAppointment {
    pub user_id: String,
    pub service_id: String,
    pub appointment_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BadgeColor {
    Yellow,
    Green,
    Red,
    Blue,
    Gray,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(AppointmentStatus::Pending),
            "confirmed" => Some(AppointmentStatus::Confirmed),
            "cancelled" => Some(AppointmentStatus::Cancelled),
            "completed" => Some(AppointmentStatus::Completed),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "Pendente",
            AppointmentStatus::Confirmed => "Confirmado",
            AppointmentStatus::Cancelled => "Cancelado",
            AppointmentStatus::Completed => "Concluído",
        }
    }

    pub fn color(&self) -> BadgeColor {
        match self {
            AppointmentStatus::Pending => BadgeColor::Yellow,
            AppointmentStatus::Confirmed => BadgeColor::Green,
            AppointmentStatus::Cancelled => BadgeColor::Red,
            AppointmentStatus::Completed => BadgeColor::Blue,
        }
    }
}

/// Label and color for a raw status; unrecognised values show as-is in gray.
pub fn status_badge(raw: &str) -> (String, BadgeColor) {
    match AppointmentStatus::parse(raw) {
        Some(status) => (status.label().to_string(), status.color()),
        None => (raw.to_string(), BadgeColor::Gray),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_status_round_trip_names() {
        for status in [
            AppointmentStatus::Pending,
            AppointmentStatus::Confirmed,
            AppointmentStatus::Cancelled,
            AppointmentStatus::Completed,
        ] {
            assert_eq!(AppointmentStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(AppointmentStatus::parse("no_show"), None);
    }

    #[test]
    fn test_status_badges() {
        assert_eq!(status_badge("pending"), ("Pendente".to_string(), BadgeColor::Yellow));
        assert_eq!(status_badge("confirmed"), ("Confirmado".to_string(), BadgeColor::Green));
        assert_eq!(status_badge("cancelled"), ("Cancelado".to_string(), BadgeColor::Red));
        assert_eq!(status_badge("completed"), ("Concluído".to_string(), BadgeColor::Blue));
        assert_eq!(status_badge("no_show"), ("no_show".to_string(), BadgeColor::Gray));
    }

    #[test]
    fn test_cancellation_window() {
        let pending = Some(AppointmentStatus::Pending);
        assert!(cancellation_allowed(pending, now() + Duration::hours(3), now()));
        assert!(cancellation_allowed(
            pending,
            now() + Duration::hours(2) + Duration::seconds(1),
            now()
        ));
        // exactly two hours away is not "more than" two hours
        assert!(!cancellation_allowed(pending, now() + Duration::hours(2), now()));
        assert!(!cancellation_allowed(pending, now() + Duration::hours(1), now()));
        assert!(!cancellation_allowed(pending, now() - Duration::hours(5), now()));
    }

    #[test]
    fn test_only_pending_can_be_cancelled() {
        let later = now() + Duration::days(3);
        for status in [
            Some(AppointmentStatus::Confirmed),
            Some(AppointmentStatus::Cancelled),
            Some(AppointmentStatus::Completed),
            None,
        ] {
            assert!(!cancellation_allowed(status, later, now()));
        }
    }

    #[test]
    fn test_deserialize_with_missing_service() {
        let json = r#"{"id":"a-1","appointment_date":"2026-10-19T13:00:00Z","notes":null,"status":"pending","service":null}"#;
        let appointment: AppointmentWithService = serde_json::from_str(json).unwrap();
        assert_eq!(appointment.service, None);
        assert!(appointment.can_reschedule());
        assert!(appointment.can_cancel(now()));
    }

    #[test]
    fn test_new_appointment_serializes_status_lowercase() {
        let new = NewAppointment {
            user_id: "u-1".to_string(),
            service_id: "s-1".to_string(),
            appointment_date: now(),
            notes: None,
            status: AppointmentStatus::Pending,
        };
        let value = serde_json::to_value(&new).unwrap();
        assert_eq!(value["status"], "pending");
        assert_eq!(value["appointment_date"], "2026-10-18T12:00:00Z");
    }
}
