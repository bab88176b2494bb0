pub mod appointment;
pub mod notice;
pub mod profile;
pub mod service;

pub use appointment::{
    status_badge, Appointment, AppointmentStatus, AppointmentWithService, BadgeColor,
    NewAppointment,
};
pub use notice::{Notice, NoticeVariant};
pub use profile::{Profile, ProfileUpdate};
pub use service::{Service, ServiceSummary};
