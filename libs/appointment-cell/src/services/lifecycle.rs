use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, warn};

use crate::models::{AppointmentError, AppointmentStatus};

/// Server-side gatekeeper for the appointment status machine. The original
/// application left these rules to its clients; here every mutation goes
/// through `validate_transition` first.
pub struct AppointmentLifecycleService;

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_transition(
        &self,
        current: AppointmentStatus,
        next: AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        debug!("Validating status transition {} -> {}", current, next);

        if !self.valid_transitions(current).contains(&next) {
            warn!("Rejected status transition {} -> {}", current, next);
            return Err(AppointmentError::InvalidStatusTransition {
                from: current,
                to: next,
            });
        }

        Ok(())
    }

    /// Allowed next statuses. `Pending` as a target from a confirmed state
    /// is the reschedule path; `Approved` is a legacy synonym of
    /// `Confirmed` and is treated identically.
    pub fn valid_transitions(&self, current: AppointmentStatus) -> Vec<AppointmentStatus> {
        match current {
            AppointmentStatus::Pending => vec![
                AppointmentStatus::Confirmed,
                AppointmentStatus::Cancelled,
                AppointmentStatus::Pending,
            ],
            AppointmentStatus::Confirmed | AppointmentStatus::Approved => vec![
                AppointmentStatus::Completed,
                AppointmentStatus::Cancelled,
                AppointmentStatus::Pending,
            ],
            AppointmentStatus::Cancelled | AppointmentStatus::Completed => vec![],
        }
    }

    pub fn can_reschedule(&self, current: AppointmentStatus) -> bool {
        !current.is_terminal()
    }

    /// Slots must lie in the future at the time the request is handled.
    pub fn validate_slot(
        &self,
        date: NaiveDate,
        time: NaiveTime,
        now: NaiveDateTime,
    ) -> Result<(), AppointmentError> {
        let slot = date.and_time(time);
        if slot <= now {
            return Err(AppointmentError::InvalidTime(
                "Appointment must be scheduled for a future time".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for AppointmentLifecycleService {
    fn default() -> Self {
        Self::new()
    }
}
