use tracing::{debug, warn};

use shared_models::scheduling::AppointmentStatus;

use crate::models::AppointmentError;

pub struct AppointmentLifecycleService;

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// Rejects any move the transition table does not list.
    pub fn validate_status_transition(
        &self,
        current_status: AppointmentStatus,
        new_status: AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        debug!("Validating status transition from {} to {}", current_status, new_status);

        if !self.get_valid_transitions(current_status).contains(&new_status) {
            warn!("Invalid status transition attempted: {} -> {}", current_status, new_status);
            return Err(AppointmentError::InvalidStatusTransition {
                from: current_status,
                to: new_status,
            });
        }

        Ok(())
    }

    pub fn get_valid_transitions(&self, current_status: AppointmentStatus) -> Vec<AppointmentStatus> {
        match current_status {
            AppointmentStatus::Pending => vec![
                AppointmentStatus::Approved,
                AppointmentStatus::Rejected,
                AppointmentStatus::Cancelled,
            ],
            AppointmentStatus::Approved => vec![
                AppointmentStatus::Completed,
                AppointmentStatus::Rescheduled,
                AppointmentStatus::Cancelled,
            ],
            AppointmentStatus::Rescheduled => vec![
                AppointmentStatus::Completed,
                AppointmentStatus::Rescheduled,
                AppointmentStatus::Cancelled,
            ],
            // Terminal states
            AppointmentStatus::Completed
            | AppointmentStatus::Rejected
            | AppointmentStatus::Cancelled => vec![],
        }
    }

    /// Status a reschedule leaves behind. Keeping the current status is allowed
    /// for any live appointment, so a pending slot can move without approval.
    pub fn resolve_reschedule_status(
        &self,
        current_status: AppointmentStatus,
        requested: Option<AppointmentStatus>,
    ) -> Result<AppointmentStatus, AppointmentError> {
        let target = requested.unwrap_or(AppointmentStatus::Rescheduled);

        if target == current_status {
            if current_status.is_terminal() {
                warn!("Reschedule attempted on {} appointment", current_status);
                return Err(AppointmentError::InvalidStatusTransition {
                    from: current_status,
                    to: target,
                });
            }
            return Ok(target);
        }
        if current_status == AppointmentStatus::Pending && target == AppointmentStatus::Rescheduled {
            return Err(AppointmentError::AwaitingApproval);
        }

        self.validate_status_transition(current_status, target)?;
        Ok(target)
    }
}

impl Default for AppointmentLifecycleService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use shared_models::scheduling::AppointmentStatus::*;

    #[test]
    fn pending_can_be_approved_rejected_or_cancelled() {
        let lifecycle = AppointmentLifecycleService::new();
        assert!(lifecycle.validate_status_transition(Pending, Approved).is_ok());
        assert!(lifecycle.validate_status_transition(Pending, Rejected).is_ok());
        assert!(lifecycle.validate_status_transition(Pending, Cancelled).is_ok());
        assert_matches!(
            lifecycle.validate_status_transition(Pending, Completed),
            Err(AppointmentError::InvalidStatusTransition { from: Pending, to: Completed })
        );
    }

    #[test]
    fn terminal_states_do_not_move() {
        let lifecycle = AppointmentLifecycleService::new();
        for terminal in [Completed, Rejected, Cancelled] {
            assert!(lifecycle.get_valid_transitions(terminal).is_empty());
            assert!(lifecycle.validate_status_transition(terminal, Approved).is_err());
        }
        assert!(lifecycle.validate_status_transition(Rejected, Completed).is_err());
    }

    #[test]
    fn reschedule_defaults_to_rescheduled() {
        let lifecycle = AppointmentLifecycleService::new();
        assert_eq!(lifecycle.resolve_reschedule_status(Approved, None).unwrap(), Rescheduled);
        assert_eq!(lifecycle.resolve_reschedule_status(Rescheduled, None).unwrap(), Rescheduled);
        assert_matches!(
            lifecycle.resolve_reschedule_status(Pending, None),
            Err(AppointmentError::AwaitingApproval)
        );
    }

    #[test]
    fn reschedule_may_keep_a_live_status() {
        let lifecycle = AppointmentLifecycleService::new();
        assert_eq!(lifecycle.resolve_reschedule_status(Pending, Some(Pending)).unwrap(), Pending);
        assert_eq!(lifecycle.resolve_reschedule_status(Approved, Some(Approved)).unwrap(), Approved);
        assert!(lifecycle.resolve_reschedule_status(Cancelled, Some(Cancelled)).is_err());
        assert!(lifecycle.resolve_reschedule_status(Completed, None).is_err());
    }
}
