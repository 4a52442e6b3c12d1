//! Legal request status transitions.
//!
//! The field-execution path only moves one step at a time:
//! `IN_PROGRESS -> MOVING -> ARRIVED -> RESCUING -> COMPLETED`. Nothing
//! returns to `PENDING` or `VERIFIED`, and nothing leaves a terminal status.

use flood_core::{FloodError, FloodResult, RequestStatus};

/// The single status a field-execution request may move to next.
pub fn next_field_status(from: RequestStatus) -> Option<RequestStatus> {
    match from {
        RequestStatus::InProgress => Some(RequestStatus::Moving),
        RequestStatus::Moving => Some(RequestStatus::Arrived),
        RequestStatus::Arrived => Some(RequestStatus::Rescuing),
        RequestStatus::Rescuing => Some(RequestStatus::Completed),
        _ => None,
    }
}

pub fn check_verify(from: RequestStatus) -> FloodResult<()> {
    if from == RequestStatus::Pending {
        Ok(())
    } else {
        Err(FloodError::illegal(from, RequestStatus::Verified, None))
    }
}

/// Assignment puts the request into `IN_PROGRESS` from any live status.
pub fn check_assign(from: RequestStatus) -> FloodResult<()> {
    if from.is_terminal() {
        Err(FloodError::illegal(from, RequestStatus::InProgress, None))
    } else {
        Ok(())
    }
}

pub fn check_progress(from: RequestStatus, requested: RequestStatus) -> FloodResult<()> {
    match next_field_status(from) {
        Some(next) if next == requested => Ok(()),
        expected => Err(FloodError::illegal(from, requested, expected)),
    }
}

/// Outcome of a citizen confirmation against the current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// Already closed; only feedback is recorded.
    FeedbackOnly,
    /// Field work is under way; confirmation completes the request.
    Complete,
}

pub fn check_confirm(from: RequestStatus) -> FloodResult<Confirmation> {
    if from == RequestStatus::Completed {
        Ok(Confirmation::FeedbackOnly)
    } else if from.is_field_execution() {
        Ok(Confirmation::Complete)
    } else {
        Err(FloodError::illegal(from, RequestStatus::Completed, None))
    }
}

pub fn check_cancel(from: RequestStatus) -> FloodResult<()> {
    if from.is_terminal() {
        Err(FloodError::illegal(from, RequestStatus::Cancelled, None))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELD_EDGES: [(RequestStatus, RequestStatus); 4] = [
        (RequestStatus::InProgress, RequestStatus::Moving),
        (RequestStatus::Moving, RequestStatus::Arrived),
        (RequestStatus::Arrived, RequestStatus::Rescuing),
        (RequestStatus::Rescuing, RequestStatus::Completed),
    ];

    #[test]
    fn progress_accepts_exactly_the_field_edges() {
        for from in RequestStatus::ALL {
            for to in RequestStatus::ALL {
                let legal = FIELD_EDGES.contains(&(from, to));
                assert_eq!(check_progress(from, to).is_ok(), legal, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn skipping_a_step_names_the_expected_status() {
        let err = check_progress(RequestStatus::InProgress, RequestStatus::Rescuing).unwrap_err();
        assert_eq!(
            err,
            FloodError::IllegalTransition {
                from: RequestStatus::InProgress,
                requested: RequestStatus::Rescuing,
                expected: Some(RequestStatus::Moving),
            }
        );
        assert!(err.to_string().contains("expected next status: MOVING"));
    }

    #[test]
    fn waiting_statuses_have_no_progress_edge() {
        let err = check_progress(RequestStatus::Verified, RequestStatus::InProgress).unwrap_err();
        assert!(matches!(
            err,
            FloodError::IllegalTransition { expected: None, .. }
        ));
    }

    #[test]
    fn verification_only_from_pending() {
        assert!(check_verify(RequestStatus::Pending).is_ok());
        for from in RequestStatus::ALL
            .into_iter()
            .filter(|status| *status != RequestStatus::Pending)
        {
            assert!(check_verify(from).is_err(), "{from}");
        }
    }

    #[test]
    fn terminal_statuses_are_final() {
        for from in [RequestStatus::Completed, RequestStatus::Cancelled] {
            assert!(check_assign(from).is_err());
            assert!(check_cancel(from).is_err());
            for to in RequestStatus::ALL {
                assert!(check_progress(from, to).is_err());
            }
        }
    }

    #[test]
    fn confirmation_paths() {
        assert_eq!(
            check_confirm(RequestStatus::Completed),
            Ok(Confirmation::FeedbackOnly)
        );
        assert_eq!(
            check_confirm(RequestStatus::Arrived),
            Ok(Confirmation::Complete)
        );
        assert!(check_confirm(RequestStatus::Pending).is_err());
        assert!(check_confirm(RequestStatus::Verified).is_err());
        assert!(check_confirm(RequestStatus::Cancelled).is_err());
    }
}
