use crate::domain::RequestStatus;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidInput,
    NotFound,
    IllegalTransition,
    ResourceUnavailable,
    InsufficientStock,
    Forbidden,
    Unauthorized,
    Conflict,
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::NotFound => "not_found",
            Self::IllegalTransition => "illegal_transition",
            Self::ResourceUnavailable => "resource_unavailable",
            Self::InsufficientStock => "insufficient_stock",
            Self::Forbidden => "forbidden",
            Self::Unauthorized => "unauthorized",
            Self::Conflict => "conflict",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Team,
    Vehicle,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Team => f.write_str("rescue team"),
            Self::Vehicle => f.write_str("vehicle"),
        }
    }
}

/// Every failure the dispatch core reports. All of them are recoverable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FloodError {
    #[error("{entity} {key} not found")]
    NotFound { entity: &'static str, key: String },

    #[error("request cannot move from {from} to {requested}{hint}", hint = expected_hint(.expected))]
    IllegalTransition {
        from: RequestStatus,
        requested: RequestStatus,
        expected: Option<RequestStatus>,
    },

    #[error("{kind} '{name}' is not available (current status: {status})")]
    ResourceUnavailable {
        kind: ResourceKind,
        name: String,
        status: String,
    },

    #[error("not enough stock of '{supply}': requested {requested}, available {available}")]
    InsufficientStock {
        supply: String,
        requested: u32,
        available: u32,
    },

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl FloodError {
    pub fn not_found(entity: &'static str, key: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn illegal(
        from: RequestStatus,
        requested: RequestStatus,
        expected: Option<RequestStatus>,
    ) -> Self {
        Self::IllegalTransition {
            from,
            requested,
            expected,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::IllegalTransition { .. } => ErrorCode::IllegalTransition,
            Self::ResourceUnavailable { .. } => ErrorCode::ResourceUnavailable,
            Self::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            Self::Forbidden(_) => ErrorCode::Forbidden,
            Self::Unauthorized(_) => ErrorCode::Unauthorized,
            Self::Conflict(_) => ErrorCode::Conflict,
            Self::InvalidInput(_) => ErrorCode::InvalidInput,
            Self::Internal(_) => ErrorCode::Internal,
        }
    }
}

fn expected_hint(expected: &Option<RequestStatus>) -> String {
    match expected {
        Some(next) => format!(" (expected next status: {next})"),
        None => String::new(),
    }
}

pub type FloodResult<T> = Result<T, FloodError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn illegal_transition_names_expected_status() {
        let err = FloodError::illegal(
            RequestStatus::InProgress,
            RequestStatus::Rescuing,
            Some(RequestStatus::Moving),
        );
        assert_eq!(err.code(), ErrorCode::IllegalTransition);
        assert_eq!(
            err.to_string(),
            "request cannot move from IN_PROGRESS to RESCUING (expected next status: MOVING)"
        );
    }

    #[test]
    fn unavailable_resource_names_status() {
        let err = FloodError::ResourceUnavailable {
            kind: ResourceKind::Team,
            name: "Alpha".to_string(),
            status: "OFF_DUTY".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "rescue team 'Alpha' is not available (current status: OFF_DUTY)"
        );
    }
}
