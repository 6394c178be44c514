use super::status::RequestStatus;

/// Rejections raised by the request workflow. None of them leave partial effects.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Invalid transition: {0}")]
    InvalidTransition(TransitionRejection),
    #[error("Date field '{0}' cannot be assigned")]
    InvalidField(String),
    #[error("'{0}' is not a valid ISO date (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("Date out of range: {0}")]
    DateOutOfRange(DateRangeViolation),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionRejection {
    #[error("no changes are permitted once the request is closed")]
    Closed,
    #[error("a reason is mandatory when rejecting")]
    MissingReason,
    #[error("transition from {from} to {to} is not permitted")]
    NotPermitted {
        from: RequestStatus,
        to: RequestStatus,
    },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DateRangeViolation {
    #[error("{field} cannot precede creation date")]
    BeforeCreation { field: &'static str },
    #[error("submission cannot precede reception")]
    SubmissionBeforeReception,
}

/// Failures of the persistence layer, independent of the workflow rules.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Request not found: {0}")]
    RequestNotFound(String),
    #[error("A request with code '{0}' already exists")]
    DuplicateCode(String),
    #[error("Request '{0}' was modified concurrently, reload and retry")]
    ConcurrentModification(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown request status '{0}'")]
pub struct UnknownStatus(pub String);
