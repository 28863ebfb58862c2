//! SubmitOutcome - tri-state result of one third-party call.

/// Result of one submitter call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The service accepted the payload
    Success,

    /// The service answered with an explicit rate-limit response
    RateLimited,

    /// Any other failure, with detail for the operator
    Error(String),
}

impl SubmitOutcome {
    /// Shorthand for an error outcome
    pub fn error(detail: impl Into<String>) -> Self {
        Self::Error(detail.into())
    }

    /// Whether the payload was accepted
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}
