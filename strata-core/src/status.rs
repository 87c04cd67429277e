//! Step status state machine.
//!
//! A step's status is only ever changed by applying the result of its action
//! function; the walker never invents a transition on its own.

use std::fmt;

/// Lifecycle status of one unit of work in a plan.
///
/// `Pending` and `Submitted` are the only non-terminal states. `DoesNotExist`
/// is a destroy-specific terminal success: the remote object was already
/// absent before this run touched it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Not yet attempted.
    Pending,
    /// One asynchronous remote operation issued, awaiting convergence.
    Submitted(String),
    /// Terminal success.
    Complete(String),
    /// Terminal failure; never retried by the walker.
    Failed(String),
    /// Terminal; counted as non-blocking for dependents.
    Skipped(String),
    /// Terminal; produced by cancellation.
    Interrupted(String),
    /// Terminal success: the remote object was already absent.
    DoesNotExist(String),
}

impl Status {
    /// `DoesNotExist` with the standard reason.
    pub fn does_not_exist() -> Self {
        Status::DoesNotExist("stack does not exist".to_string())
    }

    /// Whether the status is terminal (the walker stops invoking the action).
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Status::Pending | Status::Submitted(_))
    }

    /// Whether the status unblocks dependents.
    ///
    /// Complete, Skipped and DoesNotExist all count as success for dependency
    /// resolution.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Status::Complete(_) | Status::Skipped(_) | Status::DoesNotExist(_)
        )
    }

    /// Whether the status is a terminal failure.
    pub fn is_failed(&self) -> bool {
        matches!(self, Status::Failed(_))
    }

    /// Whether the step was cut short by cancellation.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Status::Interrupted(_))
    }

    /// Short name for display and logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Submitted(_) => "submitted",
            Status::Complete(_) => "complete",
            Status::Failed(_) => "failed",
            Status::Skipped(_) => "skipped",
            Status::Interrupted(_) => "interrupted",
            Status::DoesNotExist(_) => "does not exist",
        }
    }

    /// Reason string carried by the status, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Status::Pending => None,
            Status::Submitted(r)
            | Status::Complete(r)
            | Status::Failed(r)
            | Status::Skipped(r)
            | Status::Interrupted(r)
            | Status::DoesNotExist(r) => Some(r),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason() {
            Some(reason) if !reason.is_empty() => write!(f, "{} ({})", self.as_str(), reason),
            _ => write!(f, "{}", self.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!Status::Pending.is_terminal());
        assert!(!Status::Submitted("polling".into()).is_terminal());
        assert!(Status::Complete("done".into()).is_terminal());
        assert!(Status::Failed("boom".into()).is_terminal());
        assert!(Status::Skipped("dep failed".into()).is_terminal());
        assert!(Status::Interrupted("cancelled".into()).is_terminal());
        assert!(Status::does_not_exist().is_terminal());
    }

    #[test]
    fn test_success_states() {
        assert!(Status::Complete("done".into()).is_success());
        assert!(Status::Skipped("dep failed".into()).is_success());
        assert!(Status::does_not_exist().is_success());
        assert!(!Status::Failed("boom".into()).is_success());
        assert!(!Status::Interrupted("cancelled".into()).is_success());
        assert!(!Status::Pending.is_success());
    }

    #[test]
    fn test_display() {
        assert_eq!(Status::Pending.to_string(), "pending");
        assert_eq!(
            Status::Complete("stack destroyed".into()).to_string(),
            "complete (stack destroyed)"
        );
    }
}
