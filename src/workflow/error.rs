//! Workflow error taxonomy.

use crate::integrations::ServiceError;

/// A local precondition violation. Never reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("There is no draft to schedule. Generate a post first.")]
    EmptyContent,

    #[error("Pick a schedule time before scheduling.")]
    MissingScheduleTime,

    #[error("Unrecognized schedule time '{0}'. Use YYYY-MM-DDTHH:MM.")]
    UnparseableScheduleTime(String),

    #[error("Schedule time '{0}' is in the past.")]
    TimeInPast(String),

    #[error("Profile belongs to '{profile}' but the session user is '{session}'.")]
    IdentityMismatch { profile: String, session: String },
}

/// Errors surfaced by the post workflow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    /// Local validation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The generation request failed.
    #[error("Post generation failed: {0}")]
    Generation(String),

    /// The scheduling request failed.
    #[error("Scheduling failed: {0}")]
    Scheduling(String),

    /// The action is not legal in the current state.
    #[error("Cannot {action} while {state}")]
    InvalidTransition { action: &'static str, state: &'static str },
}

impl WorkflowError {
    /// Convert a failed generation call.
    pub fn generation(err: &ServiceError) -> Self {
        Self::Generation(err.to_string())
    }

    /// Convert a failed scheduling call.
    pub fn scheduling(err: &ServiceError) -> Self {
        Self::Scheduling(err.to_string())
    }

    /// Short name of the error kind.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Generation(_) => "generation",
            Self::Scheduling(_) => "scheduling",
            Self::InvalidTransition { .. } => "transition",
        }
    }

    /// Title used when the error is shown to the user.
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Check your input",
            Self::Generation(_) => "Generation failed",
            Self::Scheduling(_) => "Scheduling failed",
            Self::InvalidTransition { .. } => "Not now",
        }
    }
}
