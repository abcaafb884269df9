//! Workflow states.

use super::error::WorkflowError;
use super::request::{Draft, ScheduleRequest, ScheduleTime};

/// Where the session is in the generate/schedule cycle.
///
/// Each state carries exactly the data that is valid in it, so a draft
/// cannot be scheduled before it exists and a request cannot be pending
/// outside `Scheduling`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WorkflowState {
    /// Nothing in progress.
    #[default]
    Idle,

    /// A generation request is in flight.
    Generating {
        /// Draft that was live before this attempt, kept if it fails
        prior: Option<Draft>,
    },

    /// A draft is available for review, editing and scheduling.
    DraftReady {
        /// The live draft
        draft: Draft,
        /// Time picked by the user, if any
        scheduled_time: Option<String>,
    },

    /// A scheduling request is in flight.
    Scheduling {
        /// Draft being scheduled
        draft: Draft,
        /// The request on the wire
        request: ScheduleRequest,
    },

    /// The service confirmed the schedule.
    Scheduled {
        /// What was scheduled
        request: ScheduleRequest,
    },

    /// A collaborator call failed.
    Failed {
        /// What went wrong
        error: WorkflowError,
        /// Draft that survived the failure, if any
        draft: Option<Draft>,
    },
}

impl WorkflowState {
    /// Short lowercase name, used in logs and error messages.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Generating { .. } => "generating",
            Self::DraftReady { .. } => "draft ready",
            Self::Scheduling { .. } => "scheduling",
            Self::Scheduled { .. } => "scheduled",
            Self::Failed { .. } => "failed",
        }
    }

    /// The draft visible in this state, if any.
    pub fn draft(&self) -> Option<&Draft> {
        match self {
            Self::DraftReady { draft, .. } | Self::Scheduling { draft, .. } => Some(draft),
            Self::Generating { prior } => prior.as_ref(),
            Self::Failed { draft, .. } => draft.as_ref(),
            Self::Idle | Self::Scheduled { .. } => None,
        }
    }

    /// Whether a network request is outstanding.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Generating { .. } | Self::Scheduling { .. })
    }

    /// Whether `request_generate` is legal.
    pub fn can_generate(&self) -> bool {
        matches!(self, Self::Idle | Self::DraftReady { .. } | Self::Failed { .. })
    }

    /// Whether `acknowledge` moves the workflow somewhere.
    pub fn can_acknowledge(&self) -> bool {
        matches!(self, Self::Scheduled { .. } | Self::Failed { .. })
    }

    /// The confirmed schedule time, once scheduled.
    pub fn scheduled_at(&self) -> Option<&ScheduleTime> {
        match self {
            Self::Scheduled { request } => Some(&request.scheduled_time),
            _ => None,
        }
    }

    /// The failure, when in `Failed`.
    pub fn error(&self) -> Option<&WorkflowError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        assert_eq!(WorkflowState::default(), WorkflowState::Idle);
        assert_eq!(WorkflowState::Idle.name(), "idle");
    }

    #[test]
    fn test_draft_accessor() {
        let draft = Draft::new("hi");

        let state = WorkflowState::DraftReady { draft: draft.clone(), scheduled_time: None };
        assert_eq!(state.draft(), Some(&draft));

        let state = WorkflowState::Generating { prior: None };
        assert!(state.draft().is_none());

        let state = WorkflowState::Failed {
            error: WorkflowError::Scheduling("down".to_string()),
            draft: Some(draft.clone()),
        };
        assert_eq!(state.draft(), Some(&draft));
    }

    #[test]
    fn test_busy_states() {
        assert!(WorkflowState::Generating { prior: None }.is_busy());
        assert!(!WorkflowState::Idle.is_busy());
        assert!(!WorkflowState::Idle.can_acknowledge());
        assert!(!WorkflowState::Generating { prior: None }.can_generate());
    }
}
