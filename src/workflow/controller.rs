//! Post workflow controller.
//!
//! Drives one draft at a time through generate, review, schedule. Every
//! network round-trip is split into a `request_*` step, which validates
//! and moves into a busy state, and an `on_*` completion step. A second
//! request cannot start while the first is outstanding because the busy
//! states reject it.

use chrono::Local;

use super::error::{ValidationError, WorkflowError};
use super::request::{Draft, ScheduleRequest};
use super::state::WorkflowState;
use crate::core::{Notification, Profile, UserIdentity};
use crate::integrations::{ContentService, ScheduleConfirmation, ServiceError};

/// State machine for a single session's post.
#[derive(Debug)]
pub struct PostWorkflow {
    /// Session owner
    user: UserIdentity,

    /// Current state
    state: WorkflowState,

    /// Reject schedule times that are not in the future
    require_future: bool,

    /// Notifications not yet shown to the user
    notifications: Vec<Notification>,
}

impl PostWorkflow {
    /// Create an idle workflow for a user.
    pub fn new(user: UserIdentity) -> Self {
        Self { user, state: WorkflowState::Idle, require_future: false, notifications: Vec::new() }
    }

    /// Only accept schedule times in the future.
    pub fn with_require_future(mut self, require_future: bool) -> Self {
        self.require_future = require_future;
        self
    }

    /// The session user.
    pub fn user(&self) -> &UserIdentity {
        &self.user
    }

    /// The current state.
    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// The live draft, if any.
    pub fn draft(&self) -> Option<&Draft> {
        self.state.draft()
    }

    /// Drain queued notifications.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    fn transition(&mut self, next: WorkflowState) {
        tracing::debug!(
            user = %self.user,
            from = self.state.name(),
            to = next.name(),
            "Workflow transition"
        );
        self.state = next;
    }

    fn reject(&self, action: &'static str) -> WorkflowError {
        tracing::debug!(action, state = self.state.name(), "Rejected workflow action");
        WorkflowError::InvalidTransition { action, state: self.state.name() }
    }

    /// Start a generation attempt.
    ///
    /// Legal from `Idle`, `DraftReady` and `Failed`. Returns the profile to
    /// send; the caller performs the call and reports back through
    /// [`on_generate_success`](Self::on_generate_success) or
    /// [`on_generate_failure`](Self::on_generate_failure).
    pub fn request_generate(&mut self, profile: Profile) -> Result<Profile, WorkflowError> {
        if !self.state.can_generate() {
            return Err(self.reject("generate"));
        }

        if profile.user_id != self.user {
            return Err(ValidationError::IdentityMismatch {
                profile: profile.user_id.to_string(),
                session: self.user.to_string(),
            }
            .into());
        }

        let prior = self.state.draft().cloned();
        self.transition(WorkflowState::Generating { prior });
        Ok(profile)
    }

    /// Record generated text as the live draft.
    ///
    /// The text is stored verbatim.
    pub fn on_generate_success(&mut self, content: String) -> Result<Draft, WorkflowError> {
        if !matches!(self.state, WorkflowState::Generating { .. }) {
            return Err(self.reject("complete generation"));
        }

        let draft = Draft::new(content);
        self.transition(WorkflowState::DraftReady { draft: draft.clone(), scheduled_time: None });
        Ok(draft)
    }

    /// Record a failed generation attempt.
    ///
    /// Any draft that was live before the attempt is kept.
    pub fn on_generate_failure(&mut self, err: &ServiceError) -> Result<(), WorkflowError> {
        let WorkflowState::Generating { prior } = &mut self.state else {
            return Err(self.reject("fail generation"));
        };
        let prior = prior.take();

        tracing::warn!(user = %self.user, error = %err, "Post generation failed");
        let error = WorkflowError::generation(err);
        self.notifications.push(Notification::error(error.title(), error.to_string()));
        self.transition(WorkflowState::Failed { error, draft: prior });
        Ok(())
    }

    /// Use text written elsewhere as the live draft.
    ///
    /// Legal wherever generation is; no request is made.
    pub fn adopt_draft(&mut self, content: impl Into<String>) -> Result<(), WorkflowError> {
        if !self.state.can_generate() {
            return Err(self.reject("load a draft"));
        }

        let draft = Draft::new(content);
        self.transition(WorkflowState::DraftReady { draft, scheduled_time: None });
        Ok(())
    }

    /// Replace the live draft's content.
    pub fn edit_draft(&mut self, content: impl Into<String>) -> Result<(), WorkflowError> {
        match &mut self.state {
            WorkflowState::DraftReady { draft, .. } => {
                draft.content = content.into();
                Ok(())
            }
            _ => Err(self.reject("edit the draft")),
        }
    }

    /// Pick the time the draft should be published.
    ///
    /// Stored as typed; validated when scheduling is requested.
    pub fn select_schedule_time(&mut self, time: impl Into<String>) -> Result<(), WorkflowError> {
        match &mut self.state {
            WorkflowState::DraftReady { scheduled_time, .. } => {
                *scheduled_time = Some(time.into());
                Ok(())
            }
            _ => Err(self.reject("pick a schedule time")),
        }
    }

    /// Start a scheduling attempt.
    ///
    /// Validation failures leave the state untouched and never reach the
    /// network.
    pub fn request_schedule(&mut self) -> Result<ScheduleRequest, WorkflowError> {
        let WorkflowState::DraftReady { draft, scheduled_time } = &self.state else {
            return Err(self.reject("schedule"));
        };

        let request = ScheduleRequest::new(
            draft,
            scheduled_time.as_deref().unwrap_or_default(),
            self.user.clone(),
        )?;

        if self.require_future && !request.scheduled_time.is_after(Local::now().naive_local()) {
            return Err(ValidationError::TimeInPast(request.scheduled_time.to_string()).into());
        }

        let draft = draft.clone();
        self.transition(WorkflowState::Scheduling { draft, request: request.clone() });
        Ok(request)
    }

    /// Record a confirmed schedule.
    pub fn on_schedule_success(
        &mut self,
        confirmation: &ScheduleConfirmation,
    ) -> Result<(), WorkflowError> {
        let WorkflowState::Scheduling { request, .. } = &self.state else {
            return Err(self.reject("confirm scheduling"));
        };
        let request = request.clone();

        tracing::info!(
            user = %self.user,
            scheduled_time = %request.scheduled_time,
            status = confirmation.status.as_deref().unwrap_or("ok"),
            "Post scheduled"
        );
        self.notifications.push(Notification::success(
            "Post scheduled!",
            format!("Your post will be published at {}", request.scheduled_time),
        ));
        self.transition(WorkflowState::Scheduled { request });
        Ok(())
    }

    /// Record a failed scheduling attempt.
    ///
    /// The pending request is dropped; the draft is kept for a retry.
    pub fn on_schedule_failure(&mut self, err: &ServiceError) -> Result<(), WorkflowError> {
        let WorkflowState::Scheduling { draft, .. } = &self.state else {
            return Err(self.reject("fail scheduling"));
        };
        let draft = draft.clone();

        tracing::warn!(user = %self.user, error = %err, "Post scheduling failed");
        let error = WorkflowError::scheduling(err);
        self.notifications.push(Notification::error(error.title(), error.to_string()));
        self.transition(WorkflowState::Failed { error, draft: Some(draft) });
        Ok(())
    }

    /// Dismiss a terminal or failed state.
    ///
    /// `Scheduled` re-arms to `Idle`. `Failed` returns to `DraftReady` when a
    /// draft survived, else to `Idle`. A no-op in `Idle`.
    pub fn acknowledge(&mut self) -> Result<(), WorkflowError> {
        let next = match &self.state {
            WorkflowState::Idle | WorkflowState::Scheduled { .. } => WorkflowState::Idle,
            WorkflowState::Failed { draft: Some(draft), .. } => {
                WorkflowState::DraftReady { draft: draft.clone(), scheduled_time: None }
            }
            WorkflowState::Failed { draft: None, .. } => WorkflowState::Idle,
            WorkflowState::Generating { .. }
            | WorkflowState::DraftReady { .. }
            | WorkflowState::Scheduling { .. } => return Err(self.reject("acknowledge")),
        };

        self.transition(next);
        Ok(())
    }

    /// Run a full generation round-trip against a service.
    pub async fn generate(
        &mut self,
        service: &dyn ContentService,
        profile: Profile,
    ) -> Result<Draft, WorkflowError> {
        let profile = self.request_generate(profile)?;

        match service.generate_post(&profile).await {
            Ok(content) => self.on_generate_success(content),
            Err(err) => {
                self.on_generate_failure(&err)?;
                Err(WorkflowError::generation(&err))
            }
        }
    }

    /// Run a full scheduling round-trip against a service.
    pub async fn schedule(
        &mut self,
        service: &dyn ContentService,
    ) -> Result<ScheduleConfirmation, WorkflowError> {
        let request = self.request_schedule()?;

        match service.schedule_post(&request).await {
            Ok(confirmation) => {
                self.on_schedule_success(&confirmation)?;
                Ok(confirmation)
            }
            Err(err) => {
                self.on_schedule_failure(&err)?;
                Err(WorkflowError::scheduling(&err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::testing::ScriptedService;

    fn alice() -> UserIdentity {
        UserIdentity::new("alice")
    }

    fn profile() -> Profile {
        let mut profile = Profile::new(alice());
        profile.skills = vec!["rust".to_string()];
        profile
    }

    fn draft_ready(content: &str) -> PostWorkflow {
        let mut workflow = PostWorkflow::new(alice());
        workflow.request_generate(profile()).unwrap();
        workflow.on_generate_success(content.to_string()).unwrap();
        workflow
    }

    #[test]
    fn test_starts_idle() {
        let workflow = PostWorkflow::new(alice());
        assert_eq!(workflow.state(), &WorkflowState::Idle);
        assert!(workflow.draft().is_none());
    }

    #[test]
    fn test_request_generate_enters_generating() {
        let mut workflow = PostWorkflow::new(alice());
        let sent = workflow.request_generate(profile()).unwrap();

        assert_eq!(sent, profile());
        assert_eq!(workflow.state(), &WorkflowState::Generating { prior: None });
    }

    #[test]
    fn test_single_flight_generate() {
        let mut workflow = PostWorkflow::new(alice());
        workflow.request_generate(profile()).unwrap();

        for _ in 0..5 {
            let err = workflow.request_generate(profile()).unwrap_err();
            assert_eq!(
                err,
                WorkflowError::InvalidTransition { action: "generate", state: "generating" }
            );
        }
        assert!(workflow.state().is_busy());
    }

    #[test]
    fn test_identity_mismatch_rejected() {
        let mut workflow = PostWorkflow::new(alice());
        let err = workflow.request_generate(Profile::new(UserIdentity::new("mallory"))).unwrap_err();

        assert!(matches!(
            err,
            WorkflowError::Validation(ValidationError::IdentityMismatch { .. })
        ));
        assert_eq!(workflow.state(), &WorkflowState::Idle);
    }

    #[test]
    fn test_generate_success_stores_text_verbatim() {
        let workflow = draft_ready("  Hello world \n");
        assert_eq!(workflow.draft().unwrap().content, "  Hello world \n");
        assert!(matches!(workflow.state(), WorkflowState::DraftReady { scheduled_time: None, .. }));
    }

    #[test]
    fn test_generate_failure_without_prior_draft() {
        let mut workflow = PostWorkflow::new(alice());
        workflow.request_generate(profile()).unwrap();
        workflow.on_generate_failure(&ServiceError::Status { status: 500, body: String::new() }).unwrap();

        assert!(matches!(
            workflow.state(),
            WorkflowState::Failed { error: WorkflowError::Generation(_), draft: None }
        ));
        assert!(workflow.draft().is_none());

        let notes = workflow.take_notifications();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].is_error());
        assert!(workflow.take_notifications().is_empty());

        workflow.acknowledge().unwrap();
        assert_eq!(workflow.state(), &WorkflowState::Idle);
    }

    #[test]
    fn test_generate_failure_keeps_prior_draft() {
        let mut workflow = draft_ready("first");
        workflow.request_generate(profile()).unwrap();
        assert_eq!(workflow.draft().unwrap().content, "first");

        workflow.on_generate_failure(&ServiceError::MissingField("post_content")).unwrap();
        assert_eq!(workflow.draft().unwrap().content, "first");

        workflow.acknowledge().unwrap();
        assert!(matches!(workflow.state(), WorkflowState::DraftReady { .. }));
        assert_eq!(workflow.draft().unwrap().content, "first");
    }

    #[test]
    fn test_regenerate_replaces_draft() {
        let mut workflow = draft_ready("first");
        workflow.request_generate(profile()).unwrap();
        workflow.on_generate_success("second".to_string()).unwrap();

        assert_eq!(workflow.draft().unwrap().content, "second");
    }

    #[test]
    fn test_completion_outside_generating_is_rejected() {
        let mut workflow = PostWorkflow::new(alice());
        assert!(workflow.on_generate_success("x".to_string()).is_err());
        assert!(workflow.on_generate_failure(&ServiceError::MissingField("post_content")).is_err());
        assert!(workflow.on_schedule_success(&ScheduleConfirmation::default()).is_err());
        assert_eq!(workflow.state(), &WorkflowState::Idle);
    }

    #[test]
    fn test_edit_draft() {
        let mut workflow = draft_ready("original");
        workflow.edit_draft("edited").unwrap();
        assert_eq!(workflow.draft().unwrap().content, "edited");

        let mut idle = PostWorkflow::new(alice());
        assert!(idle.edit_draft("nope").is_err());
    }

    #[test]
    fn test_adopt_draft() {
        let mut workflow = PostWorkflow::new(alice());
        workflow.adopt_draft("written by hand").unwrap();
        assert_eq!(workflow.draft().unwrap().content, "written by hand");

        workflow.request_generate(profile()).unwrap();
        assert!(workflow.adopt_draft("while busy").is_err());
    }

    #[test]
    fn test_select_time_is_local_only() {
        let mut workflow = draft_ready("X");
        workflow.select_schedule_time("2025-01-01T10:00").unwrap();

        assert_eq!(
            workflow.state(),
            &WorkflowState::DraftReady {
                draft: Draft::new("X"),
                scheduled_time: Some("2025-01-01T10:00".to_string()),
            }
        );
    }

    #[test]
    fn test_schedule_without_time_is_rejected_locally() {
        let mut workflow = draft_ready("X");
        let before = workflow.state().clone();

        let err = workflow.request_schedule().unwrap_err();
        assert_eq!(err, WorkflowError::Validation(ValidationError::MissingScheduleTime));
        assert_eq!(workflow.state(), &before);

        workflow.select_schedule_time("").unwrap();
        let err = workflow.request_schedule().unwrap_err();
        assert_eq!(err, WorkflowError::Validation(ValidationError::MissingScheduleTime));
    }

    #[test]
    fn test_schedule_with_empty_content_is_rejected_locally() {
        let mut workflow = draft_ready("");
        workflow.select_schedule_time("2025-01-01T10:00").unwrap();

        let err = workflow.request_schedule().unwrap_err();
        assert_eq!(err, WorkflowError::Validation(ValidationError::EmptyContent));
        assert!(matches!(workflow.state(), WorkflowState::DraftReady { .. }));
    }

    #[test]
    fn test_schedule_with_bad_time_is_rejected_locally() {
        let mut workflow = draft_ready("X");
        workflow.select_schedule_time("next tuesday").unwrap();

        let err = workflow.request_schedule().unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Validation(ValidationError::UnparseableScheduleTime(_))
        ));
    }

    #[test]
    fn test_require_future_rejects_past_time() {
        let mut workflow = PostWorkflow::new(alice()).with_require_future(true);
        workflow.request_generate(profile()).unwrap();
        workflow.on_generate_success("X".to_string()).unwrap();
        workflow.select_schedule_time("2000-01-01T00:00").unwrap();

        let err = workflow.request_schedule().unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(ValidationError::TimeInPast(_))));

        workflow.select_schedule_time("2999-01-01T00:00").unwrap();
        assert!(workflow.request_schedule().is_ok());
    }

    #[test]
    fn test_single_flight_schedule() {
        let mut workflow = draft_ready("X");
        workflow.select_schedule_time("2025-01-01T10:00").unwrap();

        let request = workflow.request_schedule().unwrap();
        assert_eq!(request.content, "X");
        assert_eq!(request.user_id, alice());
        assert_eq!(request.scheduled_time.as_str(), "2025-01-01T10:00");

        let err = workflow.request_schedule().unwrap_err();
        assert_eq!(err, WorkflowError::InvalidTransition { action: "schedule", state: "scheduling" });
        assert!(workflow.request_generate(profile()).is_err());
        assert!(workflow.acknowledge().is_err());
    }

    #[test]
    fn test_schedule_success_notifies_once() {
        let mut workflow = draft_ready("X");
        workflow.select_schedule_time("2025-01-01T10:00").unwrap();
        workflow.request_schedule().unwrap();
        workflow.on_schedule_success(&ScheduleConfirmation::default()).unwrap();

        assert_eq!(workflow.state().scheduled_at().unwrap().as_str(), "2025-01-01T10:00");
        let notes = workflow.take_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "Post scheduled!");
    }

    #[test]
    fn test_schedule_failure_keeps_draft_and_drops_time() {
        let mut workflow = draft_ready("X");
        workflow.select_schedule_time("2025-01-01T10:00").unwrap();
        workflow.request_schedule().unwrap();
        workflow.on_schedule_failure(&ServiceError::Status { status: 503, body: String::new() }).unwrap();

        assert!(matches!(
            workflow.state(),
            WorkflowState::Failed { error: WorkflowError::Scheduling(_), draft: Some(_) }
        ));

        workflow.acknowledge().unwrap();
        assert_eq!(
            workflow.state(),
            &WorkflowState::DraftReady { draft: Draft::new("X"), scheduled_time: None }
        );
    }

    #[test]
    fn test_acknowledge_rearms_for_generation() {
        let mut scheduled = draft_ready("X");
        scheduled.select_schedule_time("2025-01-01T10:00").unwrap();
        scheduled.request_schedule().unwrap();
        scheduled.on_schedule_success(&ScheduleConfirmation::default()).unwrap();

        let mut failed = PostWorkflow::new(alice());
        failed.request_generate(profile()).unwrap();
        failed.on_generate_failure(&ServiceError::MissingField("post_content")).unwrap();

        for workflow in [&mut scheduled, &mut failed] {
            workflow.acknowledge().unwrap();
            assert!(workflow.state().can_generate());
            assert!(workflow.request_generate(profile()).is_ok());
        }
    }

    #[test]
    fn test_acknowledge_idle_is_noop() {
        let mut workflow = PostWorkflow::new(alice());
        workflow.acknowledge().unwrap();
        workflow.acknowledge().unwrap();
        assert_eq!(workflow.state(), &WorkflowState::Idle);
    }

    #[test]
    fn test_acknowledge_rejected_in_draft_ready() {
        let mut workflow = draft_ready("X");
        assert!(workflow.acknowledge().is_err());
        assert_eq!(workflow.draft().unwrap().content, "X");
    }

    #[tokio::test]
    async fn test_generate_driver() {
        let service = ScriptedService::new().generates("Hello world");
        let mut workflow = PostWorkflow::new(alice());

        let draft = workflow.generate(&service, profile()).await.unwrap();
        assert_eq!(draft.content, "Hello world");
        assert_eq!(service.generate_calls(), 1);
    }

    #[tokio::test]
    async fn test_generate_driver_failure() {
        let service = ScriptedService::new().generate_fails(500);
        let mut workflow = PostWorkflow::new(alice());

        let err = workflow.generate(&service, profile()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Generation(_)));
        assert!(matches!(workflow.state(), WorkflowState::Failed { draft: None, .. }));
    }

    #[tokio::test]
    async fn test_schedule_driver_validation_gate() {
        let service = ScriptedService::new().generates("X").schedules();
        let mut workflow = PostWorkflow::new(alice());
        workflow.generate(&service, profile()).await.unwrap();

        let err = workflow.schedule(&service).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
        assert_eq!(service.schedule_calls(), 0);

        workflow.select_schedule_time("2025-01-01T10:00").unwrap();
        workflow.schedule(&service).await.unwrap();
        assert_eq!(service.schedule_calls(), 1);
        assert_eq!(service.last_schedule().unwrap().content, "X");
        assert!(matches!(workflow.state(), WorkflowState::Scheduled { .. }));
    }

    #[tokio::test]
    async fn test_schedule_driver_failure_then_retry() {
        let service = ScriptedService::new().generates("X").schedule_fails(503).schedules();
        let mut workflow = PostWorkflow::new(alice());
        workflow.generate(&service, profile()).await.unwrap();

        workflow.select_schedule_time("2025-01-01T10:00").unwrap();
        let err = workflow.schedule(&service).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Scheduling(_)));

        workflow.acknowledge().unwrap();
        workflow.select_schedule_time("2025-01-01T10:00").unwrap();
        workflow.schedule(&service).await.unwrap();

        assert_eq!(service.generate_calls(), 1);
        assert_eq!(service.schedule_calls(), 2);
    }
}
