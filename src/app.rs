//! Application state and lifecycle management.
//!
//! This module contains the core `App` struct that holds the interactive
//! session: who is logged in, the post workflow, and the text being typed.
//! Network calls run on a background runtime and report back through a
//! channel that [`App::tick`] drains.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use chrono::{Duration, Local};

use crate::core::{
    send_desktop_notification, Config, Credentials, IdentityProvider, LocalIdentityProvider,
    Notification, ProfileSource, Session,
};
use crate::integrations::{
    ContentService, HttpContentService, ScheduleConfirmation, ServiceResult,
};
use crate::tui::Theme;
use crate::workflow::{PostWorkflow, WorkflowState};

/// Layout used to pre-fill the schedule time field.
const TIME_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Main application state.
pub struct App {
    /// Current text input from the user
    pub input: String,

    /// Cursor position in the input field, in characters
    pub cursor_position: usize,

    /// Whether the application should quit
    pub should_quit: bool,

    /// Application configuration
    pub config: Config,

    /// Current mode of the application
    pub mode: AppMode,

    /// Status message to display (if any)
    pub status_message: Option<String>,

    /// Most recent workflow notification
    pub last_notification: Option<Notification>,

    /// Current UI theme
    pub theme: Theme,

    /// Active session, once logged in
    pub session: Option<Session>,

    /// Post workflow for the active session
    pub workflow: Option<PostWorkflow>,

    identity: Box<dyn IdentityProvider>,
    profiles: Box<dyn ProfileSource>,
    service: Arc<dyn ContentService>,
    runtime: tokio::runtime::Runtime,
    /// Bumped on every login and logout; results tagged with an older value are dropped
    session_epoch: u64,
    in_flight: Option<tokio::task::JoinHandle<()>>,
    events_tx: Sender<(u64, ServiceEvent)>,
    events_rx: Receiver<(u64, ServiceEvent)>,
}

/// Application modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppMode {
    /// Asking for a username
    #[default]
    Login,

    /// Main workflow screen
    Workflow,

    /// Editing the draft text
    EditDraft,

    /// Typing the schedule time
    EditTime,

    /// Showing help screen with keyboard shortcuts
    Help,
}

/// Completion of a network call started by the app.
#[derive(Debug)]
pub enum ServiceEvent {
    /// A generation call finished
    Generated(ServiceResult<String>),

    /// A scheduling call finished
    Scheduled(ServiceResult<ScheduleConfirmation>),
}

impl App {
    /// Create a new application instance from configuration.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let identity = LocalIdentityProvider::new()
            .with_allowed_users(config.identity.allowed_users.clone());
        let profiles = config.profile_source();
        let service =
            HttpContentService::new(config.service.base_url.clone(), config.service.timeout())?;

        Self::with_services(config, Box::new(identity), profiles, Arc::new(service))
    }

    /// Create an application with explicit collaborators.
    pub fn with_services(
        config: Config,
        identity: Box<dyn IdentityProvider>,
        profiles: Box<dyn ProfileSource>,
        service: Arc<dyn ContentService>,
    ) -> anyhow::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("brandpost-net")
            .enable_all()
            .build()?;
        let (events_tx, events_rx) = mpsc::channel();
        let theme = Theme::by_name(&config.ui.theme).unwrap_or_default();

        Ok(Self {
            input: String::new(),
            cursor_position: 0,
            should_quit: false,
            config,
            mode: AppMode::default(),
            status_message: None,
            last_notification: None,
            theme,
            session: None,
            workflow: None,
            identity,
            profiles,
            service,
            runtime,
            session_epoch: 0,
            in_flight: None,
            events_tx,
            events_rx,
        })
    }

    // --- Input methods ---

    fn byte_index(&self) -> usize {
        self.input
            .char_indices()
            .nth(self.cursor_position)
            .map_or(self.input.len(), |(i, _)| i)
    }

    /// Handle a character input.
    pub fn enter_char(&mut self, c: char) {
        let index = self.byte_index();
        self.input.insert(index, c);
        self.cursor_position += 1;
    }

    /// Delete the character before the cursor (backspace).
    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            let index = self.byte_index();
            self.input.remove(index);
        }
    }

    /// Delete the character at the cursor (delete key).
    pub fn delete_char_forward(&mut self) {
        if self.cursor_position < self.input.chars().count() {
            let index = self.byte_index();
            self.input.remove(index);
        }
    }

    /// Move cursor left.
    pub fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    /// Move cursor right.
    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.input.chars().count() {
            self.cursor_position += 1;
        }
    }

    /// Move cursor to start of input.
    pub fn move_cursor_start(&mut self) {
        self.cursor_position = 0;
    }

    /// Move cursor to end of input.
    pub fn move_cursor_end(&mut self) {
        self.cursor_position = self.input.chars().count();
    }

    /// Clear the input field.
    pub fn clear_input(&mut self) {
        self.input.clear();
        self.cursor_position = 0;
    }

    fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
        self.move_cursor_end();
    }

    // --- Status methods ---

    /// Set a status message.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Clear the status message.
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Request the application to quit.
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Current workflow state, if logged in.
    pub fn workflow_state(&self) -> Option<&WorkflowState> {
        self.workflow.as_ref().map(PostWorkflow::state)
    }

    /// Name of the content service in use.
    pub fn service_name(&self) -> &str {
        self.service.name()
    }

    // --- Session methods ---

    /// Log in with the username in the input field.
    pub fn login(&mut self) {
        let username = self.input.clone();
        self.login_with(username);
    }

    /// Log in as `username`.
    pub fn login_with(&mut self, username: impl Into<String>) {
        let credentials = Credentials::username(username);

        match Session::login(self.identity.as_ref(), &credentials) {
            Ok(session) => {
                let workflow = PostWorkflow::new(session.identity().clone())
                    .with_require_future(self.config.schedule.require_future);
                self.end_session_calls();
                self.set_status(format!("Logged in as {}", session.identity()));
                self.session = Some(session);
                self.workflow = Some(workflow);
                self.clear_input();
                self.mode = AppMode::Workflow;
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    /// End the session and return to the login prompt.
    pub fn logout(&mut self) {
        if let Some(session) = self.session.take() {
            session.logout();
        }
        self.end_session_calls();
        self.workflow = None;
        self.last_notification = None;
        self.clear_input();
        self.mode = AppMode::Login;
        self.set_status("Logged out");
    }

    /// Abandon calls started by the previous session.
    fn end_session_calls(&mut self) {
        self.session_epoch += 1;
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
    }

    /// Run a service call in the background, tagged with the current session.
    fn spawn_call<F>(&mut self, call: F)
    where
        F: std::future::Future<Output = ServiceEvent> + Send + 'static,
    {
        let tx = self.events_tx.clone();
        let epoch = self.session_epoch;
        self.in_flight = Some(self.runtime.spawn(async move {
            let _ = tx.send((epoch, call.await));
        }));
    }

    // --- Workflow actions ---

    /// Ask the content service for a new draft.
    pub fn generate(&mut self) {
        let (Some(session), Some(workflow)) = (&self.session, &mut self.workflow) else {
            return;
        };

        let profile = match self.profiles.load(session.identity()) {
            Ok(profile) => profile,
            Err(e) => {
                self.status_message = Some(e.to_string());
                return;
            }
        };

        match workflow.request_generate(profile) {
            Ok(profile) => {
                let service = Arc::clone(&self.service);
                self.spawn_call(async move {
                    ServiceEvent::Generated(service.generate_post(&profile).await)
                });
                self.set_status("Generating post...");
            }
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }

    /// Ask the content service to schedule the draft.
    pub fn schedule(&mut self) {
        let Some(workflow) = &mut self.workflow else {
            return;
        };

        match workflow.request_schedule() {
            Ok(request) => {
                let service = Arc::clone(&self.service);
                self.spawn_call(async move {
                    ServiceEvent::Scheduled(service.schedule_post(&request).await)
                });
                self.set_status("Scheduling post...");
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    /// Dismiss a scheduled or failed state.
    pub fn acknowledge(&mut self) {
        let Some(workflow) = &mut self.workflow else {
            return;
        };

        match workflow.acknowledge() {
            Ok(()) => {
                self.last_notification = None;
                self.clear_status();
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    /// Open the draft editor, pre-filled with the draft.
    pub fn begin_edit_draft(&mut self) {
        let draft = match self.workflow_state() {
            Some(WorkflowState::DraftReady { draft, .. }) => draft.content.clone(),
            _ => {
                self.set_status("No draft to edit");
                return;
            }
        };

        self.set_input(draft);
        self.mode = AppMode::EditDraft;
    }

    /// Open the schedule time field.
    ///
    /// Pre-filled with the current selection, or one hour from now.
    pub fn begin_edit_time(&mut self) {
        let current = match self.workflow_state() {
            Some(WorkflowState::DraftReady { scheduled_time, .. }) => scheduled_time.clone(),
            _ => {
                self.set_status("Generate a draft before picking a time");
                return;
            }
        };

        let suggestion = current.unwrap_or_else(|| {
            (Local::now() + Duration::hours(1)).format(TIME_INPUT_FORMAT).to_string()
        });
        self.set_input(suggestion);
        self.mode = AppMode::EditTime;
    }

    /// Commit the input field according to the current mode.
    pub fn submit_input(&mut self) {
        match self.mode {
            AppMode::Login => self.login(),
            AppMode::EditDraft => {
                let text = std::mem::take(&mut self.input);
                if let Some(workflow) = &mut self.workflow {
                    match workflow.edit_draft(text) {
                        Ok(()) => self.status_message = Some("Draft updated".to_string()),
                        Err(e) => self.status_message = Some(e.to_string()),
                    }
                }
                self.clear_input();
                self.mode = AppMode::Workflow;
            }
            AppMode::EditTime => {
                let text = std::mem::take(&mut self.input);
                if let Some(workflow) = &mut self.workflow {
                    match workflow.select_schedule_time(text.trim()) {
                        Ok(()) => {
                            self.status_message =
                                Some(format!("Schedule time set to {}", text.trim()));
                        }
                        Err(e) => self.status_message = Some(e.to_string()),
                    }
                }
                self.clear_input();
                self.mode = AppMode::Workflow;
            }
            AppMode::Workflow | AppMode::Help => {}
        }
    }

    /// Leave an editor without saving.
    pub fn cancel_input(&mut self) {
        self.clear_input();
        if matches!(self.mode, AppMode::EditDraft | AppMode::EditTime) {
            self.mode = AppMode::Workflow;
        }
    }

    // --- Help methods ---

    /// Show the help screen.
    pub fn show_help(&mut self) {
        self.mode = AppMode::Help;
    }

    /// Dismiss the help screen.
    pub fn dismiss_help(&mut self) {
        self.mode = if self.session.is_some() { AppMode::Workflow } else { AppMode::Login };
    }

    /// Check if help is currently shown.
    pub fn is_help_shown(&self) -> bool {
        matches!(self.mode, AppMode::Help)
    }

    // --- Event pump ---

    /// Apply finished network calls and surface notifications.
    pub fn tick(&mut self) {
        while let Ok((epoch, event)) = self.events_rx.try_recv() {
            if epoch != self.session_epoch {
                tracing::debug!(?event, "Dropping service result from an ended session");
                continue;
            }
            self.in_flight = None;
            self.apply_event(event);
        }
        self.poll_notifications();
    }

    fn apply_event(&mut self, event: ServiceEvent) {
        let Some(workflow) = &mut self.workflow else {
            tracing::debug!(?event, "Dropping service result with no active workflow");
            return;
        };

        let outcome = match event {
            ServiceEvent::Generated(Ok(content)) => {
                workflow.on_generate_success(content).map(|_| "Draft ready")
            }
            ServiceEvent::Generated(Err(err)) => {
                workflow.on_generate_failure(&err).map(|()| "Generation failed")
            }
            ServiceEvent::Scheduled(Ok(confirmation)) => {
                workflow.on_schedule_success(&confirmation).map(|()| "Post scheduled!")
            }
            ServiceEvent::Scheduled(Err(err)) => {
                workflow.on_schedule_failure(&err).map(|()| "Scheduling failed")
            }
        };

        match outcome {
            Ok(message) => self.set_status(message),
            Err(e) => {
                tracing::warn!(error = %e, "Service result did not match workflow state");
                self.set_status(e.to_string());
            }
        }
    }

    fn poll_notifications(&mut self) {
        let Some(workflow) = &mut self.workflow else {
            return;
        };

        for notification in workflow.take_notifications() {
            if self.config.ui.desktop_notifications {
                send_desktop_notification(&notification);
            }
            self.status_message = Some(notification.title.clone());
            self.last_notification = Some(notification);
        }
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("mode", &self.mode)
            .field("session", &self.session)
            .field("workflow", &self.workflow)
            .field("status_message", &self.status_message)
            .finish()
    }
}

#[cfg(test)]
impl App {
    /// Create an app wired to a scripted service, for tests.
    pub fn new_test() -> Self {
        Self::new_test_with(Arc::new(crate::workflow::testing::ScriptedService::new()))
    }

    /// Create an app around a given service, for tests.
    pub fn new_test_with(service: Arc<dyn ContentService>) -> Self {
        let mut config = Config::default();
        config.ui.desktop_notifications = false;
        let profiles = crate::core::StaticProfileSource::new(crate::core::ProfileTemplate {
            skills: vec!["Rust".to_string()],
            ..Default::default()
        });

        match Self::with_services(
            config,
            Box::new(LocalIdentityProvider::new()),
            Box::new(profiles),
            service,
        ) {
            Ok(app) => app,
            Err(e) => panic!("failed to build test app: {e}"),
        }
    }

    /// Tick until no service call is outstanding.
    pub fn settle(&mut self) {
        for _ in 0..200 {
            self.tick();
            if !self.workflow_state().is_some_and(WorkflowState::is_busy) {
                return;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        panic!("service call never completed");
    }

    /// Type `user` into the prompt and log in.
    pub fn login_as(&mut self, user: &str) {
        self.clear_input();
        for c in user.chars() {
            self.enter_char(c);
        }
        self.login();
    }
}
