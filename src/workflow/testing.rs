//! Scripted content service for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::Profile;
use crate::integrations::{ContentService, ScheduleConfirmation, ServiceError, ServiceResult};
use crate::workflow::ScheduleRequest;

/// Content service that replays queued responses and counts calls.
#[derive(Default)]
pub struct ScriptedService {
    generate: Mutex<VecDeque<ServiceResult<String>>>,
    schedule: Mutex<VecDeque<ServiceResult<ScheduleConfirmation>>>,
    generate_calls: AtomicUsize,
    schedule_calls: AtomicUsize,
    last_schedule: Mutex<Option<ScheduleRequest>>,
    echo_user: bool,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generates(self, content: &str) -> Self {
        self.generate.lock().unwrap().push_back(Ok(content.to_string()));
        self
    }

    /// Answer every generation with `post for <user>`.
    pub fn echoes_user(mut self) -> Self {
        self.echo_user = true;
        self
    }

    pub fn generate_fails(self, status: u16) -> Self {
        self.generate.lock().unwrap().push_back(Err(status_error(status)));
        self
    }

    pub fn schedules(self) -> Self {
        self.schedule.lock().unwrap().push_back(Ok(ScheduleConfirmation::default()));
        self
    }

    pub fn schedule_fails(self, status: u16) -> Self {
        self.schedule.lock().unwrap().push_back(Err(status_error(status)));
        self
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    pub fn schedule_calls(&self) -> usize {
        self.schedule_calls.load(Ordering::SeqCst)
    }

    pub fn last_schedule(&self) -> Option<ScheduleRequest> {
        self.last_schedule.lock().unwrap().clone()
    }
}

fn status_error(status: u16) -> ServiceError {
    ServiceError::Status { status, body: String::new() }
}

#[async_trait]
impl ContentService for ScriptedService {
    async fn generate_post(&self, profile: &Profile) -> ServiceResult<String> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        if self.echo_user {
            return Ok(format!("post for {}", profile.user_id));
        }
        self.generate.lock().unwrap().pop_front().unwrap_or_else(|| Err(status_error(500)))
    }

    async fn schedule_post(&self, request: &ScheduleRequest) -> ServiceResult<ScheduleConfirmation> {
        self.schedule_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_schedule.lock().unwrap() = Some(request.clone());
        self.schedule.lock().unwrap().pop_front().unwrap_or_else(|| Err(status_error(500)))
    }

    async fn analyze_profile(&self, _profile: &Profile) -> ServiceResult<String> {
        Ok("summary".to_string())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
