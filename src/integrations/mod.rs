//! External integrations module.
//!
//! Provides the client for the remote content service that writes and
//! schedules posts.

pub mod content;

pub use content::{
    ContentService, HttpContentService, ScheduleConfirmation, ServiceError, ServiceResult,
};
