//! Core types and functionality for Brandpost.
//!
//! This module contains the session-level collaborators the workflow
//! depends on: identity, profiles, configuration and notifications.

mod config;
mod identity;
mod notify;
mod profile;

pub use config::{
    Config, IdentityConfig, ProfileConfig, ScheduleConfig, ServiceConfig, UiConfig,
    ENV_SERVICE_URL, ENV_TIMEOUT_SECS,
};
pub use identity::{
    Credentials, IdentityError, IdentityProvider, LocalIdentityProvider, Session, UserIdentity,
};
pub use notify::{send_desktop_notification, Notification, NotificationLevel};
pub use profile::{
    FileProfileSource, Profile, ProfileError, ProfileSource, ProfileTemplate, StaticProfileSource,
};
