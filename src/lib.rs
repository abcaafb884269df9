//! # Brandpost
//!
//! Generate professional posts from your profile and schedule them for
//! publishing, from the terminal.
//!
//! Brandpost logs you in, loads your profile, asks a remote content
//! service to write a post, lets you review and edit the draft, and
//! schedules it for a time you pick.
//!
//! ## Features
//!
//! - **Profile-driven**: Posts are written from your skills, experience and interests
//! - **Review before publishing**: Edit the draft and pick a time before anything is scheduled
//! - **Single flight**: At most one request to the content service per session at a time
//! - **Scriptable**: `generate`, `schedule` and `analyze` subcommands for non-interactive use
//!
//! ## Quick Start
//!
//! ```bash
//! # Point at the content service
//! export BRANDPOST_SERVICE_URL=http://localhost:8000
//!
//! # Interactive
//! brandpost
//!
//! # One-shot
//! brandpost schedule --user alice --at 2030-01-01T10:00
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::map_unwrap_or)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod app;
pub mod core;
pub mod integrations;
pub mod tui;
pub mod workflow;

pub use app::{App, AppMode};
pub use core::{Config, Credentials, Profile, Session, UserIdentity};
pub use integrations::{ContentService, HttpContentService, ServiceError};
pub use workflow::{PostWorkflow, WorkflowError, WorkflowState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "brandpost";
