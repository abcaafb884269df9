//! Profile sources.
//!
//! A profile is the structured input sent to the content service when a
//! post is generated. It is loaded fresh for every generation attempt.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::identity::UserIdentity;

/// A user's professional profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Owner of this profile
    pub user_id: UserIdentity,

    /// Skills, most relevant first
    #[serde(default)]
    pub skills: Vec<String>,

    /// Experience entries, most recent first
    #[serde(default)]
    pub experience: Vec<String>,

    /// Topics of interest
    #[serde(default)]
    pub interests: Vec<String>,
}

impl Profile {
    /// Create an empty profile for a user.
    pub fn new(user_id: UserIdentity) -> Self {
        Self { user_id, skills: Vec::new(), experience: Vec::new(), interests: Vec::new() }
    }

    /// Check whether the profile carries any attributes at all.
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty() && self.experience.is_empty() && self.interests.is_empty()
    }
}

/// Profile attributes without an owner, as stored on disk or in config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileTemplate {
    /// Skills
    pub skills: Vec<String>,

    /// Experience entries
    pub experience: Vec<String>,

    /// Interests
    pub interests: Vec<String>,
}

impl ProfileTemplate {
    /// Stamp the template with a user id.
    pub fn for_user(&self, user: &UserIdentity) -> Profile {
        Profile {
            user_id: user.clone(),
            skills: self.skills.clone(),
            experience: self.experience.clone(),
            interests: self.interests.clone(),
        }
    }
}

/// Errors raised while loading a profile.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("No profile found for user {0}")]
    NotFound(UserIdentity),

    #[error("Failed to read profile {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid profile {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Something that supplies a profile for a user.
pub trait ProfileSource: Send + Sync {
    /// Load the profile for a user.
    fn load(&self, user: &UserIdentity) -> Result<Profile, ProfileError>;
}

/// Profile source that hands every user the same attributes.
#[derive(Debug, Clone, Default)]
pub struct StaticProfileSource {
    template: ProfileTemplate,
}

impl StaticProfileSource {
    /// Create a source from a template.
    pub fn new(template: ProfileTemplate) -> Self {
        Self { template }
    }
}

impl ProfileSource for StaticProfileSource {
    fn load(&self, user: &UserIdentity) -> Result<Profile, ProfileError> {
        Ok(self.template.for_user(user))
    }
}

/// Profile source reading `<dir>/<user_id>.toml`.
pub struct FileProfileSource {
    dir: PathBuf,
    fallback: Option<Box<dyn ProfileSource>>,
}

impl FileProfileSource {
    /// Create a source rooted at a directory.
    ///
    /// `~` and environment variables in the path are expanded.
    pub fn new(dir: impl AsRef<str>) -> Self {
        let raw = dir.as_ref();
        let expanded =
            shellexpand::full(raw).map(|s| s.into_owned()).unwrap_or_else(|_| raw.to_string());
        Self { dir: PathBuf::from(expanded), fallback: None }
    }

    /// Use another source when a user has no profile file.
    pub fn with_fallback(mut self, fallback: Box<dyn ProfileSource>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Directory profiles are read from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a user's profile file.
    pub fn path_for(&self, user: &UserIdentity) -> PathBuf {
        self.dir.join(format!("{}.toml", user.as_str()))
    }
}

impl ProfileSource for FileProfileSource {
    fn load(&self, user: &UserIdentity) -> Result<Profile, ProfileError> {
        let path = self.path_for(user);

        if !path.exists() {
            return match &self.fallback {
                Some(fallback) => fallback.load(user),
                None => Err(ProfileError::NotFound(user.clone())),
            };
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|source| ProfileError::Io { path: path.clone(), source })?;
        let template: ProfileTemplate =
            toml::from_str(&content).map_err(|source| ProfileError::Parse { path, source })?;

        tracing::debug!(user = %user, "Loaded profile from file");
        Ok(template.for_user(user))
    }
}
