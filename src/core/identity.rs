//! Identity provider and session handling.
//!
//! Authentication is deliberately thin: the workflow only needs an opaque
//! user identifier that stays stable for the lifetime of a session.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque user identifier issued at authentication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserIdentity(String);

impl UserIdentity {
    /// Wrap an already-authenticated identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// User-supplied credentials.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// Login name
    pub username: String,

    /// Optional secret (password or token)
    pub secret: Option<String>,
}

impl Credentials {
    /// Credentials consisting of a username only.
    pub fn username(username: impl Into<String>) -> Self {
        Self { username: username.into(), secret: None }
    }
}

/// Errors raised while authenticating.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("Username is required")]
    MissingUsername,

    #[error("Invalid username '{0}': whitespace, slashes and '..' are not allowed")]
    InvalidUsername(String),

    #[error("Unknown user: {0}")]
    UnknownUser(String),
}

/// Something that turns credentials into a user identity.
pub trait IdentityProvider: Send + Sync {
    /// Authenticate and yield the user's identifier.
    fn authenticate(&self, credentials: &Credentials) -> Result<UserIdentity, IdentityError>;

    /// Provider name for display.
    fn name(&self) -> &str;
}

/// Identity provider backed by local configuration.
///
/// Any well-formed username is accepted unless an allow-list is set.
#[derive(Debug, Clone, Default)]
pub struct LocalIdentityProvider {
    allowed_users: Vec<String>,
}

impl LocalIdentityProvider {
    /// Create a provider that accepts any well-formed username.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict logins to the given usernames.
    pub fn with_allowed_users(mut self, users: Vec<String>) -> Self {
        self.allowed_users = users;
        self
    }
}

impl IdentityProvider for LocalIdentityProvider {
    fn authenticate(&self, credentials: &Credentials) -> Result<UserIdentity, IdentityError> {
        let username = credentials.username.trim();

        if username.is_empty() {
            return Err(IdentityError::MissingUsername);
        }

        // Usernames name profile files, so they must stay a single path component
        if username.chars().any(|c| c.is_whitespace() || c == '/' || c == '\\')
            || username.contains("..")
        {
            return Err(IdentityError::InvalidUsername(username.to_string()));
        }

        if !self.allowed_users.is_empty() && !self.allowed_users.iter().any(|u| u == username) {
            return Err(IdentityError::UnknownUser(username.to_string()));
        }

        tracing::debug!(user = username, "Authenticated local user");
        Ok(UserIdentity::new(username))
    }

    fn name(&self) -> &str {
        "local"
    }
}

/// An authenticated session.
///
/// Owns the identity for as long as the user stays logged in.
#[derive(Debug, Clone)]
pub struct Session {
    identity: UserIdentity,
}

impl Session {
    /// Authenticate through a provider and open a session.
    pub fn login(
        provider: &dyn IdentityProvider,
        credentials: &Credentials,
    ) -> Result<Self, IdentityError> {
        let identity = provider.authenticate(credentials)?;
        tracing::info!(user = %identity, provider = provider.name(), "Session started");
        Ok(Self { identity })
    }

    /// The identity bound to this session.
    pub fn identity(&self) -> &UserIdentity {
        &self.identity
    }

    /// End the session.
    pub fn logout(self) {
        tracing::info!(user = %self.identity, "Session ended");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_provider_accepts_username() {
        let provider = LocalIdentityProvider::new();
        let id = provider.authenticate(&Credentials::username("  alice ")).unwrap();
        assert_eq!(id.as_str(), "alice");
    }

    #[test]
    fn test_local_provider_rejects_empty() {
        let provider = LocalIdentityProvider::new();
        let err = provider.authenticate(&Credentials::username("   ")).unwrap_err();
        assert_eq!(err, IdentityError::MissingUsername);
    }

    #[test]
    fn test_local_provider_rejects_whitespace() {
        let provider = LocalIdentityProvider::new();
        let err = provider.authenticate(&Credentials::username("al ice")).unwrap_err();
        assert!(matches!(err, IdentityError::InvalidUsername(_)));
    }

    #[test]
    fn test_local_provider_rejects_path_like_names() {
        let provider = LocalIdentityProvider::new();
        for name in ["../etc/passwd", "a/b", "a\\b", ".."] {
            let err = provider.authenticate(&Credentials::username(name)).unwrap_err();
            assert!(matches!(err, IdentityError::InvalidUsername(_)), "{name} was accepted");
        }
        assert!(provider.authenticate(&Credentials::username("ada.lovelace")).is_ok());
    }

    #[test]
    fn test_allow_list() {
        let provider = LocalIdentityProvider::new().with_allowed_users(vec!["bob".to_string()]);

        assert!(provider.authenticate(&Credentials::username("bob")).is_ok());
        assert_eq!(
            provider.authenticate(&Credentials::username("eve")).unwrap_err(),
            IdentityError::UnknownUser("eve".to_string())
        );
    }

    #[test]
    fn test_session_login() {
        let provider = LocalIdentityProvider::new();
        let session = Session::login(&provider, &Credentials::username("carol")).unwrap();
        assert_eq!(session.identity(), &UserIdentity::new("carol"));
        session.logout();
    }

    #[test]
    fn test_identity_serializes_as_string() {
        let json = serde_json::to_string(&UserIdentity::new("u-1")).unwrap();
        assert_eq!(json, "\"u-1\"");
    }
}
