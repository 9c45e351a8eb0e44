use serde::{Deserialize, Serialize};

/// Name of the internal system identity.
pub const SYSTEM_USER: &str = "System";

/// Per-call identity context, threaded explicitly through repository
/// operations for authorization and audit.
///
/// Identity is a value, not ambient state: code that needs to act as a
/// different user derives a new context with [`AuthContext::run_as`] and
/// passes it down the call path. There is no push/pop discipline to get
/// wrong — the override ends when the derived context goes out of scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user name.
    pub user: String,
    /// Whether this context carries the internal system identity, which
    /// bypasses permission checks.
    pub is_system: bool,
}

impl AuthContext {
    /// Context for an ordinary authenticated user.
    #[must_use]
    pub fn user(name: impl Into<String>) -> Self {
        Self {
            user: name.into(),
            is_system: false,
        }
    }

    /// The internal system identity.
    #[must_use]
    pub fn system() -> Self {
        Self {
            user: SYSTEM_USER.to_string(),
            is_system: true,
        }
    }

    /// Derives a context acting as another user. The receiver is unchanged;
    /// callers pass the derived context only into the scoped work.
    #[must_use]
    pub fn run_as(&self, name: impl Into<String>) -> Self {
        Self::user(name)
    }
}
