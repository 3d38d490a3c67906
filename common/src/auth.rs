use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    pub initialized: bool,
    pub password_set: bool,
}

impl AuthStatus {
    /// Whether requests need a bearer token.
    #[must_use]
    pub const fn requires_login(&self) -> bool {
        !self.initialized || self.password_set
    }
}

impl fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.initialized, self.password_set) {
            (false, _) => write!(f, "not initialized (run setup)"),
            (true, true) => write!(f, "initialized, password protected"),
            (true, false) => write!(f, "initialized, open access"),
        }
    }
}

/// Body shared by the login, setup and password endpoints.
#[derive(Clone, Serialize, Deserialize)]
pub struct PasswordRequest {
    pub password: String,
}

impl PasswordRequest {
    #[must_use]
    pub fn new(password: &str) -> Self {
        Self {
            password: password.to_string(),
        }
    }
}

impl fmt::Debug for PasswordRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordRequest")
            .field("password", &"***")
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

impl fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &"***")
            .finish()
    }
}
