//! Login credentials injected into every remote call.

use std::fmt;

use serde_json::{json, Value};

/// Default login used when none is configured.
pub const ANONYMOUS_LOGIN: &str = "anonymous";

/// An immutable login/password pair.
///
/// The gateway expects this as the first positional argument of every call,
/// encoded as a struct with `login` and `password` members.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    login: String,
    password: String,
}

impl Credential {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// The wire representation of this credential.
    pub fn to_value(&self) -> Value {
        json!({ "login": self.login, "password": self.password })
    }
}

impl Default for Credential {
    fn default() -> Self {
        Self::new(ANONYMOUS_LOGIN, "")
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}
