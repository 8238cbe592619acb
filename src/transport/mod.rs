//! The transport capability the dispatcher calls through.
//!
//! A transport executes one remote procedure call and reports either the raw
//! result value or a [`Fault`]. It knows nothing about response codes or
//! operations; that translation happens in [`crate::response`] and
//! [`crate::operation`].

pub mod http;
pub mod xmlrpc;

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::credential::Credential;

pub use http::HttpTransport;

/// Fault code for failures below the protocol (connect, TLS, timeout, HTTP).
pub const TRANSPORT_ERROR: i32 = -32300;

/// Fault code for a response body that is not a well-formed methodResponse.
pub const PARSE_ERROR: i32 = -32700;

/// A failed remote call, as opposed to a business-level error code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fault {
    /// `faultCode` reported by the server, or one of the local codes above.
    pub code: i32,
    /// `faultString` reported by the server, or a local description.
    pub message: String,
}

impl Fault {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn transport(message: impl fmt::Display) -> Self {
        Self::new(TRANSPORT_ERROR, format!("transport error: {message}"))
    }

    pub fn parse(message: impl fmt::Display) -> Self {
        Self::new(PARSE_ERROR, format!("parse error: {message}"))
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}

impl std::error::Error for Fault {}

/// Executes remote procedure calls with a credential as the first argument.
///
/// Implementations must surface every failure, timeouts included, as a
/// [`Fault`]; they never panic and never retry.
pub trait Transport {
    fn call(
        &self,
        method: &str,
        credential: &Credential,
        args: &[Value],
    ) -> impl Future<Output = Result<Value, Fault>> + Send;
}
