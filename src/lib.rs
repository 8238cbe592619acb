//! keyadmin - A client for the Key Administrator partner XML-RPC gateway
//!
//! The gateway manages software license keys and reseller client accounts.
//! This crate turns typed calls into XML-RPC invocations with the reseller
//! credential injected, and turns results or faults into a classified
//! [`Response`](response::Response).
//!
//! # Layout
//!
//! - [`portal::Portal`] - the facade; `portal.key()` and `portal.client()`
//!   group the operations.
//! - [`operation`] - the static registry mapping domain operations to remote
//!   methods, and the dispatcher.
//! - [`response`] - result classification and field lookup.
//! - [`criteria`] - builders for the gateway's search and address records.
//! - [`transport`] - the transport trait, the XML-RPC codec and the HTTP
//!   transport.
//!
//! # Features
//!
//! - `cli` - the `keyadmin` command-line tool. Enabled by default.
//!
//! ```toml
//! # Library only
//! key-administrator = { version = "0.1", default-features = false }
//! ```

// Core modules
pub mod config;
pub mod credential;
pub mod criteria;
pub mod errors;
pub mod logging;
pub mod operation;
pub mod portal;
pub mod response;
pub mod transport;

// Grouped operations exposed by the portal
pub mod api {
    pub mod client;
    pub mod key;
}

pub use errors::{KeyAdminError, KeyAdminResult};
pub use portal::Portal;
pub use response::Response;
