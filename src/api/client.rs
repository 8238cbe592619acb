//! Reseller client account operations.

use serde_json::{Map, Value};

use crate::criteria::Criteria;
use crate::errors::KeyAdminResult;
use crate::operation::{Dispatcher, Operation};
use crate::response::Response;
use crate::transport::Transport;

/// Client account operations of a [`Portal`](crate::portal::Portal).
#[derive(Debug)]
pub struct ClientOps<'a, T> {
    dispatcher: &'a Dispatcher<T>,
}

impl<'a, T: Transport> ClientOps<'a, T> {
    pub(crate) fn new(dispatcher: &'a Dispatcher<T>) -> Self {
        Self { dispatcher }
    }

    /// Create a client account. Always fails with
    /// [`Unsupported`](crate::errors::KeyAdminError::Unsupported).
    pub async fn create(&self, details: Criteria) -> KeyAdminResult<Response> {
        self.dispatcher
            .dispatch_as(Operation::ClientCreate, vec![Value::Object(details)])
            .await
    }

    /// Search clients by `first_name`, `last_name`, `company_name`, `email`
    /// or `key_number`. Returns the result data on success.
    pub async fn find_by(&self, criteria: Criteria) -> KeyAdminResult<Option<Map<String, Value>>> {
        self.dispatcher
            .dispatch_as(Operation::ClientFindBy, vec![Value::Object(criteria)])
            .await
    }

    /// Whether the configured credentials are accepted.
    pub async fn login_valid(&self) -> KeyAdminResult<bool> {
        self.dispatcher
            .dispatch_as(Operation::ClientLoginValid, Vec::new())
            .await
    }

    /// Generate a new password for the configured login.
    ///
    /// Returns `None` when the gateway refuses.
    pub async fn generate_new_password(&self) -> KeyAdminResult<Option<String>> {
        let password: Option<Value> = self
            .dispatcher
            .dispatch_as(Operation::ClientGenerateNewPassword, Vec::new())
            .await?;
        Ok(password.and_then(|value| value.as_str().map(str::to_string)))
    }
}
