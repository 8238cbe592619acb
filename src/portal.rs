//! The client facade.

use serde_json::Value;

use crate::api::client::ClientOps;
use crate::api::key::KeyOps;
use crate::config::PortalConfig;
use crate::credential::Credential;
use crate::errors::KeyAdminResult;
use crate::operation::{Dispatcher, Operation, Outcome};
use crate::response::Response;
use crate::transport::{HttpTransport, Transport};

/// A connection to the Key Administrator gateway.
///
/// Owns the credential and the transport; every call goes through the
/// operation registry, so the remote method names used on the wire are fixed.
///
/// # Example
///
/// ```no_run
/// use keyadmin::config::PortalConfig;
/// use keyadmin::portal::Portal;
///
/// # async fn run() -> keyadmin::errors::KeyAdminResult<()> {
/// let config = PortalConfig::new("ka.example.com").with_credentials("reseller", "secret");
/// let portal = Portal::connect(&config)?;
///
/// if portal.client().login_valid().await? {
///     let info = portal.key().metadata("PLSK.00000000.0000").await?;
///     println!("{}", info);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Portal<T = HttpTransport> {
    dispatcher: Dispatcher<T>,
}

impl Portal<HttpTransport> {
    /// Validate `config` and open an HTTP transport for it.
    pub fn connect(config: &PortalConfig) -> KeyAdminResult<Self> {
        config.validate()?;
        let transport = HttpTransport::new(config)?;
        Ok(Self::with_transport(config.credential(), transport))
    }
}

impl<T: Transport> Portal<T> {
    pub fn with_transport(credential: Credential, transport: T) -> Self {
        Self {
            dispatcher: Dispatcher::new(credential, transport),
        }
    }

    pub fn credential(&self) -> &Credential {
        self.dispatcher.credential()
    }

    pub fn transport(&self) -> &T {
        self.dispatcher.transport()
    }

    /// License key operations.
    pub fn key(&self) -> KeyOps<'_, T> {
        KeyOps::new(&self.dispatcher)
    }

    /// Client account operations.
    pub fn client(&self) -> ClientOps<'_, T> {
        ClientOps::new(&self.dispatcher)
    }

    /// Run an operation by domain name, e.g. `"key.metadata"`.
    pub async fn invoke(&self, name: &str, args: Vec<Value>) -> KeyAdminResult<Outcome> {
        self.dispatcher.invoke(name, args).await
    }

    /// Run an operation from the registry.
    pub async fn dispatch(&self, operation: Operation, args: Vec<Value>) -> KeyAdminResult<Outcome> {
        self.dispatcher.dispatch(operation, args).await
    }

    /// Call a remote method by its wire name, bypassing the registry.
    ///
    /// The credential is still prepended. Prefer the typed operations.
    pub async fn request(&self, method: &str, args: &[Value]) -> Response {
        self.dispatcher.call(method, args).await
    }
}
