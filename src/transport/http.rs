//! XML-RPC over HTTP(S), backed by `reqwest`.

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, trace};

use super::{xmlrpc, Fault, Transport, TRANSPORT_ERROR};
use crate::config::PortalConfig;
use crate::credential::Credential;
use crate::errors::KeyAdminResult;

/// HTTP transport for the gateway.
///
/// Connection settings (TLS, certificate verification, timeout, wire tracing)
/// are fixed at construction from a [`PortalConfig`]. One `reqwest::Client`
/// is shared by every call.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    timeout_ms: u64,
    debug: bool,
}

impl HttpTransport {
    /// Build a transport for the configured endpoint.
    ///
    /// Fails only if the underlying HTTP client cannot be constructed.
    pub fn new(config: &PortalConfig) -> KeyAdminResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint(),
            timeout_ms: config.timeout_ms,
            debug: config.debug,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_failed(&self, err: reqwest::Error) -> Fault {
        if err.is_timeout() {
            Fault::transport(format!("request timed out after {}ms", self.timeout_ms))
        } else {
            Fault::transport(err)
        }
    }
}

impl Transport for HttpTransport {
    async fn call(
        &self,
        method: &str,
        credential: &Credential,
        args: &[Value],
    ) -> Result<Value, Fault> {
        if self.debug {
            // Arguments only; the credential is never traced.
            trace!(method, body = %xmlrpc::encode_call(method, args), "xml-rpc request");
        }

        let mut params = Vec::with_capacity(args.len() + 1);
        params.push(credential.to_value());
        params.extend_from_slice(args);

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "text/xml")
            .body(xmlrpc::encode_call(method, &params))
            .send()
            .await
            .map_err(|e| self.request_failed(e))?;

        let status = response.status();
        if !status.is_success() {
            debug!(method, status = %status, "gateway returned non-success status");
            return Err(Fault::new(TRANSPORT_ERROR, format!("HTTP status {status}")));
        }

        let body = response.text().await.map_err(|e| self.request_failed(e))?;
        if self.debug {
            trace!(method, %body, "xml-rpc response");
        }

        xmlrpc::decode_response(&body)
    }
}
