//! The static operation registry and the dispatcher.
//!
//! Each domain operation (`key.bind`, `client.find_by`, ...) is an
//! [`Operation`] variant with a fixed [`Descriptor`]: the remote method it
//! calls, how its arguments are shaped and how the [`Response`] is projected
//! into the caller's result. The [`Dispatcher`] executes one operation per
//! call: shape arguments, call the transport with the credential prepended,
//! classify the result, apply the transform.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info_span, warn, Instrument};
use uuid::Uuid;

use crate::credential::Credential;
use crate::criteria::{ClientInfo, ClientSearchInfo, Criteria, ServerAddressInfo};
use crate::errors::{KeyAdminError, KeyAdminResult};
use crate::response::Response;
use crate::transport::Transport;

/// How caller arguments become remote arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentShape {
    /// Passed through as-is; exactly one argument per name.
    Positional(&'static [&'static str]),
    /// One criteria mapping shaped by [`ClientSearchInfo`].
    ClientSearch,
    /// One criteria mapping shaped by [`ServerAddressInfo`].
    ServerAddress,
    /// One details mapping shaped by [`ClientInfo`].
    ClientDetails,
}

/// How a [`Response`] becomes the caller's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// The response itself.
    Response,
    /// Whether the call succeeded.
    Success,
    /// One data field if the call succeeded.
    Field(&'static str),
    /// All data fields if the call succeeded.
    Data,
}

impl Transform {
    pub fn apply(self, response: Response) -> Outcome {
        match self {
            Transform::Response => Outcome::Response(response),
            Transform::Success => Outcome::Flag(response.is_success()),
            Transform::Field(name) => Outcome::Value(
                response
                    .is_success()
                    .then(|| response.field(name).cloned())
                    .flatten(),
            ),
            Transform::Data => {
                Outcome::Data(response.is_success().then(|| response.into_data()))
            }
        }
    }
}

/// Static description of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    pub operation: Operation,
    pub remote_method: &'static str,
    pub arguments: ArgumentShape,
    pub transform: Transform,
    /// Unsupported operations fail before any remote call.
    pub supported: bool,
}

impl Descriptor {
    const fn new(
        operation: Operation,
        remote_method: &'static str,
        arguments: ArgumentShape,
    ) -> Self {
        Self {
            operation,
            remote_method,
            arguments,
            transform: Transform::Response,
            supported: true,
        }
    }

    const fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    const fn unsupported(mut self) -> Self {
        self.supported = false;
        self
    }

    /// Turn caller arguments into the remote argument list.
    pub fn shape(&self, args: Vec<Value>) -> KeyAdminResult<Vec<Value>> {
        let invalid = |reason: String| KeyAdminError::InvalidArguments {
            operation: self.operation,
            reason,
        };

        match self.arguments {
            ArgumentShape::Positional(names) => {
                if args.len() != names.len() {
                    return Err(invalid(format!(
                        "expected {} argument(s) ({}), got {}",
                        names.len(),
                        names.join(", "),
                        args.len()
                    )));
                }
                Ok(args)
            }
            shape => {
                let criteria = single_criteria(args).map_err(invalid)?;
                let record: Value = match shape {
                    ArgumentShape::ClientSearch => {
                        ClientSearchInfo::from_criteria(&criteria).into()
                    }
                    ArgumentShape::ServerAddress => {
                        ServerAddressInfo::from_criteria(&criteria).into()
                    }
                    _ => ClientInfo::from_details(&criteria).into(),
                };
                Ok(vec![record])
            }
        }
    }
}

fn single_criteria(args: Vec<Value>) -> Result<Criteria, String> {
    if args.len() > 1 {
        return Err(format!("expected one criteria mapping, got {} arguments", args.len()));
    }
    match args.into_iter().next() {
        None | Some(Value::Null) => Ok(Criteria::new()),
        Some(Value::Object(criteria)) => Ok(criteria),
        Some(_) => Err("criteria must be a mapping".to_string()),
    }
}

macro_rules! operations {
    ($($variant:ident => $name:literal,)+) => {
        /// Every operation the client knows about.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Operation {
            $($variant,)+
        }

        impl Operation {
            /// All operations, in registry order.
            pub const ALL: &'static [Operation] = &[$(Operation::$variant,)+];

            /// Domain name, e.g. `key.bind`.
            pub fn name(self) -> &'static str {
                match self {
                    $(Operation::$variant => $name,)+
                }
            }
        }

        impl FromStr for Operation {
            type Err = KeyAdminError;

            fn from_str(name: &str) -> Result<Self, Self::Err> {
                match name {
                    $($name => Ok(Operation::$variant),)+
                    other => Err(KeyAdminError::UnknownOperation(other.to_string())),
                }
            }
        }
    };
}

operations! {
    KeyActivate => "key.activate",
    KeyActivateWithHwid => "key.activate_with_hwid",
    KeyAddNote => "key.add_note",
    KeyAttach => "key.attach",
    KeyDetach => "key.detach",
    KeyBind => "key.bind",
    KeyUnbind => "key.unbind",
    KeyCreate => "key.create",
    KeyUpgrade => "key.upgrade",
    KeyDowngrade => "key.downgrade",
    KeyAvailableTypesAndFeatures => "key.available_types_and_features",
    KeyAvailableUpgrades => "key.available_upgrades",
    KeyMetadata => "key.metadata",
    KeyLookup => "key.lookup",
    KeyFindBy => "key.find_by",
    KeyLastUsageInfo => "key.last_usage_info",
    KeyRenew => "key.renew",
    KeyReset => "key.reset",
    KeyRetrieve => "key.retrieve",
    KeySendByEmail => "key.send_by_email",
    KeyTerminate => "key.terminate",
    KeyTransfer => "key.transfer",
    ClientCreate => "client.create",
    ClientFindBy => "client.find_by",
    ClientLoginValid => "client.login_valid",
    ClientGenerateNewPassword => "client.generate_new_password",
}

impl Operation {
    /// The registry entry for this operation.
    pub const fn descriptor(self) -> Descriptor {
        use ArgumentShape::*;
        use Operation::*;

        const KEY: &[&str] = &["key_number"];

        match self {
            KeyActivate => Descriptor::new(self, "partner10.activateKey", Positional(KEY)),
            KeyActivateWithHwid => Descriptor::new(
                self,
                "partner10.activateKey",
                Positional(&["key_number", "uid"]),
            ),
            KeyAddNote => Descriptor::new(
                self,
                "partner10.addNoteToKey",
                Positional(&["key_number", "note"]),
            ),
            KeyAttach => Descriptor::new(
                self,
                "partner10.attachKey",
                Positional(&["main_key", "child_key"]),
            ),
            KeyDetach => Descriptor::new(self, "partner10.detachKey", Positional(&["child_key"])),
            KeyBind => Descriptor::new(
                self,
                "partner10.bindKey",
                Positional(&["key_number", "address"]),
            ),
            KeyUnbind => Descriptor::new(self, "partner10.unbindKey", Positional(KEY)),
            KeyCreate => Descriptor::new(self, "partner10.createKey", Positional(&[])).unsupported(),
            KeyUpgrade => Descriptor::new(
                self,
                "partner10.upgradeKey",
                Positional(&["key_number", "plan"]),
            )
            .unsupported(),
            KeyDowngrade => Descriptor::new(
                self,
                "partner10.downgradeKey",
                Positional(&["key_number", "plan"]),
            ),
            KeyAvailableTypesAndFeatures => Descriptor::new(
                self,
                "partner10.getAvailableKeyTypesAndFeatures",
                Positional(&["reseller"]),
            ),
            KeyAvailableUpgrades => {
                Descriptor::new(self, "partner10.getAvailableUpgrades", Positional(KEY))
            }
            KeyMetadata => Descriptor::new(self, "partner10.getKeyInfo", Positional(KEY)),
            KeyLookup => Descriptor::new(self, "partner10.getKeysInfoByIP", Positional(&["address"])),
            KeyFindBy => Descriptor::new(self, "partner10.getKeyNumbers", ServerAddress),
            KeyLastUsageInfo => {
                Descriptor::new(self, "partner10.getLastPleskUsageInfo", Positional(KEY))
            }
            KeyRenew => Descriptor::new(self, "partner10.renewKey", Positional(KEY)),
            KeyReset => Descriptor::new(self, "partner10.resetKey", Positional(KEY)),
            KeyRetrieve => Descriptor::new(
                self,
                "partner10.retrieveKey",
                Positional(&["key_number", "compatible"]),
            )
            .with_transform(Transform::Data),
            KeySendByEmail => Descriptor::new(
                self,
                "partner10.sendKeyByEmail",
                Positional(&["key_number", "recipient", "compressed"]),
            ),
            KeyTerminate => Descriptor::new(self, "partner10.terminateKey", Positional(KEY)),
            KeyTransfer => Descriptor::new(
                self,
                "partner10.transferKey",
                Positional(&["key_number", "hardware_id"]),
            ),
            ClientCreate => {
                Descriptor::new(self, "partner10.createClient", ClientDetails).unsupported()
            }
            ClientFindBy => Descriptor::new(self, "partner10.searchClients", ClientSearch)
                .with_transform(Transform::Data),
            ClientLoginValid => Descriptor::new(self, "partner10.validateLogin", Positional(&[]))
                .with_transform(Transform::Success),
            ClientGenerateNewPassword => {
                Descriptor::new(self, "partner10.generateNewPassword", Positional(&[]))
                    .with_transform(Transform::Field("newPassword"))
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a dispatched operation produced, per its [`Transform`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Response(Response),
    Flag(bool),
    Value(Option<Value>),
    Data(Option<Map<String, Value>>),
}

impl Outcome {
    fn kind(&self) -> &'static str {
        match self {
            Outcome::Response(_) => "response",
            Outcome::Flag(_) => "flag",
            Outcome::Value(_) => "value",
            Outcome::Data(_) => "data",
        }
    }

    fn mismatch(self, expected: &'static str) -> KeyAdminError {
        KeyAdminError::UnexpectedOutcome {
            expected,
            found: self.kind(),
        }
    }
}

impl TryFrom<Outcome> for Response {
    type Error = KeyAdminError;

    fn try_from(outcome: Outcome) -> Result<Self, Self::Error> {
        match outcome {
            Outcome::Response(response) => Ok(response),
            other => Err(other.mismatch("response")),
        }
    }
}

impl TryFrom<Outcome> for bool {
    type Error = KeyAdminError;

    fn try_from(outcome: Outcome) -> Result<Self, Self::Error> {
        match outcome {
            Outcome::Flag(flag) => Ok(flag),
            other => Err(other.mismatch("flag")),
        }
    }
}

impl TryFrom<Outcome> for Option<Value> {
    type Error = KeyAdminError;

    fn try_from(outcome: Outcome) -> Result<Self, Self::Error> {
        match outcome {
            Outcome::Value(value) => Ok(value),
            other => Err(other.mismatch("value")),
        }
    }
}

impl TryFrom<Outcome> for Option<Map<String, Value>> {
    type Error = KeyAdminError;

    fn try_from(outcome: Outcome) -> Result<Self, Self::Error> {
        match outcome {
            Outcome::Data(data) => Ok(data),
            other => Err(other.mismatch("data")),
        }
    }
}

/// Executes operations against a transport with a fixed credential.
#[derive(Debug)]
pub struct Dispatcher<T> {
    credential: Credential,
    transport: T,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(credential: Credential, transport: T) -> Self {
        Self {
            credential,
            transport,
        }
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Resolve an operation by domain name and dispatch it.
    pub async fn invoke(&self, name: &str, args: Vec<Value>) -> KeyAdminResult<Outcome> {
        let operation: Operation = name.parse()?;
        self.dispatch(operation, args).await
    }

    /// Dispatch an operation and apply its transform.
    pub async fn dispatch(&self, operation: Operation, args: Vec<Value>) -> KeyAdminResult<Outcome> {
        let descriptor = operation.descriptor();
        if !descriptor.supported {
            return Err(KeyAdminError::Unsupported(operation));
        }
        let args = descriptor.shape(args)?;
        let response = self.call(descriptor.remote_method, &args).await;
        Ok(descriptor.transform.apply(response))
    }

    /// Dispatch an operation and convert the outcome to the caller's type.
    pub async fn dispatch_as<R>(&self, operation: Operation, args: Vec<Value>) -> KeyAdminResult<R>
    where
        R: TryFrom<Outcome, Error = KeyAdminError>,
    {
        self.dispatch(operation, args).await?.try_into()
    }

    /// Call a remote method directly and classify the result.
    ///
    /// The credential is still prepended; no transform is applied.
    pub async fn call(&self, method: &str, args: &[Value]) -> Response {
        let span = info_span!(
            "remote_call",
            request_id = %Uuid::new_v4(),
            method = %method,
        );

        async {
            let response = match self.transport.call(method, &self.credential, args).await {
                Ok(raw) => Response::from_result(raw),
                Err(fault) => {
                    warn!(fault = %fault, "remote call faulted");
                    Response::from_fault(fault)
                }
            };

            if response.is_success() {
                debug!(code = response.code(), "remote call succeeded");
            } else if !response.is_fault() {
                debug!(
                    code = response.code(),
                    message = %response.message(),
                    "remote call returned an error code"
                );
            }

            response
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn names_round_trip() {
        for operation in Operation::ALL {
            assert_eq!(operation.name().parse::<Operation>().unwrap(), *operation);
            assert_eq!(operation.to_string(), operation.name());
        }
    }

    #[test]
    fn registry_is_well_formed() {
        let mut names = HashSet::new();
        for operation in Operation::ALL {
            let descriptor = operation.descriptor();
            assert_eq!(descriptor.operation, *operation);
            assert!(names.insert(operation.name()), "duplicate {}", operation);
            assert!(
                descriptor.remote_method.starts_with("partner10."),
                "{} calls {}",
                operation,
                descriptor.remote_method
            );
        }
    }

    #[test]
    fn only_create_and_upgrade_are_unsupported() {
        let unsupported: HashSet<_> = Operation::ALL
            .iter()
            .filter(|op| !op.descriptor().supported)
            .map(|op| op.name())
            .collect();
        assert_eq!(
            unsupported,
            HashSet::from(["key.create", "key.upgrade", "client.create"])
        );
    }

    #[test]
    fn unknown_name_is_an_error() {
        let err = "key.explode".parse::<Operation>().unwrap_err();
        assert!(matches!(err, KeyAdminError::UnknownOperation(name) if name == "key.explode"));
    }

    #[test]
    fn positional_arity_is_enforced() {
        let descriptor = Operation::KeyBind.descriptor();
        assert!(descriptor.shape(vec![json!("PLSK.1")]).is_err());
        assert_eq!(
            descriptor.shape(vec![json!("PLSK.1"), json!("10.0.0.1")]).unwrap(),
            vec![json!("PLSK.1"), json!("10.0.0.1")]
        );
    }

    #[test]
    fn criteria_shapes_build_records() {
        let shaped = Operation::KeyFindBy.descriptor().shape(vec![]).unwrap();
        assert_eq!(shaped, vec![json!({ "ips": [], "macs": [] })]);

        let shaped = Operation::ClientFindBy
            .descriptor()
            .shape(vec![json!({ "email": "x@y.com" })])
            .unwrap();
        assert_eq!(shaped[0]["email"], "x@y.com");
        assert!(shaped[0]["firstName"].is_null());

        assert!(Operation::ClientFindBy
            .descriptor()
            .shape(vec![json!("x@y.com")])
            .is_err());
    }

    #[test]
    fn transforms_project_the_response() {
        let ok = || Response::from_result(json!({ "resultCode": 100, "newPassword": "abc" }));
        let denied = || Response::from_result(json!({ "resultCode": 200, "newPassword": "abc" }));

        assert_eq!(Transform::Success.apply(ok()), Outcome::Flag(true));
        assert_eq!(Transform::Success.apply(denied()), Outcome::Flag(false));
        assert_eq!(
            Transform::Field("newPassword").apply(ok()),
            Outcome::Value(Some(json!("abc")))
        );
        assert_eq!(Transform::Field("newPassword").apply(denied()), Outcome::Value(None));
        assert_eq!(Transform::Data.apply(denied()), Outcome::Data(None));
        assert!(matches!(Transform::Data.apply(ok()), Outcome::Data(Some(data)) if data["newPassword"] == "abc"));
    }

    #[test]
    fn outcome_conversion_rejects_mismatch() {
        let err = bool::try_from(Outcome::Value(None)).unwrap_err();
        assert!(matches!(
            err,
            KeyAdminError::UnexpectedOutcome { expected: "flag", found: "value" }
        ));
    }
}
