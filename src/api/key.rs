//! License key operations.

use serde_json::{json, Map, Value};

use crate::criteria::Criteria;
use crate::errors::KeyAdminResult;
use crate::operation::{Dispatcher, Operation};
use crate::response::Response;
use crate::transport::Transport;

/// Key operations of a [`Portal`](crate::portal::Portal).
///
/// Obtained through [`Portal::key`](crate::portal::Portal::key). Every method
/// issues exactly one remote call, except [`create`](Self::create) and
/// [`upgrade`](Self::upgrade), which the gateway client does not support.
#[derive(Debug)]
pub struct KeyOps<'a, T> {
    dispatcher: &'a Dispatcher<T>,
}

impl<'a, T: Transport> KeyOps<'a, T> {
    pub(crate) fn new(dispatcher: &'a Dispatcher<T>) -> Self {
        Self { dispatcher }
    }

    /// Activate a key that is not hardware-bound.
    pub async fn activate(&self, key_number: &str) -> KeyAdminResult<Response> {
        self.dispatcher
            .dispatch_as(Operation::KeyActivate, vec![json!(key_number)])
            .await
    }

    /// Activate a hardware-bound key against the given hardware UID.
    pub async fn activate_with_hwid(&self, key_number: &str, uid: &str) -> KeyAdminResult<Response> {
        self.dispatcher
            .dispatch_as(
                Operation::KeyActivateWithHwid,
                vec![json!(key_number), json!(uid)],
            )
            .await
    }

    /// Attach a note that shows up with the key in the portal.
    pub async fn add_note(&self, key_number: &str, note: &str) -> KeyAdminResult<Response> {
        self.dispatcher
            .dispatch_as(Operation::KeyAddNote, vec![json!(key_number), json!(note)])
            .await
    }

    /// Associate a child key with a main key.
    pub async fn attach(&self, main_key: &str, child_key: &str) -> KeyAdminResult<Response> {
        self.dispatcher
            .dispatch_as(Operation::KeyAttach, vec![json!(main_key), json!(child_key)])
            .await
    }

    /// Detach a child key from its main key.
    pub async fn detach(&self, child_key: &str) -> KeyAdminResult<Response> {
        self.dispatcher
            .dispatch_as(Operation::KeyDetach, vec![json!(child_key)])
            .await
    }

    /// Bind a key to an IP address.
    pub async fn bind(&self, key_number: &str, address: &str) -> KeyAdminResult<Response> {
        self.dispatcher
            .dispatch_as(Operation::KeyBind, vec![json!(key_number), json!(address)])
            .await
    }

    /// Unbind a key from its IP address.
    pub async fn unbind(&self, key_number: &str) -> KeyAdminResult<Response> {
        self.dispatcher
            .dispatch_as(Operation::KeyUnbind, vec![json!(key_number)])
            .await
    }

    /// Order a new key. Always fails with
    /// [`Unsupported`](crate::errors::KeyAdminError::Unsupported).
    pub async fn create(&self, args: Vec<Value>) -> KeyAdminResult<Response> {
        self.dispatcher.dispatch_as(Operation::KeyCreate, args).await
    }

    /// Upgrade a key to a plan. Always fails with
    /// [`Unsupported`](crate::errors::KeyAdminError::Unsupported).
    pub async fn upgrade(&self, key_number: &str, plan: &str) -> KeyAdminResult<Response> {
        self.dispatcher
            .dispatch_as(Operation::KeyUpgrade, vec![json!(key_number), json!(plan)])
            .await
    }

    /// Downgrade a key to a plan.
    pub async fn downgrade(&self, key_number: &str, plan: &str) -> KeyAdminResult<Response> {
        self.dispatcher
            .dispatch_as(Operation::KeyDowngrade, vec![json!(key_number), json!(plan)])
            .await
    }

    /// Key types and features the reseller may purchase.
    pub async fn available_types_and_features(&self, reseller: &str) -> KeyAdminResult<Response> {
        self.dispatcher
            .dispatch_as(Operation::KeyAvailableTypesAndFeatures, vec![json!(reseller)])
            .await
    }

    pub async fn available_upgrades(&self, key_number: &str) -> KeyAdminResult<Response> {
        self.dispatcher
            .dispatch_as(Operation::KeyAvailableUpgrades, vec![json!(key_number)])
            .await
    }

    /// Key information by key number.
    pub async fn metadata(&self, key_number: &str) -> KeyAdminResult<Response> {
        self.dispatcher
            .dispatch_as(Operation::KeyMetadata, vec![json!(key_number)])
            .await
    }

    /// Keys bound to an IP address.
    pub async fn lookup(&self, address: &str) -> KeyAdminResult<Response> {
        self.dispatcher
            .dispatch_as(Operation::KeyLookup, vec![json!(address)])
            .await
    }

    /// Key numbers attached to any of the given `ips` or `macs`.
    pub async fn find_by(&self, criteria: Criteria) -> KeyAdminResult<Response> {
        self.dispatcher
            .dispatch_as(Operation::KeyFindBy, vec![Value::Object(criteria)])
            .await
    }

    /// Last usage report sent for the key.
    pub async fn last_usage_info(&self, key_number: &str) -> KeyAdminResult<Response> {
        self.dispatcher
            .dispatch_as(Operation::KeyLastUsageInfo, vec![json!(key_number)])
            .await
    }

    pub async fn renew(&self, key_number: &str) -> KeyAdminResult<Response> {
        self.dispatcher
            .dispatch_as(Operation::KeyRenew, vec![json!(key_number)])
            .await
    }

    /// Reset the hardware UID and deactivate the key.
    pub async fn reset(&self, key_number: &str) -> KeyAdminResult<Response> {
        self.dispatcher
            .dispatch_as(Operation::KeyReset, vec![json!(key_number)])
            .await
    }

    /// The key file, as the response data on success and `None` otherwise.
    ///
    /// `compatible` asks for a key usable by earlier product versions.
    pub async fn retrieve(
        &self,
        key_number: &str,
        compatible: bool,
    ) -> KeyAdminResult<Option<Map<String, Value>>> {
        self.dispatcher
            .dispatch_as(
                Operation::KeyRetrieve,
                vec![json!(key_number), json!(compatible)],
            )
            .await
    }

    /// Mail the key to `recipient`, optionally zipped.
    pub async fn send_by_email(
        &self,
        key_number: &str,
        recipient: &str,
        compressed: bool,
    ) -> KeyAdminResult<Response> {
        self.dispatcher
            .dispatch_as(
                Operation::KeySendByEmail,
                vec![json!(key_number), json!(recipient), json!(compressed)],
            )
            .await
    }

    pub async fn terminate(&self, key_number: &str) -> KeyAdminResult<Response> {
        self.dispatcher
            .dispatch_as(Operation::KeyTerminate, vec![json!(key_number)])
            .await
    }

    /// Move a hardware-bound key to another hardware ID.
    pub async fn transfer(&self, key_number: &str, hardware_id: &str) -> KeyAdminResult<Response> {
        self.dispatcher
            .dispatch_as(
                Operation::KeyTransfer,
                vec![json!(key_number), json!(hardware_id)],
            )
            .await
    }
}
