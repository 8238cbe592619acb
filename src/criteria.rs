//! Criteria builders.
//!
//! Each builder copies the recognized keys of a loosely structured option
//! mapping into a fixed-shape record the gateway accepts as an argument.
//! Recognized values are copied as given, without conversion. Unrecognized
//! keys are ignored; absent keys (or keys mapped to `null`) take the
//! record's default. Builders never fail.

use serde_json::{json, Map, Value};

/// Loosely structured caller input, keyed by snake_case option names.
pub type Criteria = Map<String, Value>;

/// The value under `key`, with `null` treated as absent.
fn value(criteria: &Criteria, key: &str) -> Option<Value> {
    criteria.get(key).filter(|v| !v.is_null()).cloned()
}

/// First non-null of several alternate keys.
fn first_value(criteria: &Criteria, keys: &[&str]) -> Option<Value> {
    keys.iter().find_map(|key| value(criteria, key))
}

/// Search fields for `partner10.searchClients`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientSearchInfo {
    pub first_name: Option<Value>,
    pub last_name: Option<Value>,
    pub company_name: Option<Value>,
    pub email: Option<Value>,
    pub key_number: Option<Value>,
}

impl ClientSearchInfo {
    /// Build from `first_name`, `last_name`, `company_name`, `email` and
    /// `key_number`.
    pub fn from_criteria(criteria: &Criteria) -> Self {
        Self {
            first_name: value(criteria, "first_name"),
            last_name: value(criteria, "last_name"),
            company_name: value(criteria, "company_name"),
            email: value(criteria, "email"),
            key_number: value(criteria, "key_number"),
        }
    }
}

impl From<ClientSearchInfo> for Value {
    fn from(info: ClientSearchInfo) -> Self {
        json!({
            "firstName": info.first_name,
            "lastName": info.last_name,
            "companyName": info.company_name,
            "email": info.email,
            "keyNumber": info.key_number,
        })
    }
}

/// IP and MAC addresses for `partner10.getKeyNumbers`.
///
/// Each field is an empty array when absent.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerAddressInfo {
    pub ips: Value,
    pub macs: Value,
}

impl Default for ServerAddressInfo {
    fn default() -> Self {
        Self {
            ips: Value::Array(Vec::new()),
            macs: Value::Array(Vec::new()),
        }
    }
}

impl ServerAddressInfo {
    pub fn from_criteria(criteria: &Criteria) -> Self {
        let defaults = Self::default();
        Self {
            ips: value(criteria, "ips").unwrap_or(defaults.ips),
            macs: value(criteria, "macs").unwrap_or(defaults.macs),
        }
    }
}

impl From<ServerAddressInfo> for Value {
    fn from(info: ServerAddressInfo) -> Self {
        json!({ "ips": info.ips, "macs": info.macs })
    }
}

/// Account details for client creation.
///
/// `zip` accepts `zip_code` or `postal_code`, `state` accepts `state` or
/// `province`; the first non-null wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientInfo {
    pub login: Option<Value>,
    pub password: Option<Value>,
    pub first_name: Option<Value>,
    pub last_name: Option<Value>,
    pub company: Option<Value>,
    pub address: Option<Value>,
    pub email: Option<Value>,
    pub phone: Option<Value>,
    pub fax: Option<Value>,
    pub city: Option<Value>,
    pub zip: Option<Value>,
    pub state: Option<Value>,
    pub country: Option<Value>,
    pub language: Option<Value>,
    pub email_language: Option<Value>,
}

impl ClientInfo {
    pub fn from_details(details: &Criteria) -> Self {
        Self {
            login: value(details, "username"),
            password: value(details, "password"),
            first_name: value(details, "first_name"),
            last_name: value(details, "last_name"),
            company: value(details, "company"),
            address: value(details, "address"),
            email: value(details, "email"),
            phone: value(details, "phone"),
            fax: value(details, "fax"),
            city: value(details, "city"),
            zip: first_value(details, &["zip_code", "postal_code"]),
            state: first_value(details, &["state", "province"]),
            country: value(details, "country"),
            language: value(details, "language"),
            email_language: value(details, "email_language"),
        }
    }
}

impl From<ClientInfo> for Value {
    fn from(info: ClientInfo) -> Self {
        json!({
            "login": info.login,
            "password": info.password,
            "firstName": info.first_name,
            "lastName": info.last_name,
            "company": info.company,
            "address": info.address,
            "email": info.email,
            "phone": info.phone,
            "fax": info.fax,
            "city": info.city,
            "zip": info.zip,
            "state": info.state,
            "country": info.country,
            "language": info.language,
            "email_language": info.email_language,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criteria(value: Value) -> Criteria {
        match value {
            Value::Object(map) => map,
            _ => panic!("test criteria must be an object"),
        }
    }

    #[test]
    fn client_search_copies_recognized_keys_only() {
        let info = ClientSearchInfo::from_criteria(&criteria(json!({
            "email": "x@y.com",
            "nickname": "ignored",
        })));

        assert_eq!(
            Value::from(info),
            json!({
                "firstName": null,
                "lastName": null,
                "companyName": null,
                "email": "x@y.com",
                "keyNumber": null,
            })
        );
    }

    #[test]
    fn server_address_defaults_to_empty_lists() {
        let info = ServerAddressInfo::from_criteria(&Criteria::new());
        assert_eq!(Value::from(info), json!({ "ips": [], "macs": [] }));
    }

    #[test]
    fn server_address_passes_values_through() {
        let info = ServerAddressInfo::from_criteria(&criteria(json!({
            "ips": ["10.0.0.1", 167772162],
            "macs": "00:1A:2B:3C:4D:5E",
        })));
        assert_eq!(info.ips, json!(["10.0.0.1", 167772162]));
        assert_eq!(info.macs, json!("00:1A:2B:3C:4D:5E"));

        let info = ServerAddressInfo::from_criteria(&criteria(json!({ "ips": null })));
        assert_eq!(info.ips, json!([]));
    }

    #[test]
    fn client_search_keeps_non_string_values() {
        let value = Value::from(ClientSearchInfo::from_criteria(&criteria(json!({
            "key_number": ["PLSK.1", "PLSK.2"],
            "company_name": { "like": "Acme" },
            "email": 42,
        }))));
        assert_eq!(value["keyNumber"], json!(["PLSK.1", "PLSK.2"]));
        assert_eq!(value["companyName"], json!({ "like": "Acme" }));
        assert_eq!(value["email"], json!(42));
        assert!(value["firstName"].is_null());
    }

    #[test]
    fn client_details_prefer_first_alternate_key() {
        let info = ClientInfo::from_details(&criteria(json!({
            "zip_code": "10001",
            "postal_code": "H0H 0H0",
            "province": "Ontario",
        })));
        assert_eq!(info.zip, Some(json!("10001")));
        assert_eq!(info.state, Some(json!("Ontario")));
    }

    #[test]
    fn client_details_skip_null_alternates() {
        let info = ClientInfo::from_details(&criteria(json!({
            "zip_code": null,
            "postal_code": "H0H 0H0",
            "state": "NY",
            "province": "Ontario",
        })));
        assert_eq!(info.zip, Some(json!("H0H 0H0")));
        assert_eq!(info.state, Some(json!("NY")));
    }

    #[test]
    fn client_details_wire_shape_uses_login_and_email_language() {
        let value = Value::from(ClientInfo::from_details(&criteria(json!({
            "username": "jdoe",
            "first_name": "Jane",
            "email_language": "en",
        }))));
        assert_eq!(value["login"], "jdoe");
        assert_eq!(value["firstName"], "Jane");
        assert_eq!(value["email_language"], "en");
        assert!(value["zip"].is_null());
    }
}
