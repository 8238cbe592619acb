//! Classification of raw gateway results.
//!
//! Every remote call ends in exactly one [`Response`]: either the result
//! struct the gateway returned (carrying its own `resultCode` and
//! `resultDesc`), or a transport fault mapped to code `-1`.
//!
//! Success is decided by the hundreds digit of the code: the gateway reserves
//! `1xx` for success, `2xx` for business-logic errors, `3xx` for remote
//! server errors and `4xx` for malformed requests.

use std::fmt;
use std::ops::Index;

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::transport::Fault;

/// Code of a response built from a transport fault.
pub const FAULT_CODE: i32 = -1;

/// Code of a raw result that carried no `resultCode`.
pub const NO_CODE: i32 = 0;

/// Code whose description is used for anything not in the table.
pub const INVALID_CODE: i32 = 999;

const RESULT_CODE: &str = "resultCode";
const RESULT_DESC: &str = "resultDesc";

/// Response codes as documented for the partner gateway.
pub const RESPONSE_CODES: &[(i32, &str)] = &[
    (FAULT_CODE, "Transport-level fault"),
    (NO_CODE, "No response, or no response code given"),
    // 1xx: success
    (100, "Success"),
    (101, "No results"),
    // 2xx: business logic errors
    (200, "Authorization failed"),
    (201, "Method access denied"),
    (202, "Object access denied"),
    (251, "Login already exists"),
    // 3xx: remote server errors
    (300, "Remote server internal error"),
    // 4xx: bad requests
    (400, "Invalid authorization format"),
    (401, "Invalid server format"),
    (431, "Invalid login format"),
    (432, "Invalid password format"),
    (433, "Invalid first name format"),
    (434, "Invalid last name format"),
    (435, "Invalid company format"),
    (436, "Invalid address format"),
    (437, "Invalid email format"),
    (438, "Invalid phone format"),
    (439, "Invalid fax format"),
    (440, "Invalid city format"),
    (441, "Invalid zip code format"),
    (442, "Invalid state format"),
    (443, "Invalid country format"),
    (444, "Invalid language format"),
    (447, "First name too long"),
    (448, "Last name too long"),
    (450, "Email too long"),
    (451, "No search parameters defined"),
    (INVALID_CODE, "Invalid response code"),
];

/// Description of a response code, falling back to the `999` entry.
pub fn describe(code: i32) -> &'static str {
    let lookup = |wanted: i32| {
        RESPONSE_CODES
            .iter()
            .find(|(code, _)| *code == wanted)
            .map(|(_, message)| *message)
    };
    lookup(code)
        .or_else(|| lookup(INVALID_CODE))
        .unwrap_or("Invalid response code")
}

lazy_static! {
    static ref NESTING: Regex = Regex::new(r"/(.?)").expect("valid nesting pattern");
    static ref SEPARATOR: Regex = Regex::new(r"(?:_+|-+)([a-z])").expect("valid separator pattern");
    static ref LEADING_CAPITAL: Regex =
        Regex::new(r"(\A|\s)([A-Z])").expect("valid leading capital pattern");
}

/// Convert a snake_case or hyphenated name to the gateway's lowerCamelCase.
///
/// A `/` becomes `::` and capitalizes the next character, so `a/b` maps to
/// `a::B`. Names already in lowerCamelCase are returned unchanged.
pub fn normalize_key(name: &str) -> String {
    let nested = NESTING.replace_all(name, |caps: &Captures| format!("::{}", caps[1].to_uppercase()));
    let camel = SEPARATOR.replace_all(&nested, |caps: &Captures| caps[1].to_uppercase());
    LEADING_CAPITAL
        .replace_all(&camel, |caps: &Captures| {
            format!("{}{}", &caps[1], caps[2].to_lowercase())
        })
        .into_owned()
}

/// The classified outcome of one remote call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    code: i32,
    message: String,
    data: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fault: Option<Fault>,
}

impl Response {
    /// Classify a raw result.
    ///
    /// `resultCode` and `resultDesc` are removed from the result and the
    /// remaining members become [`data`](Self::data). A missing code is `0`;
    /// a code that is present but not numeric is `999`. A missing description
    /// comes from the code table.
    pub fn from_result(raw: Value) -> Self {
        let mut data = match raw {
            Value::Object(members) => members,
            Value::Null => Map::new(),
            other => {
                let mut data = Map::new();
                data.insert("result".to_string(), other);
                data
            }
        };

        let code = match data.remove(RESULT_CODE) {
            Some(value) => parse_code(&value).unwrap_or(INVALID_CODE),
            None => NO_CODE,
        };
        let message = match data.remove(RESULT_DESC) {
            Some(Value::String(message)) => message,
            _ => describe(code).to_string(),
        };

        Self {
            code,
            message,
            data,
            fault: None,
        }
    }

    /// Classify a transport fault. The code is always `-1`.
    pub fn from_fault(fault: Fault) -> Self {
        Self {
            code: FAULT_CODE,
            message: format!("{} ({})", fault.message, fault.code),
            data: Map::new(),
            fault: Some(fault),
        }
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn into_data(self) -> Map<String, Value> {
        self.data
    }

    /// The fault this response was built from, if any.
    pub fn fault(&self) -> Option<&Fault> {
        self.fault.as_ref()
    }

    /// True iff the code is in the 1xx range (ignoring higher-order digits).
    pub fn is_success(&self) -> bool {
        self.code.rem_euclid(1000).div_euclid(100) == 1
    }

    pub fn is_error(&self) -> bool {
        !self.is_success()
    }

    pub fn is_fault(&self) -> bool {
        self.code == FAULT_CODE
    }

    /// Look up a data field by domain-style name, e.g. `new_password`.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(&normalize_key(name))
    }

    /// Like [`field`](Self::field), for string values.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }
}

static NULL: Value = Value::Null;

impl Index<&str> for Response {
    type Output = Value;

    /// Absent fields index to `null`.
    fn index(&self, name: &str) -> &Value {
        self.field(name).unwrap_or(&NULL)
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

fn parse_code(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|code| i32::try_from(code).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn with_code(code: i32) -> Response {
        Response::from_result(json!({ "resultCode": code }))
    }

    #[test]
    fn success_codes_are_the_1xx_range() {
        for code in [100, 101, 1100] {
            assert!(with_code(code).is_success(), "{code} should succeed");
        }
    }

    #[test]
    fn every_other_documented_code_is_an_error() {
        let mut codes = vec![0, 200, 201, 202, 251, 300, 400, 401, 447, 448, 450, 451, 999, -1];
        codes.extend(431..=444);
        for code in codes {
            let response = with_code(code);
            assert!(!response.is_success(), "{code} should fail");
            assert!(response.is_error());
        }
    }

    #[test]
    fn code_and_description_are_removed_from_data() {
        let response = Response::from_result(json!({
            "resultCode": 100,
            "resultDesc": "Operation completed",
            "keyNumber": "PLSK.00000000.0000",
        }));

        assert_eq!(response.code(), 100);
        assert_eq!(response.message(), "Operation completed");
        assert_eq!(response.data().len(), 1);
        assert_eq!(response.field_str("key_number"), Some("PLSK.00000000.0000"));
    }

    #[test]
    fn missing_code_defaults_to_zero_with_table_message() {
        let response = Response::from_result(json!({ "keyNumber": "PLSK.1" }));
        assert_eq!(response.code(), 0);
        assert_eq!(response.message(), "No response, or no response code given");
        assert!(response.is_error());
    }

    #[test]
    fn missing_description_comes_from_table() {
        assert_eq!(with_code(437).message(), "Invalid email format");
        assert_eq!(with_code(123).message(), "Invalid response code");
    }

    #[test]
    fn textual_and_garbage_codes() {
        assert_eq!(Response::from_result(json!({ "resultCode": "101" })).code(), 101);
        assert_eq!(Response::from_result(json!({ "resultCode": "n/a" })).code(), 999);
    }

    #[test]
    fn non_struct_result_is_kept_under_result() {
        let response = Response::from_result(json!(["PLSK.1", "PLSK.2"]));
        assert_eq!(response.code(), 0);
        assert_eq!(response["result"], json!(["PLSK.1", "PLSK.2"]));
    }

    #[test]
    fn fault_maps_to_minus_one() {
        let response = Response::from_fault(Fault::new(7, "bad"));
        assert_eq!(response.code(), -1);
        assert_eq!(response.message(), "bad (7)");
        assert!(response.data().is_empty());
        assert!(response.is_fault());
        assert!(response.is_error());
        assert_eq!(response.fault(), Some(&Fault::new(7, "bad")));
    }

    #[test]
    fn normalize_key_rules() {
        assert_eq!(normalize_key("first_name"), "firstName");
        assert_eq!(normalize_key("new-password"), "newPassword");
        assert_eq!(normalize_key("a/b"), "a::B");
        assert_eq!(normalize_key("company__name"), "companyName");
        assert_eq!(normalize_key("KeyNumber"), "keyNumber");
        assert_eq!(normalize_key("keyNumber"), "keyNumber");
        assert_eq!(normalize_key(&normalize_key("keyNumber")), "keyNumber");
    }

    #[test]
    fn absent_fields_are_none_and_index_to_null() {
        let response = with_code(100);
        assert!(response.field("anything").is_none());
        assert!(response["anything"].is_null());
    }

    #[test]
    fn display_shows_code_and_message() {
        assert_eq!(with_code(200).to_string(), "200: Authorization failed");
    }
}
