//! XML-RPC wire codec.
//!
//! Values are carried as `serde_json::Value`. Encoding is plain string
//! building with escaping; decoding goes through `quick-xml` events into a
//! small element tree which is then interpreted.
//!
//! | XML-RPC                | Value                                         |
//! |------------------------|-----------------------------------------------|
//! | `int`, `i4`, `i8`      | integer                                       |
//! | `double`               | float (`null` when not finite)                |
//! | `boolean`              | bool                                          |
//! | `string`, untyped      | string                                        |
//! | `dateTime.iso8601`     | `YYYY-MM-DDTHH:MM:SS` string when parseable   |
//! | `base64`               | decoded text, or the base64 text for binary   |
//! | `nil`                  | null                                          |
//! | `array` / `struct`     | array / object                                |

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::NaiveDateTime;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Number, Value};

use super::Fault;

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const WIRE_DATETIME: &str = "%Y%m%dT%H:%M:%S";
const ISO_DATETIME: &str = "%Y-%m-%dT%H:%M:%S";

/// Deepest element nesting accepted when decoding.
pub const MAX_DEPTH: usize = 256;

/// Encode a `methodCall` document.
pub fn encode_call(method: &str, params: &[Value]) -> String {
    let mut out = String::from(XML_DECL);
    out.push_str("<methodCall><methodName>");
    out.push_str(&escape(method));
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param>");
        write_value(&mut out, param);
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>");
    out
}

/// Encode a successful `methodResponse` document.
pub fn encode_response(value: &Value) -> String {
    let mut out = String::from(XML_DECL);
    out.push_str("<methodResponse><params><param>");
    write_value(&mut out, value);
    out.push_str("</param></params></methodResponse>");
    out
}

/// Encode a fault `methodResponse` document.
pub fn encode_fault(fault: &Fault) -> String {
    let mut members = Map::new();
    members.insert("faultCode".to_string(), Value::from(fault.code));
    members.insert("faultString".to_string(), Value::from(fault.message.as_str()));

    let mut out = String::from(XML_DECL);
    out.push_str("<methodResponse><fault>");
    write_value(&mut out, &Value::Object(members));
    out.push_str("</fault></methodResponse>");
    out
}

/// Decode a `methodResponse` document into its result value or fault.
///
/// A body that is not a well-formed response becomes a parse fault.
pub fn decode_response(body: &str) -> Result<Value, Fault> {
    let root = parse_document(body).map_err(Fault::parse)?;
    if root.name != "methodResponse" {
        return Err(Fault::parse(format!(
            "expected methodResponse, found {}",
            root.name
        )));
    }

    if let Some(fault) = root.child("fault") {
        return Err(decode_fault(fault)?);
    }

    let Some(params) = root.child("params") else {
        return Err(Fault::parse("methodResponse without params or fault"));
    };
    match params.child("param").and_then(|param| param.child("value")) {
        Some(value) => decode_value(value).map_err(Fault::parse),
        None => Ok(Value::Null),
    }
}

/// Decode a `methodCall` document into its method name and parameters.
pub fn decode_call(body: &str) -> Result<(String, Vec<Value>), Fault> {
    let root = parse_document(body).map_err(Fault::parse)?;
    if root.name != "methodCall" {
        return Err(Fault::parse(format!(
            "expected methodCall, found {}",
            root.name
        )));
    }

    let method = root
        .child("methodName")
        .map(|name| name.text.trim().to_string())
        .ok_or_else(|| Fault::parse("methodCall without methodName"))?;

    let params = match root.child("params") {
        Some(params) => params
            .children_named("param")
            .map(|param| {
                param
                    .child("value")
                    .ok_or_else(|| "param without value".to_string())
                    .and_then(decode_value)
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(Fault::parse)?,
        None => Vec::new(),
    };

    Ok((method, params))
}

fn decode_fault(fault: &Node) -> Result<Fault, Fault> {
    let value = fault
        .child("value")
        .ok_or_else(|| Fault::parse("fault without value"))?;
    let members = match decode_value(value).map_err(Fault::parse)? {
        Value::Object(members) => members,
        _ => return Err(Fault::parse("fault value is not a struct")),
    };

    let code = members
        .get("faultCode")
        .and_then(Value::as_i64)
        .and_then(|code| i32::try_from(code).ok())
        .unwrap_or_default();
    let message = members
        .get("faultString")
        .and_then(Value::as_str)
        .unwrap_or_default();

    Ok(Fault::new(code, message))
}

fn write_value(out: &mut String, value: &Value) {
    out.push_str("<value>");
    match value {
        Value::Null => out.push_str("<nil/>"),
        Value::Bool(b) => {
            out.push_str("<boolean>");
            out.push_str(if *b { "1" } else { "0" });
            out.push_str("</boolean>");
        }
        Value::Number(n) => write_number(out, n),
        Value::String(s) => {
            out.push_str("<string>");
            out.push_str(&escape(s.as_str()));
            out.push_str("</string>");
        }
        Value::Array(items) => {
            out.push_str("<array><data>");
            for item in items {
                write_value(out, item);
            }
            out.push_str("</data></array>");
        }
        Value::Object(members) => {
            out.push_str("<struct>");
            for (name, member) in members {
                out.push_str("<member><name>");
                out.push_str(&escape(name.as_str()));
                out.push_str("</name>");
                write_value(out, member);
                out.push_str("</member>");
            }
            out.push_str("</struct>");
        }
    }
    out.push_str("</value>");
}

fn write_number(out: &mut String, n: &Number) {
    match n.as_i64() {
        Some(i) if i32::try_from(i).is_ok() => out.push_str(&format!("<int>{i}</int>")),
        Some(i) => out.push_str(&format!("<i8>{i}</i8>")),
        None => {
            let f = n.as_f64().unwrap_or_default();
            out.push_str(&format!("<double>{f}</double>"));
        }
    }
}

/// An element with its accumulated text and child elements.
#[derive(Debug, Default)]
struct Node {
    name: String,
    text: String,
    children: Vec<Node>,
}

impl Node {
    fn named(start: &BytesStart<'_>) -> Self {
        Self {
            name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            ..Self::default()
        }
    }

    fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|child| child.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }
}

fn parse_document(xml: &str) -> Result<Node, String> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(start) => {
                if stack.len() >= MAX_DEPTH {
                    return Err("document nested too deeply".to_string());
                }
                stack.push(Node::named(&start));
            }
            Event::Empty(start) => attach(&mut stack, &mut root, Node::named(&start))?,
            Event::End(_) => {
                let node = stack.pop().ok_or("unbalanced closing tag")?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::Text(text) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text.unescape().map_err(|e| e.to_string())?);
                }
            }
            Event::CData(data) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err("unexpected end of document".to_string());
    }
    root.ok_or_else(|| "empty document".to_string())
}

fn attach(stack: &mut [Node], root: &mut Option<Node>, node: Node) -> Result<(), String> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        Ok(())
    } else if root.is_none() {
        *root = Some(node);
        Ok(())
    } else {
        Err("multiple root elements".to_string())
    }
}

fn decode_value(node: &Node) -> Result<Value, String> {
    // An untyped value is a string.
    let Some(typed) = node.children.first() else {
        return Ok(Value::String(node.text.clone()));
    };

    let text = typed.text.trim();
    match typed.name.as_str() {
        "int" | "i4" | "i8" => text
            .parse::<i64>()
            .map(Value::from)
            .map_err(|e| format!("invalid integer '{text}': {e}")),
        "boolean" => match text {
            "1" => Ok(Value::Bool(true)),
            "0" => Ok(Value::Bool(false)),
            other => Err(format!("invalid boolean '{other}'")),
        },
        "double" => text
            .parse::<f64>()
            .map(|f| Number::from_f64(f).map_or(Value::Null, Value::Number))
            .map_err(|e| format!("invalid double '{text}': {e}")),
        "string" => Ok(Value::String(typed.text.clone())),
        "dateTime.iso8601" => Ok(Value::String(decode_datetime(text))),
        "base64" => Ok(Value::String(decode_base64(&typed.text))),
        "nil" => Ok(Value::Null),
        "array" => typed
            .child("data")
            .ok_or("array without data")?
            .children_named("value")
            .map(decode_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        "struct" => {
            let mut members = Map::new();
            for member in typed.children_named("member") {
                let name = member.child("name").ok_or("member without name")?;
                let value = member.child("value").ok_or("member without value")?;
                members.insert(name.text.clone(), decode_value(value)?);
            }
            Ok(Value::Object(members))
        }
        other => Err(format!("unsupported value type '{other}'")),
    }
}

fn decode_datetime(text: &str) -> String {
    NaiveDateTime::parse_from_str(text, WIRE_DATETIME)
        .map(|dt| dt.format(ISO_DATETIME).to_string())
        .unwrap_or_else(|_| text.to_string())
}

fn decode_base64(text: &str) -> String {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    match STANDARD.decode(&compact) {
        Ok(bytes) => String::from_utf8(bytes).unwrap_or(compact),
        Err(_) => compact,
    }
}
