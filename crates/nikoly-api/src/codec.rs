// Wire codec for the controller's line-delimited JSON protocol
//
// A request is a single compact JSON object `{"cmd": "<name>", ...}`
// terminated by CRLF. A response is a JSON object `{"cmd", "data"}`; the
// `data` payload is classified into a small tagged union so callers never
// poke at raw maps to find out whether the controller reported an error.

use serde_json::{Map, Value};

use crate::error::Error;

/// Line terminator appended to every request.
pub const TERMINATOR: &[u8] = b"\r\n";

// ── Request ──────────────────────────────────────────────────────────

/// An outgoing command: the command name plus extra top-level fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    cmd: String,
    fields: Map<String, Value>,
}

impl Request {
    /// A request with no extra fields.
    pub fn new(cmd: impl Into<String>) -> Self {
        Self {
            cmd: cmd.into(),
            fields: Map::new(),
        }
    }

    /// Add (or replace) a top-level field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Merge pass-through fields into the request. Existing keys are
    /// overwritten.
    pub fn with_fields(mut self, fields: Map<String, Value>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Build a request from an arbitrary JSON object.
    ///
    /// The object must carry a string `cmd`; every other key becomes an
    /// extra field.
    pub fn from_value(value: Value) -> Result<Self, Error> {
        let Value::Object(mut fields) = value else {
            return Err(Error::invalid_request("request must be a JSON object"));
        };
        match fields.remove("cmd") {
            Some(Value::String(cmd)) => Ok(Self { cmd, fields }),
            Some(other) => Err(Error::invalid_request(format!(
                "'cmd' must be a string, got {other}"
            ))),
            None => Err(Error::invalid_request("'cmd' field must be present")),
        }
    }

    pub fn command(&self) -> &str {
        &self.cmd
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// The full JSON object sent on the wire.
    pub fn to_value(&self) -> Value {
        let mut object = Map::with_capacity(self.fields.len() + 1);
        object.insert("cmd".into(), Value::String(self.cmd.clone()));
        for (key, value) in &self.fields {
            object.insert(key.clone(), value.clone());
        }
        Value::Object(object)
    }
}

/// Serialize a request to compact JSON followed by CRLF.
pub fn encode(request: &Request) -> Result<Vec<u8>, Error> {
    if request.cmd.trim().is_empty() {
        return Err(Error::invalid_request("'cmd' must be a non-empty string"));
    }
    if request.fields.contains_key("cmd") {
        return Err(Error::invalid_request(
            "extra fields must not override 'cmd'",
        ));
    }

    let mut bytes = serde_json::to_vec(&request.to_value())
        .map_err(|e| Error::invalid_request(format!("unserializable request: {e}")))?;
    bytes.extend_from_slice(TERMINATOR);
    Ok(bytes)
}

// ── Response ─────────────────────────────────────────────────────────

/// The `data` payload of a response.
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    /// `data` absent or `null`.
    Empty,
    /// A JSON object without a non-zero `error` key.
    Object(Map<String, Value>),
    /// A JSON array.
    List(Vec<Value>),
    /// A JSON object whose `error` key holds a non-zero value.
    Error { code: i64, message: Option<String> },
    /// Any other JSON scalar.
    Other(Value),
}

impl Data {
    fn classify(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Empty,
            Some(Value::Object(map)) => match map.get("error").and_then(error_code) {
                Some(code) => Self::Error {
                    code,
                    message: error_message(&map),
                },
                None => Self::Object(map),
            },
            Some(Value::Array(items)) => Self::List(items),
            Some(other) => Self::Other(other),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Back to plain JSON, for printing raw responses.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Empty => Value::Null,
            Self::Object(map) => Value::Object(map.clone()),
            Self::List(items) => Value::Array(items.clone()),
            Self::Error { code, message } => {
                let mut map = Map::new();
                map.insert("error".into(), Value::from(*code));
                if let Some(message) = message {
                    map.insert("message".into(), Value::String(message.clone()));
                }
                Value::Object(map)
            }
            Self::Other(value) => value.clone(),
        }
    }
}

/// A decoded response: command echo plus classified payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Command name echoed by the controller (empty if absent).
    pub cmd: String,
    pub data: Data,
}

impl Response {
    /// Plain JSON form `{"cmd", "data"}`.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("cmd".into(), Value::String(self.cmd.clone()));
        map.insert("data".into(), self.data.to_value());
        Value::Object(map)
    }
}

/// Parse a raw response buffer.
///
/// Surrounding whitespace and line terminators are ignored. An empty
/// buffer, invalid UTF-8, invalid JSON, or a non-object document is a
/// [`Error::MalformedResponse`].
pub fn decode(bytes: &[u8]) -> Result<Response, Error> {
    let body = bytes.trim_ascii();
    if body.is_empty() {
        return Err(malformed("empty response", bytes));
    }

    let text = std::str::from_utf8(body)
        .map_err(|e| malformed(format!("invalid UTF-8: {e}"), bytes))?;
    let value: Value =
        serde_json::from_str(text).map_err(|e| malformed(format!("invalid JSON: {e}"), bytes))?;

    let Value::Object(mut object) = value else {
        return Err(malformed("response is not a JSON object", bytes));
    };

    let cmd = match object.remove("cmd") {
        Some(Value::String(cmd)) => cmd,
        _ => String::new(),
    };
    let data = Data::classify(object.remove("data"));

    Ok(Response { cmd, data })
}

fn malformed(message: impl Into<String>, bytes: &[u8]) -> Error {
    Error::MalformedResponse {
        message: message.into(),
        body: String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Interpret an `error` value. `None` means "no error": zero, `false`,
/// or `null`. Values that are present but not numeric map to `-1`.
fn error_code(value: &Value) -> Option<i64> {
    let code = match value {
        Value::Null | Value::Bool(false) => 0,
        Value::Bool(true) => 1,
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(truncate_f64))
            .unwrap_or(-1),
        Value::String(s) => s.trim().parse::<i64>().unwrap_or(-1),
        Value::Array(_) | Value::Object(_) => -1,
    };
    (code != 0).then_some(code)
}

fn error_message(map: &Map<String, Value>) -> Option<String> {
    ["message", "msg"]
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_str))
        .map(str::to_owned)
}

/// Truncate a finite float towards zero, if it fits in an `i64`.
#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
pub(crate) fn truncate_f64(value: f64) -> Option<i64> {
    const LIMIT: f64 = 9_223_372_036_854_775_807.0;
    if value.is_finite() && value.trunc().abs() < LIMIT {
        Some(value.trunc() as i64)
    } else {
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn encode_appends_crlf_and_keeps_fields() {
        let request = Request::new("executeactions")
            .with_field("actions", json!([{ "id": 7, "value1": 255 }]));
        let bytes = encode(&request).unwrap();

        assert!(bytes.ends_with(b"\r\n"));
        let value: Value = serde_json::from_slice(&bytes[..bytes.len() - 2]).unwrap();
        assert_eq!(
            value,
            json!({ "cmd": "executeactions", "actions": [{ "id": 7, "value1": 255 }] })
        );
    }

    #[test]
    fn encode_is_compact_single_line() {
        let bytes = encode(&Request::new("systeminfo")).unwrap();
        assert_eq!(bytes, b"{\"cmd\":\"systeminfo\"}\r\n");
    }

    #[test]
    fn encode_rejects_blank_command() {
        let err = encode(&Request::new("  ")).unwrap_err();
        assert!(matches!(err, Error::InvalidRequest { .. }));
    }

    #[test]
    fn encode_rejects_cmd_override() {
        let request = Request::new("systeminfo").with_field("cmd", "listactions");
        assert!(matches!(
            encode(&request),
            Err(Error::InvalidRequest { .. })
        ));
    }

    #[test]
    fn from_value_requires_string_cmd() {
        assert!(matches!(
            Request::from_value(json!({ "foo": 1 })),
            Err(Error::InvalidRequest { .. })
        ));
        assert!(matches!(
            Request::from_value(json!({ "cmd": 3 })),
            Err(Error::InvalidRequest { .. })
        ));
        assert!(matches!(
            Request::from_value(json!(["cmd"])),
            Err(Error::InvalidRequest { .. })
        ));

        let request = Request::from_value(json!({ "cmd": "listlocations", "x": true })).unwrap();
        assert_eq!(request.command(), "listlocations");
        assert_eq!(request.fields().get("x"), Some(&json!(true)));
    }

    #[test]
    fn decode_strips_terminators() {
        let response = decode(b"{\"cmd\":\"listlocations\",\"data\":[{\"id\":1}]}\r\n").unwrap();
        assert_eq!(response.cmd, "listlocations");
        assert_eq!(response.data, Data::List(vec![json!({ "id": 1 })]));
    }

    #[test]
    fn decode_rejects_empty_and_garbage() {
        let cases: [&[u8]; 5] = [b"", b"\r\n", b"not json", b"[1,2]", b"\xff\xfe{}"];
        for raw in cases {
            assert!(
                matches!(decode(raw), Err(Error::MalformedResponse { .. })),
                "expected MalformedResponse for {raw:?}"
            );
        }
    }

    #[test]
    fn decode_classifies_error_payloads() {
        let response = decode(br#"{"cmd":"executeactions","data":{"error":5}}"#).unwrap();
        assert_eq!(
            response.data,
            Data::Error {
                code: 5,
                message: None
            }
        );

        let zero = decode(br#"{"cmd":"executeactions","data":{"error":0}}"#).unwrap();
        assert!(!zero.data.is_error());

        let with_text = decode(br#"{"cmd":"x","data":{"error":"7","message":"nope"}}"#).unwrap();
        assert_eq!(
            with_text.data,
            Data::Error {
                code: 7,
                message: Some("nope".into())
            }
        );
    }

    #[test]
    fn decode_tolerates_missing_cmd_and_data() {
        let response = decode(b"{}").unwrap();
        assert_eq!(response.cmd, "");
        assert_eq!(response.data, Data::Empty);
    }
}
