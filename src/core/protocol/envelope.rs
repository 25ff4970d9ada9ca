// src/core/protocol/envelope.rs

//! Request and response envelopes exchanged with clients.
//!
//! A request is a JSON object with a `cmd` string; a response is a JSON object
//! that always carries `res` and `err`, followed by command-specific fields.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};

/// The `res` value of the fallback envelope.
pub const UNKNOWN_CMD: &str = "unknown_cmd";

/// The serialized fallback envelope, for paths that cannot build a `Response`.
pub const UNKNOWN_CMD_JSON: &str = r#"{"res":"unknown_cmd","err":1}"#;

/// A single persistence record: field name to JSON value.
pub type Record = Map<String, Value>;

/// The closed set of error codes carried in the `err` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ApiError {
    /// Success.
    None = 0,
    /// Unknown or unparsable command.
    Unknown = 1,
    /// No person matches the supplied password.
    Login = 2,
    /// The persistence collaborator failed.
    Database = 3,
    /// The handler failed unexpectedly; the failure was isolated.
    Internal = 4,
}

impl ApiError {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::None),
            1 => Some(Self::Unknown),
            2 => Some(Self::Login),
            3 => Some(Self::Database),
            4 => Some(Self::Internal),
            _ => None,
        }
    }
}

impl Serialize for ApiError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.code())
    }
}

/// A parsed request envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    cmd: String,
    fields: Map<String, Value>,
}

impl Request {
    /// Parses raw frame text. Returns `None` unless the text is a JSON object.
    ///
    /// An absent or non-string `cmd` is read as the empty string.
    pub fn parse(raw: &str) -> Option<Self> {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(fields)) => Some(Self::from_fields(fields)),
            _ => None,
        }
    }

    pub fn from_fields(fields: Map<String, Value>) -> Self {
        let cmd = fields
            .get("cmd")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Self { cmd, fields }
    }

    pub fn cmd(&self) -> &str {
        &self.cmd
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Reads a string field; missing and non-string values read as "".
    pub fn str_field(&self, field: &str) -> &str {
        self.fields
            .get(field)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

/// A response envelope.
///
/// `res` and `err` are always serialized first. Payload entries named `res`
/// or `err` are dropped so a merged record can never shadow them.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    res: String,
    err: ApiError,
    payload: Map<String, Value>,
}

impl Response {
    pub fn new(res: impl Into<String>, err: ApiError) -> Self {
        Self {
            res: res.into(),
            err,
            payload: Map::new(),
        }
    }

    pub fn success(res: impl Into<String>) -> Self {
        Self::new(res, ApiError::None)
    }

    pub fn failure(res: impl Into<String>, err: ApiError) -> Self {
        Self::new(res, err)
    }

    /// The fixed fallback envelope `{"res":"unknown_cmd","err":1}`.
    pub fn unknown_cmd() -> Self {
        Self::new(UNKNOWN_CMD, ApiError::Unknown)
    }

    /// Adds one payload field.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Merges every field of `record` into the payload.
    pub fn merge(mut self, record: Record) -> Self {
        self.payload.extend(record);
        self
    }

    pub fn res(&self) -> &str {
        &self.res
    }

    pub fn err(&self) -> ApiError {
        self.err
    }

    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// Serializes the envelope. Falls back to [`UNKNOWN_CMD_JSON`] if a
    /// payload value cannot be encoded.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| UNKNOWN_CMD_JSON.to_string())
    }
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("res", &self.res)?;
        map.serialize_entry("err", &self.err)?;
        for (key, value) in &self.payload {
            if key == "res" || key == "err" {
                continue;
            }
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
