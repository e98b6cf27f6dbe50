//! Negotiation messages exchanged between controller and switch.
//!
//! Every exchange is a [`Message`]: a kind tag plus a [`Payload`] of named
//! values. The payload vocabulary is small and self-describing, so messages
//! survive a JSON round trip without a side channel.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constraint::{Constraint, ParamSet};
use crate::error::{Error, Result};

/// Message kind tags recognized by the negotiation protocol.
pub mod kind {
    /// Opens version negotiation; payload carries `versions`.
    pub const TTP_BEGIN: &str = "ttp_begin";
    /// Answers [`TTP_BEGIN`]; payload carries the agreed `version`.
    pub const TTP_VERSION_RESP: &str = "ttp_version_resp";
    /// Asks for the switch's advertised TTP list; empty payload.
    pub const LIST_TTPS: &str = "list_ttps";
    /// Answers [`LIST_TTPS`]; payload carries `ttps`.
    pub const LIST_TTPS_RESP: &str = "list_ttps_resp";
    /// Asks for parameters of one TTP; payload carries `ttp_name`,
    /// `ttp_version` and `param_constraints`.
    pub const TTP_QUERY: &str = "ttp_query";
    /// Successful answer to [`TTP_QUERY`]; payload carries `params`.
    pub const TTP_QUERY_RESP: &str = "ttp_query_resp";
    /// Failed answer to [`TTP_QUERY`]; payload carries `error`.
    pub const TTP_QUERY_RESP_ERR: &str = "ttp_query_resp_err";
}

/// Identifies one table type pattern: a fully qualified name plus the TTP's
/// own version string.
///
/// TTP versions are opaque labels matched by equality; only protocol
/// versions are ordered (see [`super::Version`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TtpId {
    /// Fully qualified TTP name, e.g. `org.opennetworking/ttps/IPV4`.
    pub name: String,
    /// TTP version label.
    pub version: String,
}

impl TtpId {
    /// Create a TTP identity
    pub fn new(name: &str, version: &str) -> Self {
        Self { name: name.to_string(), version: version.to_string() }
    }
}

impl fmt::Display for TtpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// One payload value.
///
/// Deserialization is by shape, so each variant must remain structurally
/// distinct from the others. The empty array is the one shape the list
/// variants share; it parses as [`Value::Strings`], and the typed accessors
/// on [`Payload`] accept it for any list field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Flag, e.g. a feature toggle.
    Bool(bool),
    /// Counter or size.
    Int(i64),
    /// Version label or error text.
    Str(String),
    /// Offered protocol versions.
    Strings(Vec<String>),
    /// Advertised TTPs.
    Ttps(Vec<TtpId>),
    /// Queried constraints.
    Constraints(Vec<Constraint>),
    /// Negotiated parameters.
    Params(ParamSet),
}

/// Named values carried by a [`Message`], keyed deterministically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(BTreeMap<String, Value>);

impl Payload {
    /// Create an empty payload
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value (builder form)
    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.0.insert(key.to_string(), value);
        self
    }

    /// Look up a raw value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// True when the payload carries no values
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get a string field
    pub fn get_str(&self, key: &str) -> Result<&str> {
        match self.get(key) {
            Some(Value::Str(text)) => Ok(text),
            Some(_) => Err(Self::type_error(key, "a string")),
            None => Err(Self::missing(key)),
        }
    }

    /// Get a list-of-strings field
    pub fn get_strings(&self, key: &str) -> Result<&[String]> {
        match self.get(key) {
            Some(Value::Strings(items)) => Ok(items),
            Some(_) => Err(Self::type_error(key, "a string list")),
            None => Err(Self::missing(key)),
        }
    }

    /// Get a TTP-list field
    pub fn get_ttps(&self, key: &str) -> Result<&[TtpId]> {
        match self.get(key) {
            Some(Value::Ttps(ttps)) => Ok(ttps),
            // An empty list parses as Strings whatever its element type.
            Some(Value::Strings(items)) if items.is_empty() => Ok(&[]),
            Some(_) => Err(Self::type_error(key, "a TTP list")),
            None => Err(Self::missing(key)),
        }
    }

    /// Get a constraint-list field
    pub fn get_constraints(&self, key: &str) -> Result<&[Constraint]> {
        match self.get(key) {
            Some(Value::Constraints(constraints)) => Ok(constraints),
            Some(Value::Strings(items)) if items.is_empty() => Ok(&[]),
            Some(_) => Err(Self::type_error(key, "a constraint list")),
            None => Err(Self::missing(key)),
        }
    }

    /// Get a parameter-set field
    pub fn get_params(&self, key: &str) -> Result<&ParamSet> {
        match self.get(key) {
            Some(Value::Params(params)) => Ok(params),
            Some(_) => Err(Self::type_error(key, "a parameter set")),
            None => Err(Self::missing(key)),
        }
    }

    fn missing(key: &str) -> Error {
        Error::InvalidMessage(format!("missing payload field `{key}`"))
    }

    fn type_error(key: &str, expected: &str) -> Error {
        Error::InvalidMessage(format!("payload field `{key}` is not {expected}"))
    }
}

/// Protocol message envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message kind tag; see [`kind`].
    pub kind: String,
    /// Named payload values.
    #[serde(default, skip_serializing_if = "Payload::is_empty")]
    pub payload: Payload,
}

impl Message {
    /// Create a message with an empty payload
    pub fn new(kind: &str) -> Self {
        Self { kind: kind.to_string(), payload: Payload::new() }
    }

    /// Create a version-negotiation opener offering `versions`
    pub fn ttp_begin(versions: &[String]) -> Self {
        Self {
            kind: kind::TTP_BEGIN.to_string(),
            payload: Payload::new().with("versions", Value::Strings(versions.to_vec())),
        }
    }

    /// Create a version-negotiation response agreeing on `version`
    pub fn ttp_version_resp(version: &str) -> Self {
        Self {
            kind: kind::TTP_VERSION_RESP.to_string(),
            payload: Payload::new().with("version", Value::Str(version.to_string())),
        }
    }

    /// Create a TTP-list request
    pub fn list_ttps() -> Self {
        Self::new(kind::LIST_TTPS)
    }

    /// Create a TTP-list response advertising `ttps`
    pub fn list_ttps_resp(ttps: Vec<TtpId>) -> Self {
        Self {
            kind: kind::LIST_TTPS_RESP.to_string(),
            payload: Payload::new().with("ttps", Value::Ttps(ttps)),
        }
    }

    /// Create a parameter query for one TTP under `constraints`
    pub fn ttp_query(ttp: &TtpId, constraints: Vec<Constraint>) -> Self {
        Self {
            kind: kind::TTP_QUERY.to_string(),
            payload: Payload::new()
                .with("ttp_name", Value::Str(ttp.name.clone()))
                .with("ttp_version", Value::Str(ttp.version.clone()))
                .with("param_constraints", Value::Constraints(constraints)),
        }
    }

    /// Create a successful parameter-query response
    pub fn ttp_query_resp(params: ParamSet) -> Self {
        Self {
            kind: kind::TTP_QUERY_RESP.to_string(),
            payload: Payload::new().with("params", Value::Params(params)),
        }
    }

    /// Create a failed parameter-query response
    pub fn ttp_query_resp_err(error: &str) -> Self {
        Self {
            kind: kind::TTP_QUERY_RESP_ERR.to_string(),
            payload: Payload::new().with("error", Value::Str(error.to_string())),
        }
    }

    /// True when this message has the given kind tag
    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }

    /// Borrow the payload, or fail with [`Error::Protocol`] when the kind
    /// tag is not the expected one.
    pub fn expect_kind(&self, kind: &str) -> Result<&Payload> {
        if self.kind == kind {
            Ok(&self.payload)
        } else {
            Err(Error::Protocol(format!("expected {kind}, got {}", self.kind)))
        }
    }

    /// Serialize to a JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
