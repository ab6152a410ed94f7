//! Statement principal
//!
//! The `Principal` field of a statement is either the wildcard string `"*"`
//! or an object naming the principal kind:
//!
//! ```json
//! "Principal": "*"
//! "Principal": { "AWS": "arn:aws:iam::123456789012:root" }
//! "Principal": { "Service": "cloudfront.amazonaws.com" }
//! ```
//!
//! The shape is classified once while decoding so accessors never inspect
//! raw JSON.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::arn;

/// Principal key for AWS accounts and IAM identities
pub const AWS_KEY: &str = "AWS";

/// Principal key for AWS service principals
pub const SERVICE_KEY: &str = "Service";

/// Wildcard principal (anyone)
pub const WILDCARD: &str = "*";

/// Classified principal of a policy statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    /// `"*"`
    Wildcard,
    /// `{"AWS": "..."}`, an account ID or an IAM ARN
    Account(String),
    /// `{"Service": "..."}`, a service DNS name
    Service(String),
    /// Any other object shape, kept verbatim for re-encoding
    Unrecognized(Value),
}

impl Principal {
    /// Normalized principal identity
    ///
    /// Account ARNs are reduced to their account ID. Unrecognized shapes
    /// yield `None`.
    pub fn identity(&self) -> Option<&str> {
        match self {
            Principal::Wildcard => Some(WILDCARD),
            Principal::Account(value) => Some(arn::account_id(value)),
            Principal::Service(value) => Some(value),
            Principal::Unrecognized(_) => None,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Principal::Wildcard)
    }

    fn classify_object(map: Map<String, Value>) -> Self {
        if map.len() == 1 {
            if let Some(Value::String(value)) = map.get(AWS_KEY) {
                return Principal::Account(value.clone());
            }
            if let Some(Value::String(value)) = map.get(SERVICE_KEY) {
                return Principal::Service(value.clone());
            }
        }
        Principal::Unrecognized(Value::Object(map))
    }
}

/// Wire shape accepted for a principal; anything else is a decode error
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrincipal {
    Text(String),
    Object(Map<String, Value>),
}

impl<'de> Deserialize<'de> for Principal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawPrincipal::deserialize(deserializer).map_err(|_| {
            <D::Error as serde::de::Error>::custom(
                "Principal must be \"*\" or an object such as {\"AWS\": ...}",
            )
        })?;

        Ok(match raw {
            RawPrincipal::Text(text) if text == WILDCARD => Principal::Wildcard,
            RawPrincipal::Text(text) => Principal::Account(text),
            RawPrincipal::Object(map) => Principal::classify_object(map),
        })
    }
}

impl Serialize for Principal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeMap;

        match self {
            Principal::Wildcard => serializer.serialize_str(WILDCARD),
            Principal::Account(value) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(AWS_KEY, value)?;
                map.end()
            }
            Principal::Service(value) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(SERVICE_KEY, value)?;
                map.end()
            }
            Principal::Unrecognized(value) => value.serialize(serializer),
        }
    }
}
