//! Condition block of a policy statement
//!
//! A condition block maps operator names to condition keys and values:
//!
//! ```json
//! "Condition": {
//!     "StringEquals": {
//!         "lambda:FunctionUrlAuthType": "AWS_IAM",
//!         "aws:PrincipalOrgID": "o-xxxxxxxxxx"
//!     },
//!     "ArnLike": { "aws:SourceArn": "arn:aws:cloudfront::123456789012:distribution/*" }
//! }
//! ```
//!
//! Both levels keep declaration order. Key lookup walks operators in that
//! order and, within an operator, matches the key exactly (case-sensitive).
//! The first hit wins, so a key repeated under several operators resolves
//! deterministically.

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// `aws:PrincipalOrgID`, restricts callers to an organization
pub const PRINCIPAL_ORG_ID_KEY: &str = "aws:PrincipalOrgID";

/// `aws:SourceArn`, restricts the upstream resource allowed to invoke
pub const SOURCE_ARN_KEY: &str = "aws:SourceArn";

/// `lambda:FunctionUrlAuthType`, the function URL auth mode (`NONE` or `AWS_IAM`)
pub const FUNCTION_URL_AUTH_TYPE_KEY: &str = "lambda:FunctionUrlAuthType";

/// Value of a single condition key
///
/// Booleans and numbers are kept in their textual form, which is how they
/// are compared upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionValue {
    Single(String),
    Multiple(Vec<String>),
}

impl ConditionValue {
    /// First value; `None` only for an empty list
    pub fn first(&self) -> Option<&str> {
        match self {
            ConditionValue::Single(value) => Some(value),
            ConditionValue::Multiple(values) => values.first().map(String::as_str),
        }
    }

    pub fn values(&self) -> Vec<&str> {
        match self {
            ConditionValue::Single(value) => vec![value.as_str()],
            ConditionValue::Multiple(values) => values.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for ConditionValue {
    fn from(value: &str) -> Self {
        ConditionValue::Single(value.to_string())
    }
}

impl From<String> for ConditionValue {
    fn from(value: String) -> Self {
        ConditionValue::Single(value)
    }
}

impl From<Vec<String>> for ConditionValue {
    fn from(values: Vec<String>) -> Self {
        ConditionValue::Multiple(values)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawScalar {
    Text(String),
    Flag(bool),
    Number(serde_json::Number),
}

impl From<RawScalar> for String {
    fn from(raw: RawScalar) -> Self {
        match raw {
            RawScalar::Text(text) => text,
            RawScalar::Flag(flag) => flag.to_string(),
            RawScalar::Number(number) => number.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawConditionValue {
    One(RawScalar),
    Many(Vec<RawScalar>),
}

impl<'de> Deserialize<'de> for ConditionValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawConditionValue::deserialize(deserializer).map_err(|_| {
            <D::Error as de::Error>::custom(
                "condition value must be a string, bool, number or a list of them",
            )
        })?;
        Ok(match raw {
            RawConditionValue::One(value) => ConditionValue::Single(value.into()),
            RawConditionValue::Many(values) => {
                ConditionValue::Multiple(values.into_iter().map(String::from).collect())
            }
        })
    }
}

impl Serialize for ConditionValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ConditionValue::Single(value) => serializer.serialize_str(value),
            ConditionValue::Multiple(values) => values.serialize(serializer),
        }
    }
}

/// Keys and values under one operator, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperatorConditions {
    pub operator: String,
    pub entries: Vec<(String, ConditionValue)>,
}

impl OperatorConditions {
    pub fn get(&self, key: &str) -> Option<&ConditionValue> {
        self.entries
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value)
    }
}

/// Ordered two-level mapping: operator → condition key → value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionBlock {
    operators: Vec<OperatorConditions>,
}

impl ConditionBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition, appending to the operator if it is already present
    pub fn with(
        mut self,
        operator: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<ConditionValue>,
    ) -> Self {
        let operator = operator.into();
        let entry = (key.into(), value.into());
        match self.operators.iter_mut().find(|o| o.operator == operator) {
            Some(existing) => existing.entries.push(entry),
            None => self.operators.push(OperatorConditions {
                operator,
                entries: vec![entry],
            }),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    pub fn operators(&self) -> &[OperatorConditions] {
        &self.operators
    }

    /// Find a condition key under any operator
    ///
    /// Returns the operator name alongside the value of the first match.
    pub fn lookup(&self, key: &str) -> Option<(&str, &ConditionValue)> {
        self.operators.iter().find_map(|block| {
            block
                .get(key)
                .map(|value| (block.operator.as_str(), value))
        })
    }

    /// First value of a condition key under any operator
    pub fn first_value(&self, key: &str) -> Option<&str> {
        self.lookup(key).and_then(|(_, value)| value.first())
    }

    /// All (operator, key, value) triples in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &ConditionValue)> {
        self.operators.iter().flat_map(|block| {
            block
                .entries
                .iter()
                .map(move |(key, value)| (block.operator.as_str(), key.as_str(), value))
        })
    }
}

struct EntriesVisitor;

impl<'de> Visitor<'de> for EntriesVisitor {
    type Value = Vec<(String, ConditionValue)>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of condition keys to values")
    }

    fn visit_map<V>(self, mut map: V) -> Result<Self::Value, V::Error>
    where
        V: MapAccess<'de>,
    {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(key) = map.next_key::<String>()? {
            let value = map.next_value::<ConditionValue>()?;
            entries.push((key, value));
        }
        Ok(entries)
    }
}

struct Entries(Vec<(String, ConditionValue)>);

impl<'de> Deserialize<'de> for Entries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(EntriesVisitor).map(Entries)
    }
}

struct ConditionBlockVisitor;

impl<'de> Visitor<'de> for ConditionBlockVisitor {
    type Value = ConditionBlock;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of condition operators")
    }

    // `"Condition": null` is treated like a missing block
    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(ConditionBlock::default())
    }

    fn visit_none<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(ConditionBlock::default())
    }

    fn visit_map<V>(self, mut map: V) -> Result<Self::Value, V::Error>
    where
        V: MapAccess<'de>,
    {
        let mut operators = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(operator) = map.next_key::<String>()? {
            let Entries(entries) = map.next_value()?;
            operators.push(OperatorConditions { operator, entries });
        }
        Ok(ConditionBlock { operators })
    }
}

impl<'de> Deserialize<'de> for ConditionBlock {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ConditionBlockVisitor)
    }
}

struct EntriesRef<'a>(&'a [(String, ConditionValue)]);

impl Serialize for EntriesRef<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for ConditionBlock {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.operators.len()))?;
        for block in &self.operators {
            map.serialize_entry(&block.operator, &EntriesRef(&block.entries))?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ConditionBlock {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_preserves_declaration_order() {
        let block = parse(
            r#"{
                "StringEquals": {"b": "1", "a": "2"},
                "ArnLike": {"z": "3"}
            }"#,
        );
        let triples: Vec<_> = block.iter().map(|(op, key, _)| (op, key)).collect();
        assert_eq!(
            triples,
            vec![("StringEquals", "b"), ("StringEquals", "a"), ("ArnLike", "z")]
        );
    }

    #[test]
    fn test_first_operator_wins() {
        let block = parse(
            r#"{
                "StringLike": {"aws:PrincipalOrgID": "o-first"},
                "StringEquals": {"aws:PrincipalOrgID": "o-second"}
            }"#,
        );
        assert_eq!(
            block.lookup(PRINCIPAL_ORG_ID_KEY).map(|(op, v)| (op, v.first())),
            Some(("StringLike", Some("o-first")))
        );
    }

    #[test]
    fn test_key_match_is_case_sensitive() {
        let block = parse(r#"{"StringEquals": {"aws:principalorgid": "o-lower"}}"#);
        assert_eq!(block.first_value(PRINCIPAL_ORG_ID_KEY), None);
    }

    #[test]
    fn test_scalar_and_list_values() {
        let block = parse(
            r#"{
                "Bool": {"aws:SecureTransport": true},
                "NumericLessThan": {"s3:max-keys": 10},
                "ArnLike": {"aws:SourceArn": ["arn:aws:a", "arn:aws:b"]},
                "StringEquals": {"aws:PrincipalOrgID": []}
            }"#,
        );
        assert_eq!(block.first_value("aws:SecureTransport"), Some("true"));
        assert_eq!(block.first_value("s3:max-keys"), Some("10"));
        assert_eq!(block.first_value(SOURCE_ARN_KEY), Some("arn:aws:a"));
        assert_eq!(
            block.lookup(SOURCE_ARN_KEY).unwrap().1.values(),
            vec!["arn:aws:a", "arn:aws:b"]
        );
        assert_eq!(block.first_value(PRINCIPAL_ORG_ID_KEY), None);
    }

    #[test]
    fn test_null_and_empty_blocks() {
        assert!(parse("null").is_empty());
        assert!(parse("{}").is_empty());
        assert!(serde_json::from_str::<ConditionBlock>(r#""StringEquals""#).is_err());
        assert!(serde_json::from_str::<ConditionBlock>(r#"{"StringEquals": "x"}"#).is_err());
        assert!(
            serde_json::from_str::<ConditionBlock>(r#"{"StringEquals": {"k": {"n": 1}}}"#)
                .is_err()
        );
    }

    #[test]
    fn test_builder_groups_by_operator() {
        let block = ConditionBlock::new()
            .with("StringEquals", FUNCTION_URL_AUTH_TYPE_KEY, "AWS_IAM")
            .with("ArnLike", SOURCE_ARN_KEY, "arn:aws:cloudfront::1:distribution/X")
            .with("StringEquals", PRINCIPAL_ORG_ID_KEY, "o-abc");

        assert_eq!(block.operators().len(), 2);
        assert_eq!(block.operators()[0].entries.len(), 2);
        assert_eq!(block.first_value(PRINCIPAL_ORG_ID_KEY), Some("o-abc"));
    }

    #[test]
    fn test_serialize_keeps_order() {
        let json = r#"{"StringEquals":{"k2":"v","k1":["a","b"]},"ArnLike":{"k3":"x"}}"#;
        let block = parse(json);
        assert_eq!(serde_json::to_string(&block).unwrap(), json);
    }
}
