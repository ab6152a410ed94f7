//! JSON decoding and encoding helpers
//!
//! Documents are decoded in two attempts. The first checks the keys against
//! the type's [`Schema`], including the nested objects the schema describes;
//! the second decodes the source text into the typed value. In
//! [`DecodeMode::Lenient`] unknown keys are reported to a [`WarningSink`] and
//! the second attempt still runs, so files written for newer versions keep
//! loading. In [`DecodeMode::Strict`] they are an error.
//!
//! Unknown keys are reported by path: `Statement[0].NotPrincipal`,
//! `Environment.Secrets`.

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

use crate::error::{Error, Result};

/// Keys a document type understands
pub trait Schema: DeserializeOwned {
    /// Keys of the type's own object
    const FIELDS: &'static [&'static str];

    /// Check the nested objects of `object`, which sits at `path`
    ///
    /// Types with structured children call [`unknown_fields`] on each of
    /// them. Free-form children such as condition blocks are not checked.
    fn nested_unknown_fields(
        _object: &Map<String, Value>,
        _path: &str,
        _unknown: &mut Vec<String>,
    ) {
    }
}

/// How unknown fields are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeMode {
    /// Unknown fields are an error
    Strict,
    /// Unknown fields are reported and ignored
    #[default]
    Lenient,
}

/// Non-fatal problem found while decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeWarning {
    UnknownFields { origin: String, fields: Vec<String> },
}

impl fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeWarning::UnknownFields { origin, fields } => {
                write!(f, "unknown field {} in {}", fields.join(", "), origin)
            }
        }
    }
}

/// Receiver of decode warnings
pub trait WarningSink: Send + Sync {
    fn warn(&self, warning: &DecodeWarning);
}

impl<F> WarningSink for F
where
    F: Fn(&DecodeWarning) + Send + Sync,
{
    fn warn(&self, warning: &DecodeWarning) {
        self(warning)
    }
}

/// Logs warnings through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl WarningSink for TracingSink {
    fn warn(&self, warning: &DecodeWarning) {
        warn!("{}", warning);
    }
}

/// Keeps warnings in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    warnings: Mutex<Vec<DecodeWarning>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the warnings received so far
    pub fn warnings(&self) -> Vec<DecodeWarning> {
        self.warnings.lock().clone()
    }

    /// Drain the received warnings
    pub fn take(&self) -> Vec<DecodeWarning> {
        std::mem::take(&mut *self.warnings.lock())
    }
}

impl WarningSink for CollectingSink {
    fn warn(&self, warning: &DecodeWarning) {
        self.warnings.lock().push(warning.clone());
    }
}

/// Strict-then-lenient JSON decoder
///
/// # Examples
/// ```
/// use funcurl_policy::codec::{Decoder, DecodeMode};
/// use funcurl_policy::policy::PolicyStatement;
///
/// let json = br#"{"Effect": "Allow", "Action": "a", "Resource": "r", "Extra": 1}"#;
///
/// let stmt: PolicyStatement = Decoder::new().decode(json, "inline").unwrap();
/// assert_eq!(stmt.action().iter().next(), Some("a"));
///
/// let strict = Decoder::new().with_mode(DecodeMode::Strict);
/// assert!(strict.decode::<PolicyStatement>(json, "inline").is_err());
/// ```
#[derive(Clone)]
pub struct Decoder {
    mode: DecodeMode,
    sink: Arc<dyn WarningSink>,
}

impl fmt::Debug for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder").field("mode", &self.mode).finish()
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    /// Lenient decoder reporting to [`TracingSink`]
    pub fn new() -> Self {
        Decoder {
            mode: DecodeMode::default(),
            sink: Arc::new(TracingSink),
        }
    }

    pub fn with_mode(mut self, mode: DecodeMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_warning_sink(mut self, sink: Arc<dyn WarningSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn mode(&self) -> DecodeMode {
        self.mode
    }

    /// Decode `src`; `origin` names the source in warnings and errors
    pub fn decode<T: Schema>(&self, src: &[u8], origin: &str) -> Result<T> {
        let value: Value = serde_json::from_slice(src)?;
        expect_object(&value)?;

        let mut fields = Vec::new();
        unknown_fields::<T>(&value, "", &mut fields);
        if !fields.is_empty() {
            match self.mode {
                DecodeMode::Strict => {
                    return Err(Error::UnknownFields {
                        origin: origin.to_string(),
                        fields,
                    });
                }
                DecodeMode::Lenient => {
                    self.sink.warn(&DecodeWarning::UnknownFields {
                        origin: origin.to_string(),
                        fields,
                    });
                }
            }
        }

        // Decode from the text so condition blocks see keys in document order
        Ok(serde_json::from_slice(src)?)
    }

    pub fn decode_str<T: Schema>(&self, src: &str, origin: &str) -> Result<T> {
        self.decode(src.as_bytes(), origin)
    }
}

/// Decode a JSON object into `T`, ignoring unknown fields
///
/// Derived struct decoding would also accept a JSON array; documents here
/// are always objects.
pub(crate) fn from_object_str<T: DeserializeOwned>(json: &str) -> Result<T> {
    let value: Value = serde_json::from_str(json)?;
    expect_object(&value)?;
    Ok(serde_json::from_str(json)?)
}

fn expect_object(value: &Value) -> Result<()> {
    if value.is_object() {
        return Ok(());
    }
    Err(Error::Decode(<serde_json::Error as serde::de::Error>::custom(
        "expected a JSON object at the top level",
    )))
}

/// Append the keys of `value` that `T` does not know, as paths below `path`
///
/// Values that are not objects are left to the typed decode to reject.
pub fn unknown_fields<T: Schema>(value: &Value, path: &str, unknown: &mut Vec<String>) {
    let object = match value {
        Value::Object(object) => object,
        _ => return,
    };

    unknown.extend(
        object
            .keys()
            .filter(|key| !T::FIELDS.contains(&key.as_str()))
            .map(|key| join_path(path, key)),
    );
    T::nested_unknown_fields(object, path, unknown);
}

/// `path.key`, or `key` at the top level
pub fn join_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

/// Pretty JSON with two-space indentation and a trailing newline
pub fn marshal_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = serde_json::to_vec_pretty(value)?;
    buf.push(b'\n');
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{PolicyDocument, PolicyStatement};

    const WITH_EXTRA: &str = r#"{
        "Sid": "s1",
        "Effect": "Allow",
        "Principal": "*",
        "Action": "lambda:InvokeFunctionUrl",
        "Resource": "*",
        "NotPrincipal": {"AWS": "111111111111"}
    }"#;

    #[test]
    fn test_lenient_reports_unknown_fields() {
        let sink = Arc::new(CollectingSink::new());
        let decoder = Decoder::new().with_warning_sink(sink.clone());

        let stmt: PolicyStatement = decoder.decode_str(WITH_EXTRA, "policy.json").unwrap();
        assert_eq!(stmt.sid(), Some("s1"));
        assert_eq!(
            sink.take(),
            vec![DecodeWarning::UnknownFields {
                origin: "policy.json".to_string(),
                fields: vec!["NotPrincipal".to_string()],
            }]
        );
        assert!(sink.warnings().is_empty());
    }

    #[test]
    fn test_strict_rejects_unknown_fields() {
        let sink = Arc::new(CollectingSink::new());
        let decoder = Decoder::new()
            .with_mode(DecodeMode::Strict)
            .with_warning_sink(sink.clone());

        let err = decoder
            .decode_str::<PolicyStatement>(WITH_EXTRA, "policy.json")
            .unwrap_err();
        match err {
            Error::UnknownFields { origin, fields } => {
                assert_eq!(origin, "policy.json");
                assert_eq!(fields, vec!["NotPrincipal".to_string()]);
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(sink.warnings().is_empty());
    }

    #[test]
    fn test_structural_errors_are_decode_errors() {
        let sink = Arc::new(CollectingSink::new());
        let decoder = Decoder::new().with_warning_sink(sink.clone());

        let err = decoder
            .decode_str::<PolicyStatement>(
                r#"{"Effect": "Allow", "Action": "a", "Resource": "r", "Principal": 7, "X": 1}"#,
                "inline",
            )
            .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));

        let err = decoder
            .decode_str::<PolicyStatement>("{not json", "inline")
            .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));

        let err = decoder
            .decode_str::<PolicyStatement>(r#"[null, "Allow", null, "a", "r", null]"#, "inline")
            .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));

        // Only the first document had an unknown field
        assert_eq!(sink.warnings().len(), 1);
    }

    #[test]
    fn test_nested_unknown_fields() {
        let json = r#"{
            "Statement": [
                {"Effect": "Allow", "Principal": "*", "Action": "a", "Resource": "r"},
                {"Effect": "Deny", "NotPrincipal": {"AWS": "1"}, "Action": "a", "Resource": "r"}
            ],
            "Extra": 1
        }"#;

        let sink = Arc::new(CollectingSink::new());
        let decoder = Decoder::new().with_warning_sink(sink.clone());
        let doc: PolicyDocument = decoder.decode_str(json, "get-policy").unwrap();
        assert_eq!(doc.statement.len(), 2);
        assert_eq!(doc.statement[1].principal(), None);
        assert_eq!(
            sink.take(),
            vec![DecodeWarning::UnknownFields {
                origin: "get-policy".to_string(),
                fields: vec!["Extra".to_string(), "Statement[1].NotPrincipal".to_string()],
            }]
        );

        let strict = decoder.with_mode(DecodeMode::Strict);
        let only_nested =
            r#"{"Statement":[{"Effect":"Deny","NotPrincipal":{"AWS":"1"},"Action":"a","Resource":"r"}]}"#;
        match strict.decode_str::<PolicyDocument>(only_nested, "get-policy") {
            Err(Error::UnknownFields { fields, .. }) => {
                assert_eq!(fields, vec!["Statement[0].NotPrincipal".to_string()]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(sink.warnings().is_empty());
    }

    #[test]
    fn test_free_form_children_are_not_checked() {
        let json = r#"{
            "Effect": "Allow",
            "Principal": {"Federated": "accounts.google.com"},
            "Action": "a",
            "Resource": "r",
            "Condition": {"StringEquals": {"anything:Goes": "x"}}
        }"#;

        let strict = Decoder::new().with_mode(DecodeMode::Strict);
        assert!(strict.decode_str::<PolicyStatement>(json, "inline").is_ok());
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("", "Sid"), "Sid");
        assert_eq!(join_path("Statement[2]", "Sid"), "Statement[2].Sid");
    }

    #[test]
    fn test_closure_sink() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let captured = seen.clone();
        let decoder = Decoder::new().with_warning_sink(Arc::new(move |w: &DecodeWarning| {
            captured.lock().push(w.to_string());
        }));

        let _: PolicyStatement = decoder.decode_str(WITH_EXTRA, "inline").unwrap();
        assert_eq!(
            *seen.lock(),
            vec!["unknown field NotPrincipal in inline".to_string()]
        );
    }

    #[test]
    fn test_marshal_json_format() {
        let value = serde_json::json!({"FunctionName": "hello", "MemorySize": 128});
        let out = marshal_json(&value).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\n  \"FunctionName\": \"hello\",\n  \"MemorySize\": 128\n}\n"
        );
    }
}
