//! Resource policy document
//!
//! The get-policy API returns the whole policy as a JSON string; this is the
//! decoded form of that string.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::statement::PolicyStatement;
use crate::codec::{self, Schema};
use crate::error::Result;

/// Complete resource policy document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    /// Policy language version, e.g. "2012-10-17"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub statement: Vec<PolicyStatement>,
}

impl Schema for PolicyDocument {
    const FIELDS: &'static [&'static str] = &["Version", "Id", "Statement"];

    fn nested_unknown_fields(object: &Map<String, Value>, path: &str, unknown: &mut Vec<String>) {
        if let Some(Value::Array(statements)) = object.get("Statement") {
            let base = codec::join_path(path, "Statement");
            for (i, statement) in statements.iter().enumerate() {
                let at = format!("{}[{}]", base, i);
                codec::unknown_fields::<PolicyStatement>(statement, &at, unknown);
            }
        }
    }
}

impl PolicyDocument {
    /// Parse a policy document from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        codec::from_object_str(json)
    }

    /// Serialize the document to a JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Statements that govern invocation through a function URL
    pub fn function_url_statements(&self) -> impl Iterator<Item = &PolicyStatement> {
        self.statement
            .iter()
            .filter(|stmt| stmt.is_function_url_invoke())
    }

    /// Statement with the given ID
    pub fn find_statement(&self, sid: &str) -> Option<&PolicyStatement> {
        self.statement.iter().find(|stmt| stmt.sid() == Some(sid))
    }
}
