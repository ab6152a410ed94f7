//! Resource-policy statement
//!
//! One entry of a function's resource policy, as returned by the
//! get-policy API:
//!
//! ```json
//! {
//!     "Sid": "FunctionURLAllowPublicAccess",
//!     "Effect": "Allow",
//!     "Principal": "*",
//!     "Action": "lambda:InvokeFunctionUrl",
//!     "Resource": "arn:aws:lambda:ap-northeast-1:123456789012:function:hello",
//!     "Condition": { "StringEquals": { "lambda:FunctionUrlAuthType": "NONE" } }
//! }
//! ```
//!
//! A decoded statement is read-only; the accessors derive normalized values
//! from it on every call.

use serde::{Deserialize, Serialize};

use super::condition::{
    ConditionBlock, FUNCTION_URL_AUTH_TYPE_KEY, PRINCIPAL_ORG_ID_KEY, SOURCE_ARN_KEY,
};
use super::principal::Principal;
use crate::codec::{self, Schema};
use crate::error::Result;

/// Action granting invocation through a function URL
pub const INVOKE_FUNCTION_URL_ACTION: &str = "lambda:InvokeFunctionUrl";

/// Effect of a policy statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Allow the action
    Allow,
    /// Deny the action
    Deny,
}

/// A string field that may also be written as a list of strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn contains(&self, value: &str) -> bool {
        match self {
            OneOrMany::One(v) => v == value,
            OneOrMany::Many(values) => values.iter().any(|v| v == value),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let values: &[String] = match self {
            OneOrMany::One(v) => std::slice::from_ref(v),
            OneOrMany::Many(values) => values,
        };
        values.iter().map(String::as_str)
    }
}

impl From<&str> for OneOrMany {
    fn from(value: &str) -> Self {
        OneOrMany::One(value.to_string())
    }
}

impl From<String> for OneOrMany {
    fn from(value: String) -> Self {
        OneOrMany::One(value)
    }
}

impl From<Vec<String>> for OneOrMany {
    fn from(values: Vec<String>) -> Self {
        OneOrMany::Many(values)
    }
}

/// A single resource-policy statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sid: Option<String>,

    effect: Effect,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    principal: Option<Principal>,

    action: OneOrMany,

    resource: OneOrMany,

    /// Missing or `null` decodes as an empty block
    #[serde(default, skip_serializing_if = "ConditionBlock::is_empty")]
    condition: ConditionBlock,
}

impl Schema for PolicyStatement {
    const FIELDS: &'static [&'static str] =
        &["Sid", "Effect", "Principal", "Action", "Resource", "Condition"];
}

impl PolicyStatement {
    /// Create a statement with no principal and no conditions
    pub fn new(
        effect: Effect,
        action: impl Into<OneOrMany>,
        resource: impl Into<OneOrMany>,
    ) -> Self {
        PolicyStatement {
            sid: None,
            effect,
            principal: None,
            action: action.into(),
            resource: resource.into(),
            condition: ConditionBlock::default(),
        }
    }

    pub fn with_sid(mut self, sid: impl Into<String>) -> Self {
        self.sid = Some(sid.into());
        self
    }

    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    pub fn with_condition(mut self, condition: ConditionBlock) -> Self {
        self.condition = condition;
        self
    }

    /// Decode a statement from JSON, ignoring unknown fields
    ///
    /// Use [`Decoder`](crate::codec::Decoder) to have unknown fields
    /// reported or rejected.
    pub fn from_json(json: &str) -> Result<Self> {
        codec::from_object_str(json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn sid(&self) -> Option<&str> {
        self.sid.as_deref()
    }

    pub fn effect(&self) -> Effect {
        self.effect
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub fn action(&self) -> &OneOrMany {
        &self.action
    }

    pub fn resource(&self) -> &OneOrMany {
        &self.resource
    }

    pub fn condition(&self) -> &ConditionBlock {
        &self.condition
    }

    /// Principal identity
    ///
    /// - `"*"` for the wildcard principal
    /// - the account ID for `{"AWS": "arn:aws:iam::<account>:root"}`; a value
    ///   that is not a well-formed ARN is returned as is
    /// - the service name for `{"Service": "..."}`
    /// - `None` when the principal is missing or has an unknown shape
    pub fn principal_string(&self) -> Option<&str> {
        self.principal.as_ref().and_then(Principal::identity)
    }

    /// Organization the caller must belong to (`aws:PrincipalOrgID`)
    pub fn principal_org_id(&self) -> Option<&str> {
        self.condition.first_value(PRINCIPAL_ORG_ID_KEY)
    }

    /// Resource allowed to invoke (`aws:SourceArn`)
    pub fn source_arn(&self) -> Option<&str> {
        self.condition.first_value(SOURCE_ARN_KEY)
    }

    /// Function URL auth type (`lambda:FunctionUrlAuthType`)
    pub fn auth_type(&self) -> Option<&str> {
        self.condition.first_value(FUNCTION_URL_AUTH_TYPE_KEY)
    }

    /// Whether this statement governs invocation through a function URL
    pub fn is_function_url_invoke(&self) -> bool {
        self.action.contains(INVOKE_FUNCTION_URL_ACTION)
    }
}
