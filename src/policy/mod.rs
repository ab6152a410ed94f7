//! Function URL resource policies
//!
//! Decodes resource-policy statements and answers three questions about
//! each of them without exposing the wire shape:
//! - who is the principal (wildcard, account ID or service name)
//! - which organization the caller must belong to (`aws:PrincipalOrgID`)
//! - which resource may invoke (`aws:SourceArn`)

mod arn;
mod condition;
mod document;
mod principal;
mod statement;

pub use arn::{account_id, Arn};
pub use condition::{
    ConditionBlock, ConditionValue, OperatorConditions, FUNCTION_URL_AUTH_TYPE_KEY,
    PRINCIPAL_ORG_ID_KEY, SOURCE_ARN_KEY,
};
pub use document::PolicyDocument;
pub use principal::{Principal, AWS_KEY, SERVICE_KEY, WILDCARD};
pub use statement::{Effect, OneOrMany, PolicyStatement, INVOKE_FUNCTION_URL_ACTION};
