//! # funcurl-policy - Function URL permissions for serverless deployments
//!
//! Reads the resource policies attached to function URLs and the function
//! configuration that goes with them:
//!
//! - **Policy statements** with a polymorphic `Principal` and ordered
//!   `Condition` blocks, reduced to three answers: principal, organization
//!   ID and source ARN
//! - **Strict-then-lenient decoding** that reports unknown fields instead of
//!   failing on them
//! - **Function configuration** (`function.json`) discovery, loading and
//!   validation
//! - **Payload streams** for invoking a function with a series of JSON
//!   documents
//!
//! ## Quick Start
//!
//! ```rust
//! use funcurl_policy::{PolicyStatement, Result};
//!
//! # fn main() -> Result<()> {
//! let stmt = PolicyStatement::from_json(r#"{
//!     "Sid": "cloudfront-oac",
//!     "Effect": "Allow",
//!     "Principal": {"Service": "cloudfront.amazonaws.com"},
//!     "Action": "lambda:InvokeFunctionUrl",
//!     "Resource": "arn:aws:lambda:us-east-1:123456789012:function:hello",
//!     "Condition": {
//!         "ArnLike": {"aws:SourceArn": "arn:aws:cloudfront::123456789012:distribution/E1"}
//!     }
//! }"#)?;
//!
//! assert_eq!(stmt.principal_string(), Some("cloudfront.amazonaws.com"));
//! assert_eq!(stmt.source_arn(), Some("arn:aws:cloudfront::123456789012:distribution/E1"));
//! assert_eq!(stmt.principal_org_id(), None);
//! # Ok(())
//! # }
//! ```
//!
//! ## Loading a function
//!
//! ```rust,no_run
//! use funcurl_policy::{codec::Decoder, function};
//!
//! # fn main() -> funcurl_policy::Result<()> {
//! let path = function::find_function_filename(".");
//! let config = function::load_function(&path, &Decoder::new())?;
//! println!("{}", config.function_name);
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod error;
pub mod function;
pub mod payload;
pub mod policy;
pub mod utils;

pub use crate::{
    codec::{DecodeMode, DecodeWarning, Decoder, WarningSink},
    error::{Error, Result},
    function::FunctionConfig,
    payload::PayloadStream,
    policy::{ConditionBlock, Effect, PolicyDocument, PolicyStatement, Principal},
};
