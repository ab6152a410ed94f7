//! Function configuration file
//!
//! A function is described by a `function.json` next to its code, using the
//! platform's PascalCase field names:
//!
//! ```json
//! {
//!   "FunctionName": "hello",
//!   "Handler": "index.handler",
//!   "Runtime": "nodejs20.x",
//!   "MemorySize": 128,
//!   "Timeout": 3
//! }
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::error::Category;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use validator::{Validate, ValidationError};

use crate::codec::{self, marshal_json, Decoder, Schema};
use crate::error::{Error, Result};
use crate::policy::Arn;
use crate::utils::{save_file, Confirm};

/// Candidate file names, in lookup order
pub const FUNCTION_FILENAMES: &[&str] = &["function.json", "function.jsonnet"];

const FUNCTION_NAME_PATTERN: &str = r"^[A-Za-z0-9_-]{1,64}$";

/// Permissions of written function files
pub const FUNCTION_FILE_MODE: u32 = 0o644;

/// Environment variables passed to the function
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Environment {
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

impl Schema for Environment {
    const FIELDS: &'static [&'static str] = &["Variables"];
}

/// Function configuration as stored in `function.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionConfig {
    /// Function name, or a function ARN
    #[validate(custom(function = "validate_function_name"))]
    pub function_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 256))]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,

    /// Execution role ARN
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Memory in MB
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 128, max = 10240))]
    pub memory_size: Option<u32>,

    /// Timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 900))]
    pub timeout: Option<u32>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub architectures: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl Schema for FunctionConfig {
    const FIELDS: &'static [&'static str] = &[
        "FunctionName",
        "Description",
        "Handler",
        "Runtime",
        "Role",
        "MemorySize",
        "Timeout",
        "Architectures",
        "Environment",
        "Layers",
        "Tags",
    ];

    fn nested_unknown_fields(object: &Map<String, Value>, path: &str, unknown: &mut Vec<String>) {
        if let Some(environment) = object.get("Environment") {
            let at = codec::join_path(path, "Environment");
            codec::unknown_fields::<Environment>(environment, &at, unknown);
        }
    }
}

impl FunctionConfig {
    pub fn new(function_name: impl Into<String>) -> Self {
        FunctionConfig {
            function_name: function_name.into(),
            ..Default::default()
        }
    }
}

fn validate_function_name(name: &str) -> std::result::Result<(), ValidationError> {
    let plain = Regex::new(FUNCTION_NAME_PATTERN)
        .map(|re| re.is_match(name))
        .unwrap_or(false);
    if plain || Arn::parse(name).is_some() {
        return Ok(());
    }
    Err(ValidationError::new("invalid function name"))
}

/// First existing function file in `dir`
///
/// Falls back to `function.json` so callers get a sensible path for error
/// messages and for creating a new file.
pub fn find_function_filename(dir: impl AsRef<Path>) -> PathBuf {
    let dir = dir.as_ref();
    FUNCTION_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
        .unwrap_or_else(|| dir.join(FUNCTION_FILENAMES[0]))
}

/// Load and validate a function configuration file
///
/// `.jsonnet` files are accepted only when their content is plain JSON. A
/// jsonnet file that parses as JSON but has wrong field types fails like a
/// `.json` file would.
pub fn load_function(path: impl AsRef<Path>, decoder: &Decoder) -> Result<FunctionConfig> {
    let path = path.as_ref();
    debug!("Loading function from {}", path.display());

    let src = std::fs::read(path)?;
    let origin = path.display().to_string();

    let config: FunctionConfig = match decoder.decode(&src, &origin) {
        Err(Error::Decode(e)) if is_jsonnet(path) && is_parse_error(&e) => {
            return Err(Error::InvalidFunctionFile(format!(
                "{}: jsonnet evaluation is not supported, file must be plain JSON ({})",
                origin, e
            )));
        }
        other => other?,
    };

    config.validate()?;
    Ok(config)
}

/// Validate and write a function configuration as pretty JSON
///
/// Returns `Ok(false)` when an existing file was kept.
pub fn save_function(
    path: impl AsRef<Path>,
    config: &FunctionConfig,
    confirm: &dyn Confirm,
) -> Result<bool> {
    config.validate()?;
    let bytes = marshal_json(config)?;
    save_file(path, &bytes, Some(FUNCTION_FILE_MODE), confirm)
}

fn is_jsonnet(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "jsonnet")
}

/// The text is not JSON at all, as opposed to JSON of the wrong shape
fn is_parse_error(e: &serde_json::Error) -> bool {
    matches!(e.classify(), Category::Syntax | Category::Eof)
}
