//! File helpers

use std::path::Path;
use tracing::debug;

use crate::error::Result;

/// Decides whether an existing file may be replaced
pub trait Confirm {
    /// Answer a yes/no `question`
    fn confirm(&self, question: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, question: &str) -> bool {
        self(question)
    }
}

/// Always replace existing files
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOverwrite;

impl Confirm for AlwaysOverwrite {
    fn confirm(&self, _question: &str) -> bool {
        true
    }
}

/// Never replace existing files
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverOverwrite;

impl Confirm for NeverOverwrite {
    fn confirm(&self, _question: &str) -> bool {
        false
    }
}

/// Write `contents` to `path`, asking before replacing an existing file
///
/// Returns `Ok(false)` if the file existed and the answer was no. With a
/// `mode`, the file permissions are set after writing (Unix only; ignored
/// elsewhere).
pub fn save_file(
    path: impl AsRef<Path>,
    contents: &[u8],
    mode: Option<u32>,
    confirm: &dyn Confirm,
) -> Result<bool> {
    let path = path.as_ref();
    if path.exists() {
        let question = format!("Overwrite existing file {}?", path.display());
        if !confirm.confirm(&question) {
            debug!("Keeping existing file {}", path.display());
            return Ok(false);
        }
    }

    debug!("Writing {} bytes to {}", contents.len(), path.display());
    std::fs::write(path, contents)?;

    #[cfg(unix)]
    if let Some(mode) = mode {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    Ok(true)
}
