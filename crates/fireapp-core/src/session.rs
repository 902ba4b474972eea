//! Answers gathered at the start of a run

use crate::error::{Error, Result};
use crate::runtime::toolchain::Toolchain;
use std::path::{Path, PathBuf};

/// The app name and toolchain chosen by the user; fixed for the rest of the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub app_name: String,
    pub toolchain: Toolchain,
}

impl Session {
    pub fn new(app_name: impl Into<String>, toolchain: Toolchain) -> Result<Self> {
        let app_name = app_name.into();
        validate_app_name(&app_name)?;
        Ok(Self {
            app_name,
            toolchain,
        })
    }

    /// Directory the generator creates for this app inside `workspace`
    pub fn project_root(&self, workspace: &Path) -> PathBuf {
        workspace.join(&self.app_name)
    }
}

/// The name becomes a single directory under the workspace
fn validate_app_name(name: &str) -> Result<()> {
    let reason = if name.trim().is_empty() {
        "must not be empty"
    } else if name != name.trim() {
        "must not start or end with whitespace"
    } else if name == "." || name == ".." {
        "must name a new directory"
    } else if name.contains(['/', '\\']) {
        "must not contain path separators"
    } else {
        return Ok(());
    };

    Err(Error::InvalidAppName {
        name: name.to_string(),
        reason,
    })
}
