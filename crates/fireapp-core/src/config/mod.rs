//! Scaffold configuration
//!
//! Everything the pipeline does to a project is described here as data: which
//! generator to run, which directories and files to materialize, how to patch
//! the package manifest, which packages to install and which platform CLI to
//! bootstrap. The built-in defaults live in `defaults.yaml`; a `scaffold.yaml`
//! in the template directory replaces them.

use crate::error::{Error, Result};
use crate::runtime::toolchain::Toolchain;
use crate::templates::manifest::PathManifest;
use crate::templates::patch::ManifestPatch;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the configuration override inside a template directory
pub const CONFIG_FILE_NAME: &str = "scaffold.yaml";

const DEFAULTS: &str = include_str!("defaults.yaml");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScaffoldConfig {
    /// Suggested answer for the app name prompt
    pub default_app_name: String,

    /// Program used to run project generators (e.g. `npx`)
    pub launcher: String,

    /// Package manager used for dependency and global installs
    pub package_manager: String,

    /// Label shown in the toolchain prompt -> generator package
    pub toolchains: IndexMap<String, String>,

    /// Directories created under the project root before copying files
    #[serde(default)]
    pub directories: PathManifest,

    /// Template files copied into the project
    #[serde(default)]
    pub files: PathManifest,

    pub manifest: ManifestPatch,

    /// Package name -> installed as a dev dependency
    #[serde(default)]
    pub dependencies: IndexMap<String, bool>,

    pub platform: PlatformConfig,
}

/// The backend platform's command-line tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformConfig {
    pub display_name: String,
    /// Binary name on PATH
    pub binary: String,
    /// Package that provides the binary when installed globally
    pub package: String,
    pub version_flag: String,
    /// Installed versions with at least this major version are kept
    pub minimum_major: u64,
    pub login_args: Vec<String>,
    pub init_args: Vec<String>,
}

impl ScaffoldConfig {
    /// The configuration compiled into the binary
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(DEFAULTS, Path::new("defaults.yaml"))
    }

    /// Parse and validate a configuration document; `origin` is only used in error messages
    pub fn from_yaml(content: &str, origin: &Path) -> Result<Self> {
        let config: ScaffoldConfig =
            serde_yaml::from_str(content).map_err(|source| Error::ConfigParse {
                path: origin.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `scaffold.yaml` from the template directory, or fall back to the built-in defaults
    pub fn load(template_dir: &Path) -> Result<Self> {
        let path = template_dir.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            tracing::debug!(path = %path.display(), "no scaffold.yaml, using built-in configuration");
            return Self::builtin();
        }

        let content = std::fs::read_to_string(&path)
            .map_err(Error::io("Failed to read", &path))?;
        tracing::info!("Using configuration from {}", path.display());
        Self::from_yaml(&content, &path)
    }

    /// Registered toolchains in declaration order
    pub fn toolchains(&self) -> Vec<Toolchain> {
        self.toolchains
            .iter()
            .map(|(label, token)| Toolchain::new(label, token))
            .collect()
    }

    /// Path of the package manifest inside a project root
    pub fn manifest_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.manifest.path)
    }

    pub fn validate(&self) -> Result<()> {
        if self.toolchains.is_empty() {
            return Err(Error::Config("at least one toolchain is required".into()));
        }
        for (label, token) in &self.toolchains {
            require_non_blank(&format!("toolchain {:?}", label), token)?;
        }

        require_non_blank("launcher", &self.launcher)?;
        require_non_blank("package_manager", &self.package_manager)?;
        require_non_blank("platform.binary", &self.platform.binary)?;
        require_non_blank("platform.package", &self.platform.package)?;

        for package in self.dependencies.keys() {
            require_non_blank("dependency name", package)?;
        }

        self.directories.validate("directories")?;
        self.files.validate("files")?;
        self.manifest.validate()?;
        Ok(())
    }
}

fn require_non_blank(what: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::Config(format!("{} must not be empty", what)))
    } else {
        Ok(())
    }
}
