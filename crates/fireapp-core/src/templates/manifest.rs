//! Keyed path manifests for template directories and files

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path};

/// Ordered mapping from a logical key to a path relative to a root.
///
/// The same relative path names the template source and the project
/// destination; only the root differs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathManifest(IndexMap<String, String>);

impl PathManifest {
    pub fn get(&self, key: &str) -> Option<&Path> {
        self.0.get(key).map(Path::new)
    }

    /// Entries in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.0.iter().map(|(k, v)| (k.as_str(), Path::new(v)))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every path must stay inside its root
    pub fn validate(&self, section: &str) -> Result<()> {
        for (key, path) in self.iter() {
            if !is_contained(path) {
                return Err(Error::Config(format!(
                    "{}.{}: {:?} must be a relative path inside the project",
                    section,
                    key,
                    path.display().to_string()
                )));
            }
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PathManifest {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

fn is_contained(path: &Path) -> bool {
    let mut components = path.components().peekable();
    if components.peek().is_none() {
        return false;
    }
    components.all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
