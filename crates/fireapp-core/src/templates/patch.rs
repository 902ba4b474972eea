//! Package manifest patching
//!
//! Two strategies are supported. `Structured` parses the manifest as JSON and
//! upserts entries under `scripts` by name. `LineIndex` splices raw lines at
//! fixed positions; it only produces a valid manifest as long as the
//! generator keeps the exact line layout the patches were written against.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatchStrategy {
    #[default]
    Structured,
    LineIndex,
}

/// Replace `delete` lines at the keyed index with `line`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinePatch {
    #[serde(default)]
    pub delete: usize,
    pub line: String,
}

/// How to rewrite the generated project's package manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestPatch {
    /// Manifest location relative to the project root
    pub path: String,

    #[serde(default)]
    pub strategy: PatchStrategy,

    /// 0-based line index -> patch, used by `LineIndex`
    #[serde(default)]
    pub line_patches: BTreeMap<usize, LinePatch>,

    /// Script name -> command, used by `Structured`
    #[serde(default)]
    pub scripts: IndexMap<String, String>,
}

impl ManifestPatch {
    pub fn validate(&self) -> Result<()> {
        if self.path.trim().is_empty() {
            return Err(Error::Config("manifest.path must not be empty".into()));
        }
        let empty = match self.strategy {
            PatchStrategy::Structured => self.scripts.is_empty(),
            PatchStrategy::LineIndex => self.line_patches.is_empty(),
        };
        if empty {
            tracing::warn!(strategy = ?self.strategy, "manifest patch has nothing to apply");
        }
        Ok(())
    }

    /// Rewrite manifest `content` according to the configured strategy
    pub fn apply(&self, content: &str, origin: &Path) -> Result<String> {
        match self.strategy {
            PatchStrategy::Structured => upsert_scripts(content, &self.scripts, origin),
            PatchStrategy::LineIndex => Ok(splice_lines(content, &self.line_patches)),
        }
    }
}

/// Apply line patches in ascending index order, each at its recorded index.
///
/// Indices are not adjusted for lines inserted or removed by earlier
/// patches. Indices past the end clamp to the end of the buffer.
pub fn splice_lines(content: &str, patches: &BTreeMap<usize, LinePatch>) -> String {
    let mut lines: Vec<&str> = content.split('\n').collect();

    for (&index, patch) in patches {
        let start = index.min(lines.len());
        let end = start.saturating_add(patch.delete).min(lines.len());
        lines.splice(start..end, std::iter::once(patch.line.as_str()));
    }

    lines.join("\n")
}

/// Set each named script in the manifest's `scripts` object
pub fn upsert_scripts(
    content: &str,
    scripts: &IndexMap<String, String>,
    origin: &Path,
) -> Result<String> {
    let parse_error = |source| Error::ManifestParse {
        path: origin.to_path_buf(),
        source,
    };

    let mut manifest: Value = serde_json::from_str(content).map_err(parse_error)?;
    let Value::Object(root) = &mut manifest else {
        return Err(Error::Config(format!(
            "{} is not a JSON object",
            origin.display()
        )));
    };

    let entry = root
        .entry("scripts")
        .or_insert_with(|| Value::Object(Default::default()));
    let Value::Object(existing) = entry else {
        return Err(Error::Config(format!(
            "\"scripts\" in {} is not an object",
            origin.display()
        )));
    };

    for (name, command) in scripts {
        existing.insert(name.clone(), Value::String(command.clone()));
    }

    let mut output = serde_json::to_string_pretty(&manifest).map_err(parse_error)?;
    if content.ends_with('\n') {
        output.push('\n');
    }
    Ok(output)
}

/// Read the manifest at `path`, patch it and write it back in place
pub async fn patch_manifest(path: &Path, patch: &ManifestPatch) -> Result<()> {
    tracing::info!("Updating {} ......", path.display());

    let content = fs::read_to_string(path)
        .await
        .map_err(Error::io("Failed to read", path))?;
    let patched = patch.apply(&content, path)?;
    fs::write(path, patched)
        .await
        .map_err(Error::io("Failed to write", path))?;

    tracing::info!("{} successfully updated", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// package.json as written by create-react-app
    const GENERATED: &str = r#"{
  "name": "demo-app",
  "version": "0.1.0",
  "private": true,
  "dependencies": {
    "@testing-library/jest-dom": "^5.17.0",
    "@testing-library/react": "^13.4.0",
    "@testing-library/user-event": "^13.5.0",
    "react": "^18.2.0",
    "react-dom": "^18.2.0",
    "react-scripts": "5.0.1",
    "web-vitals": "^2.1.4"
  },
  "scripts": {
    "start": "react-scripts start",
    "build": "react-scripts build",
    "test": "react-scripts test",
    "eject": "react-scripts eject"
  },
  "eslintConfig": {
    "extends": [
      "react-app",
      "react-app/jest"
    ]
  }
}
"#;

    const DEV: &str = r#"    "dev": "node rundev.js","#;
    const BUILD: &str =
        r#"    "build": "cross-env REACT_APP_ENV=production react-scripts build","#;

    fn firebase_line_patches() -> BTreeMap<usize, LinePatch> {
        BTreeMap::from([
            (
                15,
                LinePatch {
                    delete: 0,
                    line: DEV.to_string(),
                },
            ),
            (
                16,
                LinePatch {
                    delete: 1,
                    line: BUILD.to_string(),
                },
            ),
        ])
    }

    #[test]
    fn test_splice_places_lines_at_declared_indices() {
        let patched = splice_lines(GENERATED, &firebase_line_patches());
        let lines: Vec<&str> = patched.split('\n').collect();

        assert_eq!(lines[14], r#"    "start": "react-scripts start","#);
        assert_eq!(lines[15], DEV);
        assert_eq!(lines[16], BUILD);
        assert_eq!(lines[17], r#"    "test": "react-scripts test","#);
        // One insertion, one replacement
        assert_eq!(lines.len(), GENERATED.split('\n').count() + 1);
        assert!(!patched.contains(r#""build": "react-scripts build""#));
        assert!(patched.ends_with("}\n"));

        let parsed: Value = serde_json::from_str(&patched).unwrap();
        assert_eq!(parsed["scripts"]["dev"], "node rundev.js");
    }

    #[test]
    fn test_splice_does_not_compensate_for_shifts() {
        let patches = BTreeMap::from([
            (
                0,
                LinePatch {
                    delete: 0,
                    line: "x".to_string(),
                },
            ),
            (
                1,
                LinePatch {
                    delete: 1,
                    line: "y".to_string(),
                },
            ),
        ]);
        // "a" was shifted to index 1 by the first insertion and is the line replaced
        assert_eq!(splice_lines("a\nb", &patches), "x\ny\nb");
    }

    #[test]
    fn test_splice_clamps_past_the_end() {
        let patches = BTreeMap::from([(
            99,
            LinePatch {
                delete: 3,
                line: "tail".to_string(),
            },
        )]);
        assert_eq!(splice_lines("a\nb", &patches), "a\nb\ntail");
    }

    #[test]
    fn test_upsert_replaces_in_place_and_appends() {
        let scripts = IndexMap::from([
            ("dev".to_string(), "node rundev.js".to_string()),
            (
                "build".to_string(),
                "cross-env REACT_APP_ENV=production react-scripts build".to_string(),
            ),
        ]);
        let patched = upsert_scripts(GENERATED, &scripts, Path::new("package.json")).unwrap();
        let parsed: Value = serde_json::from_str(&patched).unwrap();

        let names: Vec<&String> = parsed["scripts"].as_object().unwrap().keys().collect();
        assert_eq!(names, vec!["start", "build", "test", "eject", "dev"]);
        assert_eq!(
            parsed["scripts"]["build"],
            "cross-env REACT_APP_ENV=production react-scripts build"
        );
        // Top-level key order is preserved
        let top: Vec<&String> = parsed.as_object().unwrap().keys().collect();
        assert_eq!(top[0], "name");
        assert!(patched.ends_with("}\n"));
    }

    #[test]
    fn test_upsert_creates_missing_scripts_object() {
        let scripts = IndexMap::from([("dev".to_string(), "node rundev.js".to_string())]);
        let patched = upsert_scripts(r#"{"name":"x"}"#, &scripts, Path::new("package.json")).unwrap();
        let parsed: Value = serde_json::from_str(&patched).unwrap();
        assert_eq!(parsed["scripts"]["dev"], "node rundev.js");
        assert!(!patched.ends_with('\n'));
    }

    #[test]
    fn test_upsert_rejects_invalid_json() {
        let err = upsert_scripts("{ not json", &IndexMap::new(), Path::new("package.json"))
            .unwrap_err();
        assert!(matches!(err, Error::ManifestParse { .. }));
    }

    #[tokio::test]
    async fn test_patch_manifest_rewrites_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("package.json");
        std::fs::write(&path, GENERATED).unwrap();

        let patch = ManifestPatch {
            path: "package.json".to_string(),
            strategy: PatchStrategy::LineIndex,
            line_patches: firebase_line_patches(),
            scripts: IndexMap::new(),
        };
        patch_manifest(&path, &patch).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.split('\n').nth(15), Some(DEV));
    }

    #[tokio::test]
    async fn test_patch_manifest_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let patch = ManifestPatch {
            path: "package.json".to_string(),
            strategy: PatchStrategy::Structured,
            line_patches: BTreeMap::new(),
            scripts: IndexMap::new(),
        };
        let err = patch_manifest(&dir.path().join("package.json"), &patch)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
