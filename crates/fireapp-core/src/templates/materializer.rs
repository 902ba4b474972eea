//! Directory creation and template file copying
//!
//! Both operations are safe to repeat: existing directories are kept and
//! existing files are only replaced when the user says so.

use super::manifest::PathManifest;
use crate::error::{Error, Result};
use crate::prompt::Prompter;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirOutcome {
    Created,
    AlreadyExists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Created,
    Overwritten,
    Skipped,
}

/// Create every manifest directory under `root`.
///
/// A directory that already exists is reported and left alone; any other
/// failure aborts.
pub async fn create_directories(
    directories: &PathManifest,
    root: &Path,
) -> Result<Vec<(String, DirOutcome)>> {
    let mut outcomes = Vec::with_capacity(directories.len());

    for (key, relative) in directories.iter() {
        let path = root.join(relative);
        let outcome = match fs::create_dir(&path).await {
            Ok(()) => {
                tracing::info!("Directory {} created at {}", key, path.display());
                DirOutcome::Created
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                tracing::warn!("Directory {} already exists. Skipping ......", path.display());
                DirOutcome::AlreadyExists
            }
            Err(e) => return Err(Error::io("Failed to create directory", &path)(e)),
        };
        outcomes.push((key.to_string(), outcome));
    }

    Ok(outcomes)
}

/// Copy every manifest file from `template_root` to `target_root`.
///
/// Copies never replace an existing destination without asking: the
/// prompter is asked to confirm (default no) and the file is overwritten or
/// skipped accordingly.
pub async fn copy_files(
    files: &PathManifest,
    template_root: &Path,
    target_root: &Path,
    prompter: &dyn Prompter,
) -> Result<Vec<(String, CopyOutcome)>> {
    let mut outcomes = Vec::with_capacity(files.len());

    for (key, relative) in files.iter() {
        let source = template_root.join(relative);
        let destination = target_root.join(relative);

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(Error::io("Failed to create directory", parent))?;
        }

        let outcome = if copy_exclusive(&source, &destination).await? {
            tracing::info!("File {} created at {}", key, destination.display());
            CopyOutcome::Created
        } else {
            let question = format!(
                "File {} already exists. Do you want to overwrite it?",
                destination.display()
            );
            if prompter.confirm(&question, false)? {
                fs::copy(&source, &destination)
                    .await
                    .map_err(Error::io("Failed to overwrite", &destination))?;
                tracing::info!("File {} overwritten at {}", key, destination.display());
                CopyOutcome::Overwritten
            } else {
                tracing::warn!("Skipping file {}", destination.display());
                CopyOutcome::Skipped
            }
        };
        outcomes.push((key.to_string(), outcome));
    }

    Ok(outcomes)
}

/// Copy `source` to a destination that must not exist yet.
/// Returns `Ok(false)` if the destination already exists.
async fn copy_exclusive(source: &Path, destination: &Path) -> Result<bool> {
    let mut input = fs::File::open(source)
        .await
        .map_err(Error::io("Failed to open template file", source))?;

    let mut output = match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(destination)
        .await
    {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(Error::io("Failed to create", destination)(e)),
    };

    let written = async {
        tokio::io::copy(&mut input, &mut output).await?;
        output.sync_all().await
    }
    .await;

    if let Err(e) = written {
        // A truncated file would later pass as an existing one
        drop(output);
        if let Err(cleanup) = fs::remove_file(destination).await {
            tracing::warn!("Failed to remove partial file {}: {}", destination.display(), cleanup);
        }
        return Err(Error::io("Failed to write", destination)(e));
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{Answer, ScriptedPrompter};
    use std::collections::BTreeSet;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn directories() -> PathManifest {
        [
            ("hooks", "src/hooks"),
            ("assets", "src/assets"),
            ("pages", "src/pages"),
        ]
        .into_iter()
        .collect()
    }

    fn files() -> PathManifest {
        [
            ("rundev", "rundev.js"),
            ("firebase", "src/firebase.js"),
            ("logo", "src/assets/firebase-logo.png"),
        ]
        .into_iter()
        .collect()
    }

    fn template() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src/assets")).unwrap();
        std::fs::write(dir.path().join("rundev.js"), "// dev runner\n").unwrap();
        std::fs::write(dir.path().join("src/firebase.js"), "export const app = 1;\n").unwrap();
        std::fs::write(
            dir.path().join("src/assets/firebase-logo.png"),
            [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0xff],
        )
        .unwrap();
        dir
    }

    fn project() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("demo-app");
        std::fs::create_dir_all(root.join("src")).unwrap();
        (dir, root)
    }

    fn tree(root: &Path) -> BTreeSet<PathBuf> {
        fn walk(root: &Path, dir: &Path, out: &mut BTreeSet<PathBuf>) {
            for entry in std::fs::read_dir(dir).unwrap() {
                let path = entry.unwrap().path();
                out.insert(path.strip_prefix(root).unwrap().to_path_buf());
                if path.is_dir() {
                    walk(root, &path, out);
                }
            }
        }
        let mut out = BTreeSet::new();
        walk(root, root, &mut out);
        out
    }

    #[tokio::test]
    async fn test_create_directories_is_idempotent() {
        let (_tmp, root) = project();

        let first = create_directories(&directories(), &root).await.unwrap();
        assert!(first.iter().all(|(_, o)| *o == DirOutcome::Created));
        let after_once = tree(&root);

        let second = create_directories(&directories(), &root).await.unwrap();
        assert!(second.iter().all(|(_, o)| *o == DirOutcome::AlreadyExists));
        assert_eq!(tree(&root), after_once);
    }

    #[tokio::test]
    async fn test_create_directories_fails_without_parent() {
        let tmp = TempDir::new().unwrap();
        let missing_root = tmp.path().join("not-generated");

        let err = create_directories(&directories(), &missing_root)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[tokio::test]
    async fn test_copy_files_into_empty_project_is_byte_identical() {
        let template = template();
        let (_tmp, root) = project();
        let prompter = ScriptedPrompter::defaults();

        let outcomes = copy_files(&files(), template.path(), &root, &prompter)
            .await
            .unwrap();

        assert!(outcomes.iter().all(|(_, o)| *o == CopyOutcome::Created));
        assert!(prompter.asked().is_empty());
        for (_, relative) in files().iter() {
            assert_eq!(
                std::fs::read(template.path().join(relative)).unwrap(),
                std::fs::read(root.join(relative)).unwrap()
            );
        }
    }

    #[tokio::test]
    async fn test_conflict_answered_no_keeps_destination() {
        let template = template();
        let (_tmp, root) = project();
        std::fs::write(root.join("rundev.js"), "// customised\n").unwrap();
        let prompter = ScriptedPrompter::new([Answer::Confirm(false)]);

        let outcomes = copy_files(&files(), template.path(), &root, &prompter)
            .await
            .unwrap();

        assert_eq!(outcomes[0], ("rundev".to_string(), CopyOutcome::Skipped));
        assert_eq!(
            std::fs::read_to_string(root.join("rundev.js")).unwrap(),
            "// customised\n"
        );
        let asked = prompter.asked();
        assert_eq!(asked.len(), 1);
        assert_eq!(asked[0].default, Some(Answer::Confirm(false)));
    }

    #[tokio::test]
    async fn test_conflict_answered_yes_overwrites() {
        let template = template();
        let (_tmp, root) = project();
        std::fs::write(root.join("rundev.js"), "// customised and much longer\n").unwrap();
        let prompter = ScriptedPrompter::new([Answer::Confirm(true)]);

        let outcomes = copy_files(&files(), template.path(), &root, &prompter)
            .await
            .unwrap();

        assert_eq!(outcomes[0], ("rundev".to_string(), CopyOutcome::Overwritten));
        assert_eq!(
            std::fs::read(root.join("rundev.js")).unwrap(),
            std::fs::read(template.path().join("rundev.js")).unwrap()
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_copy_leaves_no_partial_file() {
        let template = TempDir::new().unwrap();
        // Opening succeeds but reading a directory fails mid-copy
        std::fs::create_dir(template.path().join("rundev.js")).unwrap();
        let (_tmp, root) = project();

        let err = copy_files(&files(), template.path(), &root, &ScriptedPrompter::defaults())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(!root.join("rundev.js").exists());
    }

    #[tokio::test]
    async fn test_missing_template_file_is_fatal() {
        let template = TempDir::new().unwrap();
        let (_tmp, root) = project();

        let err = copy_files(&files(), template.path(), &root, &ScriptedPrompter::defaults())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(!root.join("rundev.js").exists());
    }
}
