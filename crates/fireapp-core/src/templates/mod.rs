//! Template materialization and package manifest patching
//!
//! This module provides:
//! - Keyed path manifests (PathManifest)
//! - Directory creation and conflict-aware file copying
//! - Package manifest patching (structured or line-indexed)

pub mod manifest;
pub mod materializer;
pub mod patch;

pub use manifest::PathManifest;
pub use materializer::{copy_files, create_directories, CopyOutcome, DirOutcome};
pub use patch::{patch_manifest, LinePatch, ManifestPatch, PatchStrategy};
