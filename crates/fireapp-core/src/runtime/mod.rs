//! External process plumbing
//!
//! This module provides:
//! - Subprocess invocation with per-stream stdio policies
//! - A supervisor that tears down long-lived children
//! - Project generation, dependency installation and platform CLI management

pub mod mock;
pub mod packages;
pub mod process;
pub mod supervisor;
pub mod tool;
pub mod toolchain;
pub mod version;

pub use packages::InstallPlan;
pub use process::{
    ChildHandle, ExitStatus, ProcessCommand, ProcessOutput, ProcessRunner, StdioPolicy, Stream,
    TokioProcessRunner,
};
pub use supervisor::{ChildId, Supervisor, SupervisorGuard};
pub use tool::PlatformTool;
pub use toolchain::Toolchain;
pub use version::{InstallDecision, InstallReason, Probe};
