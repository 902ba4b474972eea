//! Error types shared by every pipeline component

use std::io;
use std::path::{Path, PathBuf};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures a scaffolding step can produce.
///
/// Every variant is fatal for the pipeline. The only spawn error a caller is
/// expected to recover from is [`Error::is_not_found`] during the platform
/// version probe.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` exited with code {code}")]
    NonZeroExit {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("`{command}` was terminated by signal {signal}")]
    Signalled { command: String, signal: i32 },

    #[error("{context} {}: {source}", path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Prompt failed: {0}")]
    Prompt(#[source] io::Error),

    #[error("Cancelled")]
    Cancelled,

    #[error("Unexpected answer to prompt: {0}")]
    UnexpectedAnswer(String),

    #[error("Invalid app name {name:?}: {reason}")]
    InvalidAppName { name: String, reason: &'static str },

    #[error("Invalid package manifest {}: {source}", path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Build a `map_err` adapter that attaches a path and a short context to an I/O error
    pub fn io<'a>(context: &'static str, path: &'a Path) -> impl FnOnce(io::Error) -> Error + 'a {
        move |source| Error::Io {
            context,
            path: path.to_path_buf(),
            source,
        }
    }

    /// True when a program could not be started because it is not on PATH
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Spawn { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }

    /// Process exit status to use when this error aborts the run
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::NonZeroExit { code, .. } if *code != 0 => *code,
            Error::Signalled { signal, .. } => 128 + signal,
            Error::Cancelled => 130,
            _ => 1,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::Interrupted {
            Error::Cancelled
        } else {
            Error::Prompt(err)
        }
    }
}
