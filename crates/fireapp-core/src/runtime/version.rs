//! Version gate for the platform CLI

use semver::Version;
use std::fmt;

/// What the platform version probe found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// The binary is not on PATH
    Missing,
    /// The binary ran and exited successfully
    Reported { stdout: String, stderr: String },
}

/// Whether the platform CLI needs a global install
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallDecision {
    Skip { version: String },
    Install { reason: InstallReason },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallReason {
    NotInstalled,
    Outdated { version: String, major: u64 },
    Unrecognized { output: String },
    /// The CLI wrote to stderr while reporting its version
    Diagnostics { stderr: String },
}

impl fmt::Display for InstallReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallReason::NotInstalled => write!(f, "not installed"),
            InstallReason::Outdated { version, .. } => write!(f, "version {} is too old", version),
            InstallReason::Unrecognized { output } => {
                write!(f, "could not read a version from {:?}", output)
            }
            InstallReason::Diagnostics { stderr } => {
                write!(f, "reported problems: {}", stderr.trim())
            }
        }
    }
}

impl InstallDecision {
    pub fn needs_install(&self) -> bool {
        matches!(self, InstallDecision::Install { .. })
    }
}

/// First non-empty line of the probe's standard output
pub fn first_line(output: &str) -> Option<&str> {
    output.lines().map(str::trim).find(|line| !line.is_empty())
}

/// Read the major version from a version line.
///
/// Tries a full semver parse first, then falls back to the numeral before
/// the first `.`.
pub fn parse_major(line: &str) -> Option<u64> {
    let cleaned = line.trim();
    let cleaned = cleaned.strip_prefix('v').unwrap_or(cleaned);

    if let Ok(version) = Version::parse(cleaned) {
        return Some(version.major);
    }

    let (major, _) = cleaned.split_once('.')?;
    major.trim().parse().ok()
}

/// Decide whether to install, given the probe result and the minimum accepted major version.
///
/// The installed CLI is kept only when stderr is empty and the version line
/// reads as recent enough. Any diagnostic output or an unreadable version
/// line counts as "install anyway".
pub fn decide(probe: &Probe, minimum_major: u64) -> InstallDecision {
    let stdout = match probe {
        Probe::Missing => {
            return InstallDecision::Install {
                reason: InstallReason::NotInstalled,
            }
        }
        Probe::Reported { stderr, .. } if !stderr.is_empty() => {
            return InstallDecision::Install {
                reason: InstallReason::Diagnostics {
                    stderr: stderr.clone(),
                },
            }
        }
        Probe::Reported { stdout, .. } => stdout,
    };

    let Some(line) = first_line(stdout) else {
        return InstallDecision::Install {
            reason: InstallReason::Unrecognized {
                output: stdout.clone(),
            },
        };
    };

    match parse_major(line) {
        Some(major) if major >= minimum_major => InstallDecision::Skip {
            version: line.to_string(),
        },
        Some(major) => InstallDecision::Install {
            reason: InstallReason::Outdated {
                version: line.to_string(),
                major,
            },
        },
        None => InstallDecision::Install {
            reason: InstallReason::Unrecognized {
                output: line.to_string(),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reported(stdout: &str) -> Probe {
        Probe::Reported {
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    #[test]
    fn test_major_nine_installs() {
        let decision = decide(&reported("9.23.3\n"), 10);
        assert_eq!(
            decision,
            InstallDecision::Install {
                reason: InstallReason::Outdated {
                    version: "9.23.3".to_string(),
                    major: 9
                }
            }
        );
    }

    #[test]
    fn test_major_ten_skips() {
        assert_eq!(
            decide(&reported("10.0.0\n"), 10),
            InstallDecision::Skip {
                version: "10.0.0".to_string()
            }
        );
    }

    #[test]
    fn test_unparseable_installs() {
        let decision = decide(&reported("firebase-tools unknown build\n"), 10);
        assert!(matches!(
            decision,
            InstallDecision::Install {
                reason: InstallReason::Unrecognized { .. }
            }
        ));
        assert!(decide(&reported(""), 10).needs_install());
    }

    #[test]
    fn test_missing_installs() {
        assert_eq!(
            decide(&Probe::Missing, 10),
            InstallDecision::Install {
                reason: InstallReason::NotInstalled
            }
        );
    }

    #[test]
    fn test_stderr_output_forces_install() {
        let probe = Probe::Reported {
            stdout: "11.2.0\n".to_string(),
            stderr: "(node:123) Warning: something\n".to_string(),
        };
        assert_eq!(
            decide(&probe, 10),
            InstallDecision::Install {
                reason: InstallReason::Diagnostics {
                    stderr: "(node:123) Warning: something\n".to_string()
                }
            }
        );
    }

    #[test]
    fn test_parse_major_variants() {
        assert_eq!(parse_major("11.2.0"), Some(11));
        assert_eq!(parse_major("v12.4.1"), Some(12));
        assert_eq!(parse_major("13.0"), Some(13));
        assert_eq!(parse_major("13.0.0-beta.1"), Some(13));
        assert_eq!(parse_major("eleven.2"), None);
        assert_eq!(parse_major("11"), None);
    }

    #[test]
    fn test_first_line_skips_blank_lines() {
        assert_eq!(first_line("\n  \n11.2.0\nextra"), Some("11.2.0"));
        assert_eq!(first_line("   "), None);
    }
}
