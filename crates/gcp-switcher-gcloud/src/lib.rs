// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod run;

pub use run::{Captured, run_attached, run_captured};

use gcp_switcher_app::{Account, FailureKind, OpFailure, Project};
use serde::de::DeserializeOwned;
use std::env;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BINARY: &str = "gcloud";

const ACTIVE_ACCOUNT_ARGS: [&str; 4] = [
    "auth",
    "list",
    "--filter=status:ACTIVE",
    "--format=value(account)",
];
const ACTIVE_PROJECT_ARGS: [&str; 3] = ["config", "get-value", "project"];
const LIST_ACCOUNTS_ARGS: [&str; 3] = ["auth", "list", "--format=json"];
const LIST_PROJECTS_ARGS: [&str; 3] = ["projects", "list", "--format=json"];
const LOGIN_ARGS: [&str; 2] = ["auth", "login"];
const ADC_LOGIN_ARGS: [&str; 3] = ["auth", "application-default", "login"];

#[derive(Debug, thiserror::Error)]
pub enum GcloudError {
    #[error("gcloud binary not found: {binary}")]
    MissingBinary { binary: String },
    #[error("command timed out after {timeout_ms}ms: gcloud {command}")]
    Timeout { command: String, timeout_ms: u64 },
    #[error("gcloud {command} failed with exit code {exit_code}: {output}")]
    NonZeroExit {
        command: String,
        exit_code: i32,
        output: String,
    },
    #[error("unexpected output from gcloud {command}: {reason}")]
    Malformed { command: String, reason: String },
    #[error(
        "account {account} is not authenticated\n\nPlease run 'gcloud auth login {account}' to authenticate this account first."
    )]
    NotAuthenticated { account: String },
    #[error(
        "failed to switch to account {account}:\n{output}\n\nPlease ensure the account is authenticated. Run 'gcloud auth login {account}' if needed."
    )]
    AccountSwitch { account: String, output: String },
    #[error(
        "failed to switch to project {project}:\n{output}\n\nPlease ensure you have access to this project and that it exists."
    )]
    ProjectSwitch { project: String, output: String },
    #[error("io error running gcloud {command}: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl GcloudError {
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::MissingBinary { .. } => FailureKind::ToolMissing,
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::NonZeroExit { .. } | Self::AccountSwitch { .. } | Self::ProjectSwitch { .. } => {
                FailureKind::NonZeroExit
            }
            Self::Malformed { .. } => FailureKind::Malformed,
            Self::NotAuthenticated { .. } => FailureKind::NotAuthenticated,
            Self::Io { .. } => FailureKind::Io,
        }
    }
}

impl From<&GcloudError> for OpFailure {
    fn from(error: &GcloudError) -> Self {
        Self::new(error.kind(), error.to_string())
    }
}

impl From<GcloudError> for OpFailure {
    fn from(error: GcloudError) -> Self {
        Self::from(&error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Reads and project switches.
    pub command: Duration,
    /// Account switches, including the authentication precheck.
    pub long: Duration,
    /// Each interactive login step.
    pub login: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            command: Duration::from_secs(5),
            long: Duration::from_secs(30),
            login: Duration::from_secs(5 * 60),
        }
    }
}

/// Thin wrapper over the `gcloud` executable. Every method blocks the calling
/// thread for at most its configured timeout.
#[derive(Debug, Clone)]
pub struct Gcloud {
    binary: String,
    timeouts: Timeouts,
    application_default_login: bool,
}

impl Default for Gcloud {
    fn default() -> Self {
        Self::new(DEFAULT_BINARY, Timeouts::default())
    }
}

impl Gcloud {
    pub fn new(binary: impl Into<String>, timeouts: Timeouts) -> Self {
        Self {
            binary: binary.into(),
            timeouts,
            application_default_login: true,
        }
    }

    pub fn with_application_default_login(mut self, enabled: bool) -> Self {
        self.application_default_login = enabled;
        self
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    pub const fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    fn capture(&self, args: &[&str], timeout: Duration) -> Result<Captured, GcloudError> {
        run_captured(&self.binary, args, timeout)
    }

    /// True when the binary resolves: an explicit path must be a file, a bare
    /// name must appear on `PATH`.
    pub fn is_available(&self) -> bool {
        let binary = Path::new(&self.binary);
        if binary.components().count() > 1 {
            return binary.is_file();
        }
        let Some(paths) = env::var_os("PATH") else {
            return false;
        };
        env::split_paths(&paths).any(|dir| dir.join(binary).is_file())
    }

    pub fn active_account(&self) -> Result<String, GcloudError> {
        let out = self.capture(&ACTIVE_ACCOUNT_ARGS, self.timeouts.command)?;
        Ok(first_line(&out.stdout))
    }

    /// Empty when no project is configured.
    pub fn active_project(&self) -> Result<String, GcloudError> {
        let out = self.capture(&ACTIVE_PROJECT_ARGS, self.timeouts.command)?;
        Ok(first_line(&out.stdout))
    }

    pub fn list_accounts(&self) -> Result<Vec<Account>, GcloudError> {
        let out = self.capture(&LIST_ACCOUNTS_ARGS, self.timeouts.command)?;
        Ok(decode_list(&LIST_ACCOUNTS_ARGS, &out.stdout))
    }

    pub fn list_projects(&self) -> Result<Vec<Project>, GcloudError> {
        let out = self.capture(&LIST_PROJECTS_ARGS, self.timeouts.command)?;
        Ok(decode_list(&LIST_PROJECTS_ARGS, &out.stdout))
    }

    /// Confirms the account is already credentialed, then makes it active.
    pub fn switch_account(&self, account: &str) -> Result<(), GcloudError> {
        let filter = format!("--filter=account:{account}");
        let precheck = self.capture(
            &["auth", "list", &filter, "--format=value(account)"],
            self.timeouts.long,
        );
        let authenticated = match precheck {
            Ok(out) => !out.stdout.trim().is_empty(),
            Err(error @ GcloudError::Timeout { .. }) => return Err(error),
            Err(error) => {
                tracing::warn!(%error, account, "account precheck failed");
                false
            }
        };
        if !authenticated {
            return Err(GcloudError::NotAuthenticated {
                account: account.to_owned(),
            });
        }

        match self.capture(&["config", "set", "account", account], self.timeouts.long) {
            Ok(_) => {
                tracing::info!(account, "active account switched");
                Ok(())
            }
            Err(GcloudError::NonZeroExit { output, .. }) => Err(GcloudError::AccountSwitch {
                account: account.to_owned(),
                output,
            }),
            Err(error) => Err(error),
        }
    }

    pub fn switch_project(&self, project: &str) -> Result<(), GcloudError> {
        match self.capture(&["config", "set", "project", project], self.timeouts.command) {
            Ok(_) => {
                tracing::info!(project, "active project switched");
                Ok(())
            }
            Err(GcloudError::NonZeroExit { output, .. }) => Err(GcloudError::ProjectSwitch {
                project: project.to_owned(),
                output,
            }),
            Err(error) => Err(error),
        }
    }

    /// Interactive browser login. Must run while the terminal belongs to the
    /// child process.
    pub fn login(&self) -> Result<(), GcloudError> {
        run_attached(&self.binary, &LOGIN_ARGS, self.timeouts.login)?;
        if self.application_default_login {
            run_attached(&self.binary, &ADC_LOGIN_ARGS, self.timeouts.login)?;
        }
        tracing::info!("login finished");
        Ok(())
    }
}

fn first_line(stdout: &str) -> String {
    stdout.lines().next().unwrap_or_default().trim().to_owned()
}

fn decode_list<T: DeserializeOwned>(args: &[&str], stdout: &str) -> Vec<T> {
    if stdout.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str(stdout) {
        Ok(rows) => rows,
        Err(error) => {
            let malformed = GcloudError::Malformed {
                command: args.join(" "),
                reason: error.to_string(),
            };
            tracing::warn!(error = %malformed, "treating malformed list as empty");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Gcloud, GcloudError, Timeouts, decode_list, first_line};
    use gcp_switcher_app::{FailureKind, OpFailure, Project};

    #[test]
    fn first_line_trims_and_ignores_the_rest() {
        assert_eq!(first_line("  a@example.com \nb@example.com\n"), "a@example.com");
        assert_eq!(first_line(""), "");
    }

    #[test]
    fn malformed_or_blank_list_decodes_empty() {
        let args = ["projects", "list", "--format=json"];
        assert!(decode_list::<Project>(&args, "not json").is_empty());
        assert!(decode_list::<Project>(&args, "  \n").is_empty());
        let rows: Vec<Project> = decode_list(&args, r#"[{"projectId":"p1","name":"One"}]"#);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn errors_flatten_into_failures_with_kind() {
        let timeout = GcloudError::Timeout {
            command: "config get-value project".to_owned(),
            timeout_ms: 5000,
        };
        let failure = OpFailure::from(&timeout);
        assert!(failure.is_timeout());
        assert_eq!(
            failure.message,
            "command timed out after 5000ms: gcloud config get-value project"
        );

        let denied = GcloudError::NotAuthenticated {
            account: "user@example.com".to_owned(),
        };
        let failure = OpFailure::from(denied);
        assert_eq!(failure.kind, FailureKind::NotAuthenticated);
        assert!(
            failure
                .message
                .contains("Please run 'gcloud auth login user@example.com'")
        );
    }

    #[test]
    fn missing_explicit_path_is_unavailable() {
        let gcloud = Gcloud::new("/definitely/not/here/gcloud", Timeouts::default());
        assert!(!gcloud.is_available());
        assert_eq!(Gcloud::default().binary(), "gcloud");
    }
}
