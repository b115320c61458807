// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt;

use crate::{Account, Project};

/// Work the reducer asks the runtime to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CheckToolAvailable,
    GetActiveAccount,
    GetActiveProject,
    ListAccounts,
    ListProjects,
    SwitchAccount(String),
    SwitchProject(String),
    LoginNewAccount,
    ArmFallbackTimer,
    Exit,
}

impl Command {
    /// Interactive commands take over the terminal and run on the loop thread.
    pub const fn is_interactive(&self) -> bool {
        matches!(self, Self::LoginNewAccount)
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::CheckToolAvailable => "check gcloud",
            Self::GetActiveAccount => "get active account",
            Self::GetActiveProject => "get active project",
            Self::ListAccounts => "list accounts",
            Self::ListProjects => "list projects",
            Self::SwitchAccount(_) => "switch account",
            Self::SwitchProject(_) => "switch project",
            Self::LoginNewAccount => "login",
            Self::ArmFallbackTimer => "arm fallback timer",
            Self::Exit => "exit",
        }
    }
}

/// The operations dispatched once at startup. The completion total is the
/// length of [`BootstrapOp::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BootstrapOp {
    CheckTool,
    ActiveAccount,
    ActiveProject,
    ListAccounts,
    ListProjects,
}

impl BootstrapOp {
    pub const ALL: [Self; 5] = [
        Self::CheckTool,
        Self::ActiveAccount,
        Self::ActiveProject,
        Self::ListAccounts,
        Self::ListProjects,
    ];

    pub const fn command(self) -> Command {
        match self {
            Self::CheckTool => Command::CheckToolAvailable,
            Self::ActiveAccount => Command::GetActiveAccount,
            Self::ActiveProject => Command::GetActiveProject,
            Self::ListAccounts => Command::ListAccounts,
            Self::ListProjects => Command::ListProjects,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    ToolMissing,
    Timeout,
    NonZeroExit,
    Malformed,
    NotAuthenticated,
    Io,
}

impl FailureKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ToolMissing => "tool missing",
            Self::Timeout => "timeout",
            Self::NonZeroExit => "command failed",
            Self::Malformed => "malformed output",
            Self::NotAuthenticated => "not authenticated",
            Self::Io => "io error",
        }
    }
}

/// A dispatcher failure flattened into plain data so it can cross threads and
/// be compared in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl OpFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub const fn is_timeout(&self) -> bool {
        matches!(self.kind, FailureKind::Timeout)
    }
}

impl fmt::Display for OpFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionSuccess {
    AccountSwitched(String),
    ProjectSwitched(String),
    LoggedIn,
}

/// Exactly one of these is posted back for every dispatched command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    ToolChecked { available: bool },
    ActiveAccount(Result<String, OpFailure>),
    ActiveProject(Result<String, OpFailure>),
    Accounts(Result<Vec<Account>, OpFailure>),
    Projects(Result<Vec<Project>, OpFailure>),
    Action(Result<ActionSuccess, OpFailure>),
}

impl Outcome {
    pub const fn bootstrap_op(&self) -> Option<BootstrapOp> {
        match self {
            Self::ToolChecked { .. } => Some(BootstrapOp::CheckTool),
            Self::ActiveAccount(_) => Some(BootstrapOp::ActiveAccount),
            Self::ActiveProject(_) => Some(BootstrapOp::ActiveProject),
            Self::Accounts(_) => Some(BootstrapOp::ListAccounts),
            Self::Projects(_) => Some(BootstrapOp::ListProjects),
            Self::Action(_) => None,
        }
    }

    pub const fn is_success(&self) -> bool {
        match self {
            Self::ToolChecked { available } => *available,
            Self::ActiveAccount(result) | Self::ActiveProject(result) => result.is_ok(),
            Self::Accounts(result) => result.is_ok(),
            Self::Projects(result) => result.is_ok(),
            Self::Action(result) => result.is_ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BootstrapOp, Command, FailureKind, OpFailure, Outcome};

    #[test]
    fn bootstrap_ops_map_to_distinct_commands() {
        let commands: Vec<Command> = BootstrapOp::ALL.iter().map(|op| op.command()).collect();
        assert_eq!(
            commands,
            vec![
                Command::CheckToolAvailable,
                Command::GetActiveAccount,
                Command::GetActiveProject,
                Command::ListAccounts,
                Command::ListProjects,
            ]
        );
    }

    #[test]
    fn outcomes_name_their_bootstrap_op() {
        let timeout = OpFailure::new(FailureKind::Timeout, "command timed out");
        assert!(timeout.is_timeout());
        assert_eq!(
            Outcome::ActiveProject(Err(timeout.clone())).bootstrap_op(),
            Some(BootstrapOp::ActiveProject)
        );
        assert_eq!(Outcome::Action(Err(timeout)).bootstrap_op(), None);
        assert!(!Outcome::ToolChecked { available: false }.is_success());
    }

    #[test]
    fn only_login_is_interactive() {
        assert!(Command::LoginNewAccount.is_interactive());
        assert!(!Command::SwitchAccount("a@example.com".to_owned()).is_interactive());
        assert!(!Command::ListProjects.is_interactive());
    }
}
