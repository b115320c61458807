// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::{
    AppState, Command, CompletionTracker, ListCursor, LoadingContext, StateMachine, TextInput,
};

pub const LOGIN_PROMPT: &str = "Would you like to login to a new GCP account?";
pub const TOOL_MISSING_MESSAGE: &str = "Google Cloud SDK (gcloud) is not installed or not in PATH\nPlease install it from: https://cloud.google.com/sdk/docs/install";

/// One row of `gcloud auth list --format=json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub account: String,
    #[serde(default)]
    pub status: String,
}

impl Account {
    pub fn is_active(&self) -> bool {
        self.status.eq_ignore_ascii_case("ACTIVE")
    }
}

/// One row of `gcloud projects list --format=json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub project_id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuItem {
    #[default]
    Accounts,
    Projects,
    NewLogin,
    ManualProject,
}

impl MenuItem {
    pub const ALL: [Self; 4] = [
        Self::Accounts,
        Self::Projects,
        Self::NewLogin,
        Self::ManualProject,
    ];

    pub const fn index(self) -> usize {
        match self {
            Self::Accounts => 0,
            Self::Projects => 1,
            Self::NewLogin => 2,
            Self::ManualProject => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Accounts => "View/Switch Accounts",
            Self::Projects => "View/Switch Projects",
            Self::NewLogin => "Login to a New Account",
            Self::ManualProject => "Enter Project ID Manually",
        }
    }

    pub fn from_shortcut(ch: char) -> Option<Self> {
        match ch {
            '1' | 'a' => Some(Self::Accounts),
            '2' | 'p' => Some(Self::Projects),
            '3' | 'l' => Some(Self::NewLogin),
            '4' | 'm' => Some(Self::ManualProject),
            _ => None,
        }
    }

    pub fn rotate(self, delta: isize) -> Self {
        let len = Self::ALL.len() as isize;
        let next = (self.index() as isize + delta).rem_euclid(len) as usize;
        Self::ALL[next]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfirmChoice {
    #[default]
    Yes,
    No,
}

impl ConfirmChoice {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Yes => Self::No,
            Self::No => Self::Yes,
        }
    }
}

/// What `ConfirmYes` will run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    SwitchAccount(String),
    SwitchProject(String),
    Login,
}

impl PendingAction {
    pub fn command(&self) -> Command {
        match self {
            Self::SwitchAccount(account) => Command::SwitchAccount(account.clone()),
            Self::SwitchProject(project) => Command::SwitchProject(project.clone()),
            Self::Login => Command::LoginNewAccount,
        }
    }
}

/// Everything the reducer owns. Rendering reads it; only
/// [`Model::update`](crate::Model::update) writes it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Model {
    pub machine: StateMachine,
    pub tracker: CompletionTracker,
    pub accounts: Vec<Account>,
    pub projects: Vec<Project>,
    pub active_account: String,
    pub active_project: String,
    pub menu_cursor: MenuItem,
    pub confirm_choice: ConfirmChoice,
    pub account_list: ListCursor,
    pub project_list: ListCursor,
    pub project_input: TextInput,
    pub pending: Option<PendingAction>,
    pub command_errors: Vec<String>,
    pub status_line: Option<String>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn state(&self) -> AppState {
        self.machine.state()
    }

    pub fn is_loading(&self, purpose: LoadingContext) -> bool {
        self.machine.state() == AppState::Loading && self.machine.context().loading == purpose
    }

    pub fn selected_account(&self) -> Option<&Account> {
        self.accounts.get(self.account_list.selected())
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.projects.get(self.project_list.selected())
    }

    pub fn is_active_project(&self, project: &Project) -> bool {
        !self.active_project.is_empty() && project.project_id == self.active_project
    }
}
