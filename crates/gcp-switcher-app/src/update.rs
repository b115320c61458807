// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{
    Account, ActionSuccess, AppState, BootstrapOp, Command, ConfirmChoice, EntryArg, KeyPress,
    LOGIN_PROMPT, LoadingContext, MenuItem, Model, OpFailure, Outcome, PendingAction, Progress,
    Project, TOOL_MISSING_MESSAGE, Trigger,
};

/// Everything that can reach the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyPress),
    Outcome(Outcome),
    FallbackElapsed,
}

const fn is_quit(key: KeyPress) -> bool {
    matches!(key, KeyPress::Char('q') | KeyPress::Interrupt)
}

fn refresh_commands() -> Vec<Command> {
    vec![
        Command::GetActiveAccount,
        Command::GetActiveProject,
        Command::ListAccounts,
        Command::ListProjects,
    ]
}

impl Model {
    /// Startup batch: every bootstrap operation plus the fallback timer.
    pub fn bootstrap(&mut self) -> Vec<Command> {
        tracing::info!(total = self.tracker.total(), "dispatching bootstrap commands");
        let mut commands: Vec<Command> = BootstrapOp::ALL.iter().map(|op| op.command()).collect();
        commands.push(Command::ArmFallbackTimer);
        commands
    }

    pub fn update(&mut self, event: Event) -> Vec<Command> {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Outcome(outcome) => self.handle_outcome(outcome),
            Event::FallbackElapsed => {
                self.handle_fallback();
                Vec::new()
            }
        }
    }

    fn fire(&mut self, trigger: Trigger) -> bool {
        match self.machine.fire(trigger) {
            Ok(_) => true,
            Err(error) => {
                tracing::warn!(%error, "transition rejected");
                false
            }
        }
    }

    fn fire_with(&mut self, trigger: Trigger, arg: EntryArg) -> bool {
        match self.machine.fire_with(trigger, arg) {
            Ok(_) => true,
            Err(error) => {
                tracing::warn!(%error, "transition rejected");
                false
            }
        }
    }

    fn handle_key(&mut self, key: KeyPress) -> Vec<Command> {
        match self.machine.state() {
            AppState::Loading => {
                if is_quit(key) {
                    return vec![Command::Exit];
                }
                Vec::new()
            }
            AppState::Error => {
                if is_quit(key) {
                    return vec![Command::Exit];
                }
                if matches!(key, KeyPress::Enter | KeyPress::Esc) {
                    self.fire(Trigger::GoBack);
                }
                Vec::new()
            }
            AppState::Main => self.handle_main_key(key),
            AppState::Accounts => {
                self.handle_accounts_key(key);
                Vec::new()
            }
            AppState::Projects => {
                self.handle_projects_key(key);
                Vec::new()
            }
            AppState::ManualProject => {
                self.handle_manual_project_key(key);
                Vec::new()
            }
            AppState::Confirming => self.handle_confirm_key(key),
            AppState::Processing => Vec::new(),
        }
    }

    fn handle_main_key(&mut self, key: KeyPress) -> Vec<Command> {
        match key {
            key if is_quit(key) => vec![Command::Exit],
            KeyPress::Esc => vec![Command::Exit],
            KeyPress::Up | KeyPress::Char('k') => {
                self.menu_cursor = self.menu_cursor.rotate(-1);
                Vec::new()
            }
            KeyPress::Down | KeyPress::Char('j') | KeyPress::Tab => {
                self.menu_cursor = self.menu_cursor.rotate(1);
                Vec::new()
            }
            KeyPress::Enter => self.choose_menu(self.menu_cursor),
            KeyPress::Char(ch) => match MenuItem::from_shortcut(ch) {
                Some(item) => self.choose_menu(item),
                None => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    fn choose_menu(&mut self, item: MenuItem) -> Vec<Command> {
        self.menu_cursor = item;
        self.status_line = None;
        self.machine.set_menu_choice(item.index());

        match item {
            MenuItem::Accounts => {
                if self.machine.can_fire(Trigger::LoadAccounts) {
                    if self.fire_with(
                        Trigger::LoadAccounts,
                        EntryArg::Loading(LoadingContext::Accounts),
                    ) {
                        return vec![Command::ListAccounts];
                    }
                } else {
                    self.fire(Trigger::MenuChoice);
                }
                Vec::new()
            }
            MenuItem::Projects => {
                if self.machine.can_fire(Trigger::LoadProjects) {
                    if self.fire_with(
                        Trigger::LoadProjects,
                        EntryArg::Loading(LoadingContext::Projects),
                    ) {
                        return vec![Command::ListProjects];
                    }
                } else {
                    self.fire(Trigger::MenuChoice);
                }
                Vec::new()
            }
            MenuItem::NewLogin => {
                self.machine.set_selected_id("");
                self.confirm_choice = ConfirmChoice::Yes;
                if self.fire_with(Trigger::MenuChoice, EntryArg::Prompt(LOGIN_PROMPT.to_owned())) {
                    self.pending = Some(PendingAction::Login);
                }
                Vec::new()
            }
            MenuItem::ManualProject => {
                self.project_input.clear();
                self.fire(Trigger::MenuChoice);
                Vec::new()
            }
        }
    }

    fn handle_accounts_key(&mut self, key: KeyPress) {
        if is_quit(key) || key == KeyPress::Esc {
            self.fire(Trigger::GoBack);
            return;
        }
        if self.account_list.apply_key(key) || key != KeyPress::Enter {
            return;
        }

        let Some(selected) = self.selected_account() else {
            return;
        };
        let account = selected.account.clone();
        if selected.is_active() || account == self.active_account {
            self.status_line = Some(format!("account {account} is already active"));
            return;
        }
        self.machine.set_selected_id(account.as_str());
        self.confirm_choice = ConfirmChoice::Yes;
        if self.fire_with(
            Trigger::AccountSelected,
            EntryArg::Prompt(format!("Switch to account {account}?")),
        ) {
            self.pending = Some(PendingAction::SwitchAccount(account));
        }
    }

    fn handle_projects_key(&mut self, key: KeyPress) {
        if is_quit(key) || key == KeyPress::Esc {
            self.fire(Trigger::GoBack);
            return;
        }
        if self.project_list.apply_key(key) || key != KeyPress::Enter {
            return;
        }

        let Some(project) = self.selected_project().cloned() else {
            return;
        };
        if self.is_active_project(&project) {
            self.status_line = Some(format!("project {} is already active", project.project_id));
            return;
        }
        self.request_project_switch(Trigger::ProjectSelected, project.project_id);
    }

    fn handle_manual_project_key(&mut self, key: KeyPress) {
        match key {
            KeyPress::Esc | KeyPress::Interrupt => {
                self.fire(Trigger::GoBack);
            }
            KeyPress::Backspace => self.project_input.backspace(),
            KeyPress::Char(ch) => self.project_input.push(ch),
            KeyPress::Enter => {
                let project_id = self.project_input.value().trim().to_owned();
                if project_id.is_empty() {
                    return;
                }
                if project_id == self.active_project {
                    self.status_line = Some(format!("project {project_id} is already active"));
                    return;
                }
                self.request_project_switch(Trigger::ManualProjectEntry, project_id);
            }
            _ => {}
        }
    }

    fn request_project_switch(&mut self, trigger: Trigger, project_id: String) {
        self.machine.set_selected_id(project_id.as_str());
        self.confirm_choice = ConfirmChoice::Yes;
        self.status_line = None;
        if self.fire_with(
            trigger,
            EntryArg::Prompt(format!("Switch to project {project_id}?")),
        ) {
            self.pending = Some(PendingAction::SwitchProject(project_id));
        }
    }

    fn handle_confirm_key(&mut self, key: KeyPress) -> Vec<Command> {
        match key {
            KeyPress::Up | KeyPress::Char('k') => self.confirm_choice = ConfirmChoice::Yes,
            KeyPress::Down | KeyPress::Char('j') => self.confirm_choice = ConfirmChoice::No,
            KeyPress::Left | KeyPress::Right | KeyPress::Tab | KeyPress::Char('h' | 'l') => {
                self.confirm_choice = self.confirm_choice.toggled();
            }
            KeyPress::Char('y') => return self.confirm_yes(),
            KeyPress::Char('n') | KeyPress::Esc => self.confirm_no(),
            key if is_quit(key) => self.confirm_no(),
            KeyPress::Enter => match self.confirm_choice {
                ConfirmChoice::Yes => return self.confirm_yes(),
                ConfirmChoice::No => self.confirm_no(),
            },
            _ => {}
        }
        Vec::new()
    }

    fn confirm_yes(&mut self) -> Vec<Command> {
        let Some(action) = self.pending.clone() else {
            tracing::warn!("confirmation accepted without a pending action");
            self.confirm_no();
            return Vec::new();
        };
        if !self.fire(Trigger::ConfirmYes) {
            return Vec::new();
        }
        tracing::info!(?action, "running confirmed action");
        self.status_line = None;
        vec![action.command()]
    }

    fn confirm_no(&mut self) {
        if self.fire(Trigger::ConfirmNo) {
            self.pending = None;
        }
    }

    fn handle_outcome(&mut self, outcome: Outcome) -> Vec<Command> {
        tracing::debug!(?outcome, state = %self.machine.state(), "outcome received");
        let bootstrap = outcome.bootstrap_op();

        match outcome {
            Outcome::ToolChecked { available: false } => {
                self.tool_missing();
                return Vec::new();
            }
            Outcome::ToolChecked { available: true } => {}
            Outcome::ActiveAccount(Ok(account)) => self.active_account = account,
            Outcome::ActiveAccount(Err(failure)) => {
                self.note_failure(Command::GetActiveAccount.label(), &failure);
            }
            Outcome::ActiveProject(Ok(project)) => self.active_project = project,
            Outcome::ActiveProject(Err(failure)) => {
                self.note_failure(Command::GetActiveProject.label(), &failure);
            }
            Outcome::Accounts(result) => self.apply_accounts(result),
            Outcome::Projects(result) => self.apply_projects(result),
            Outcome::Action(result) => return self.apply_action(result),
        }

        if let Some(op) = bootstrap {
            self.advance_bootstrap(op);
        }
        Vec::new()
    }

    fn tool_missing(&mut self) {
        self.tracker.settle();
        tracing::error!("gcloud is not available");
        if self.is_loading(LoadingContext::Initial) {
            self.fire_with(Trigger::Error, EntryArg::Error(TOOL_MISSING_MESSAGE.to_owned()));
        } else {
            self.status_line = Some(TOOL_MISSING_MESSAGE.to_owned());
        }
    }

    fn note_failure(&mut self, what: &str, failure: &OpFailure) {
        tracing::warn!(kind = failure.kind.as_str(), %failure, "{what} failed");
        let line = format!("{what}: {failure}");
        self.command_errors.push(line.clone());
        if self.tracker.is_settled() {
            self.status_line = Some(line);
        }
    }

    fn apply_accounts(&mut self, result: Result<Vec<Account>, OpFailure>) {
        let loaded = match result {
            Ok(accounts) => {
                self.machine.set_has_accounts(!accounts.is_empty());
                let active = accounts.iter().position(Account::is_active);
                self.accounts = accounts;
                self.account_list.set_len(self.accounts.len());
                if let Some(index) = active {
                    self.account_list.select(index);
                }
                true
            }
            Err(failure) => {
                self.note_failure(Command::ListAccounts.label(), &failure);
                false
            }
        };
        self.finish_load(LoadingContext::Accounts, loaded);
    }

    fn apply_projects(&mut self, result: Result<Vec<Project>, OpFailure>) {
        let loaded = match result {
            Ok(projects) => {
                self.machine.set_has_projects(!projects.is_empty());
                let active = projects.iter().position(|p| self.is_active_project(p));
                self.projects = projects;
                self.project_list.set_len(self.projects.len());
                if let Some(index) = active {
                    self.project_list.select(index);
                }
                true
            }
            Err(failure) => {
                self.note_failure(Command::ListProjects.label(), &failure);
                false
            }
        };
        self.finish_load(LoadingContext::Projects, loaded);
    }

    /// Leaves `Loading` when a list the operator asked for arrives, then
    /// continues into that list when it has rows.
    fn finish_load(&mut self, purpose: LoadingContext, loaded: bool) {
        if !self.is_loading(purpose) || !self.fire(Trigger::DataLoaded) {
            return;
        }
        let (wanted, empty_message) = match purpose {
            LoadingContext::Accounts => (MenuItem::Accounts, "no authenticated accounts found"),
            LoadingContext::Projects => (MenuItem::Projects, "no accessible projects found"),
            LoadingContext::Initial => return,
        };
        if !loaded || self.machine.context().menu_choice != wanted.index() {
            return;
        }
        if self.machine.can_fire(Trigger::MenuChoice) {
            self.fire(Trigger::MenuChoice);
        } else {
            self.status_line = Some(empty_message.to_owned());
        }
    }

    fn advance_bootstrap(&mut self, op: BootstrapOp) {
        match self.tracker.record(op) {
            Progress::Complete => {
                tracing::info!("bootstrap commands finished");
                if self.is_loading(LoadingContext::Initial) && self.fire(Trigger::DataLoaded) {
                    self.summarize_bootstrap_errors();
                }
            }
            Progress::Pending { completed, total } => {
                tracing::debug!(completed, total, ?op, "bootstrap progress");
            }
            Progress::Ignored => {}
        }
    }

    fn summarize_bootstrap_errors(&mut self) {
        if let Some(last) = self.command_errors.last() {
            self.status_line = Some(format!(
                "{} startup command(s) failed; last: {last}",
                self.command_errors.len()
            ));
        }
    }

    fn handle_fallback(&mut self) {
        if !self.is_loading(LoadingContext::Initial) {
            tracing::debug!(state = %self.machine.state(), "fallback timer elapsed after startup");
            return;
        }
        let (completed, total) = (self.tracker.completed(), self.tracker.total());
        self.tracker.settle();
        tracing::warn!(completed, total, "fallback timer forcing startup to finish");
        if self.fire(Trigger::DataLoaded) {
            self.status_line = Some(format!(
                "startup timed out with {completed}/{total} commands complete"
            ));
        }
    }

    fn apply_action(&mut self, result: Result<ActionSuccess, OpFailure>) -> Vec<Command> {
        if self.machine.state() != AppState::Processing {
            tracing::warn!(?result, state = %self.machine.state(), "ignoring stale action result");
            return Vec::new();
        }
        self.pending = None;

        let success = match result {
            Ok(success) => success,
            Err(failure) => {
                tracing::warn!(kind = failure.kind.as_str(), %failure, "action failed");
                self.fire_with(Trigger::OperationFailed, EntryArg::Error(failure.message));
                return Vec::new();
            }
        };

        if !self.fire(Trigger::OperationComplete) {
            return Vec::new();
        }
        match success {
            ActionSuccess::AccountSwitched(account) => {
                self.active_account = account.clone();
                self.active_project.clear();
                self.projects.clear();
                self.project_list.set_len(0);
                self.machine.set_has_projects(false);
                self.menu_cursor = MenuItem::Projects;
                self.machine.set_menu_choice(MenuItem::Projects.index());
                self.fire_with(
                    Trigger::LoadProjects,
                    EntryArg::Loading(LoadingContext::Projects),
                );
                self.status_line = Some(format!("switched to account {account}; pick a project"));
            }
            ActionSuccess::ProjectSwitched(project) => {
                self.status_line = Some(format!("switched to project {project}"));
                self.active_project = project;
            }
            ActionSuccess::LoggedIn => {
                self.status_line = Some("login complete".to_owned());
            }
        }
        refresh_commands()
    }
}
