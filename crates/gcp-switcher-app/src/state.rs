// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt;
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppState {
    Loading,
    Error,
    Main,
    Accounts,
    Projects,
    ManualProject,
    Confirming,
    Processing,
}

impl AppState {
    pub const ALL: [Self; 8] = [
        Self::Loading,
        Self::Error,
        Self::Main,
        Self::Accounts,
        Self::Projects,
        Self::ManualProject,
        Self::Confirming,
        Self::Processing,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Loading => "Loading",
            Self::Error => "Error",
            Self::Main => "Main",
            Self::Accounts => "Accounts",
            Self::Projects => "Projects",
            Self::ManualProject => "ManualProject",
            Self::Confirming => "Confirming",
            Self::Processing => "Processing",
        }
    }
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    DataLoaded,
    Error,
    MenuChoice,
    LoadAccounts,
    LoadProjects,
    AccountSelected,
    ProjectSelected,
    ManualProjectEntry,
    ConfirmYes,
    ConfirmNo,
    OperationComplete,
    OperationFailed,
    GoBack,
}

impl Trigger {
    pub const ALL: [Self; 13] = [
        Self::DataLoaded,
        Self::Error,
        Self::MenuChoice,
        Self::LoadAccounts,
        Self::LoadProjects,
        Self::AccountSelected,
        Self::ProjectSelected,
        Self::ManualProjectEntry,
        Self::ConfirmYes,
        Self::ConfirmNo,
        Self::OperationComplete,
        Self::OperationFailed,
        Self::GoBack,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DataLoaded => "DataLoaded",
            Self::Error => "Error",
            Self::MenuChoice => "MenuChoice",
            Self::LoadAccounts => "LoadAccounts",
            Self::LoadProjects => "LoadProjects",
            Self::AccountSelected => "AccountSelected",
            Self::ProjectSelected => "ProjectSelected",
            Self::ManualProjectEntry => "ManualProjectEntry",
            Self::ConfirmYes => "ConfirmYes",
            Self::ConfirmNo => "ConfirmNo",
            Self::OperationComplete => "OperationComplete",
            Self::OperationFailed => "OperationFailed",
            Self::GoBack => "GoBack",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the machine is sitting in [`AppState::Loading`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadingContext {
    #[default]
    Initial,
    Accounts,
    Projects,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransitionContext {
    pub loading: LoadingContext,
    pub selected_id: String,
    pub menu_choice: usize,
    pub has_accounts: bool,
    pub has_projects: bool,
    pub confirm_text: String,
    pub last_error: Option<String>,
}

/// Payload recorded by the entry action of the target state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryArg {
    Loading(LoadingContext),
    Prompt(String),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("trigger {trigger} is not permitted in state {state}")]
    NotPermitted { state: AppState, trigger: Trigger },
    #[error("trigger {trigger} is blocked by a guard in state {state}")]
    GuardRejected { state: AppState, trigger: Trigger },
}

#[derive(Clone, Copy)]
struct Guard {
    check: fn(&TransitionContext) -> bool,
    label: &'static str,
}

#[derive(Clone, Copy)]
struct Transition {
    from: AppState,
    trigger: Trigger,
    guard: Option<Guard>,
    to: AppState,
}

const fn permit(from: AppState, trigger: Trigger, to: AppState) -> Transition {
    Transition {
        from,
        trigger,
        guard: None,
        to,
    }
}

const fn permit_if(
    from: AppState,
    trigger: Trigger,
    to: AppState,
    check: fn(&TransitionContext) -> bool,
    label: &'static str,
) -> Transition {
    Transition {
        from,
        trigger,
        guard: Some(Guard { check, label }),
        to,
    }
}

fn lacks_accounts(ctx: &TransitionContext) -> bool {
    !ctx.has_accounts
}

fn lacks_projects(ctx: &TransitionContext) -> bool {
    !ctx.has_projects
}

fn picked_accounts(ctx: &TransitionContext) -> bool {
    ctx.menu_choice == 0 && ctx.has_accounts
}

fn picked_projects(ctx: &TransitionContext) -> bool {
    ctx.menu_choice == 1 && ctx.has_projects
}

fn picked_login(ctx: &TransitionContext) -> bool {
    ctx.menu_choice == 2
}

fn picked_manual_project(ctx: &TransitionContext) -> bool {
    ctx.menu_choice == 3
}

static TRANSITIONS: [Transition; 19] = [
    permit(AppState::Loading, Trigger::DataLoaded, AppState::Main),
    permit(AppState::Loading, Trigger::Error, AppState::Error),
    permit_if(
        AppState::Main,
        Trigger::LoadAccounts,
        AppState::Loading,
        lacks_accounts,
        "!HasAccounts",
    ),
    permit_if(
        AppState::Main,
        Trigger::MenuChoice,
        AppState::Accounts,
        picked_accounts,
        "MenuChoice==0 && HasAccounts",
    ),
    permit_if(
        AppState::Main,
        Trigger::LoadProjects,
        AppState::Loading,
        lacks_projects,
        "!HasProjects",
    ),
    permit_if(
        AppState::Main,
        Trigger::MenuChoice,
        AppState::Projects,
        picked_projects,
        "MenuChoice==1 && HasProjects",
    ),
    permit_if(
        AppState::Main,
        Trigger::MenuChoice,
        AppState::Confirming,
        picked_login,
        "MenuChoice==2",
    ),
    permit_if(
        AppState::Main,
        Trigger::MenuChoice,
        AppState::ManualProject,
        picked_manual_project,
        "MenuChoice==3",
    ),
    permit(AppState::Accounts, Trigger::AccountSelected, AppState::Confirming),
    permit(AppState::Accounts, Trigger::GoBack, AppState::Main),
    permit(AppState::Projects, Trigger::ProjectSelected, AppState::Confirming),
    permit(AppState::Projects, Trigger::GoBack, AppState::Main),
    permit(
        AppState::ManualProject,
        Trigger::ManualProjectEntry,
        AppState::Confirming,
    ),
    permit(AppState::ManualProject, Trigger::GoBack, AppState::Main),
    permit(AppState::Confirming, Trigger::ConfirmYes, AppState::Processing),
    permit(AppState::Confirming, Trigger::ConfirmNo, AppState::Main),
    permit(AppState::Processing, Trigger::OperationComplete, AppState::Main),
    permit(AppState::Processing, Trigger::OperationFailed, AppState::Error),
    permit(AppState::Error, Trigger::GoBack, AppState::Main),
];

/// Guarded navigation machine. Created once in `Loading`/`Initial` and only
/// ever mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateMachine {
    state: AppState,
    context: TransitionContext,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: AppState::Loading,
            context: TransitionContext::default(),
        }
    }

    #[cfg(test)]
    pub(crate) fn forced(state: AppState, context: TransitionContext) -> Self {
        Self { state, context }
    }

    pub const fn state(&self) -> AppState {
        self.state
    }

    pub const fn context(&self) -> &TransitionContext {
        &self.context
    }

    pub fn confirm_text(&self) -> &str {
        &self.context.confirm_text
    }

    pub fn last_error(&self) -> Option<&str> {
        self.context.last_error.as_deref()
    }

    pub fn set_menu_choice(&mut self, choice: usize) {
        self.context.menu_choice = choice;
    }

    pub fn set_has_accounts(&mut self, has_accounts: bool) {
        self.context.has_accounts = has_accounts;
    }

    pub fn set_has_projects(&mut self, has_projects: bool) {
        self.context.has_projects = has_projects;
    }

    pub fn set_selected_id(&mut self, id: impl Into<String>) {
        self.context.selected_id = id.into();
    }

    pub fn can_fire(&self, trigger: Trigger) -> bool {
        self.resolve(trigger).is_ok()
    }

    pub fn permitted_triggers(&self) -> Vec<Trigger> {
        Trigger::ALL
            .into_iter()
            .filter(|trigger| self.can_fire(*trigger))
            .collect()
    }

    pub fn fire(&mut self, trigger: Trigger) -> Result<AppState, TransitionError> {
        self.transition(trigger, None)
    }

    pub fn fire_with(
        &mut self,
        trigger: Trigger,
        arg: EntryArg,
    ) -> Result<AppState, TransitionError> {
        self.transition(trigger, Some(arg))
    }

    fn transition(
        &mut self,
        trigger: Trigger,
        arg: Option<EntryArg>,
    ) -> Result<AppState, TransitionError> {
        let next = self.resolve(trigger)?.to;
        tracing::debug!(from = %self.state, to = %next, %trigger, "state transition");
        self.state = next;
        if let Some(arg) = arg {
            self.enter(next, arg);
        }
        Ok(next)
    }

    fn enter(&mut self, state: AppState, arg: EntryArg) {
        match (state, arg) {
            (AppState::Loading, EntryArg::Loading(loading)) => self.context.loading = loading,
            (AppState::Confirming, EntryArg::Prompt(text)) => self.context.confirm_text = text,
            (AppState::Error, EntryArg::Error(error)) => self.context.last_error = Some(error),
            (state, arg) => {
                tracing::debug!(%state, ?arg, "entry argument does not apply to state");
            }
        }
    }

    fn resolve(&self, trigger: Trigger) -> Result<&'static Transition, TransitionError> {
        let mut permitted = false;
        for transition in TRANSITIONS
            .iter()
            .filter(|t| t.from == self.state && t.trigger == trigger)
        {
            permitted = true;
            if transition
                .guard
                .is_none_or(|guard| (guard.check)(&self.context))
            {
                return Ok(transition);
            }
        }

        let (state, trigger) = (self.state, trigger);
        if permitted {
            Err(TransitionError::GuardRejected { state, trigger })
        } else {
            Err(TransitionError::NotPermitted { state, trigger })
        }
    }

    /// Graphviz rendering of the transition table.
    pub fn to_dot() -> String {
        let mut out = String::from("digraph {\n  rankdir=\"LR\";\n  node [shape=Mrecord];\n");
        out.push_str("  init [label=\"\", shape=point];\n  init -> Loading;\n");
        for transition in &TRANSITIONS {
            let label = match transition.guard {
                Some(guard) => format!("{} [{}]", transition.trigger, guard.label),
                None => transition.trigger.to_string(),
            };
            let _ = writeln!(
                out,
                "  {} -> {} [label=\"{}\"];",
                transition.from, transition.to, label
            );
        }
        out.push_str("}\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AppState, EntryArg, LoadingContext, StateMachine, TRANSITIONS, TransitionContext,
        TransitionError, Trigger,
    };

    fn guard_free_context(from: AppState, trigger: Trigger, to: AppState) -> TransitionContext {
        let mut context = TransitionContext::default();
        match (from, trigger, to) {
            (AppState::Main, Trigger::MenuChoice, AppState::Accounts) => {
                context.menu_choice = 0;
                context.has_accounts = true;
            }
            (AppState::Main, Trigger::MenuChoice, AppState::Projects) => {
                context.menu_choice = 1;
                context.has_projects = true;
            }
            (AppState::Main, Trigger::MenuChoice, AppState::Confirming) => {
                context.menu_choice = 2;
            }
            (AppState::Main, Trigger::MenuChoice, AppState::ManualProject) => {
                context.menu_choice = 3;
            }
            _ => {}
        }
        context
    }

    #[test]
    fn starts_loading_with_initial_context() {
        let machine = StateMachine::new();
        assert_eq!(machine.state(), AppState::Loading);
        assert_eq!(machine.context().loading, LoadingContext::Initial);
        assert_eq!(machine.context(), &TransitionContext::default());
    }

    #[test]
    fn every_table_entry_reaches_its_target_when_guard_holds() {
        for transition in &TRANSITIONS {
            let context = guard_free_context(transition.from, transition.trigger, transition.to);
            let mut machine = StateMachine::forced(transition.from, context);
            let next = machine.fire(transition.trigger);
            assert_eq!(
                next,
                Ok(transition.to),
                "{} --{}--> {}",
                transition.from,
                transition.trigger,
                transition.to
            );
            assert_eq!(machine.state(), transition.to);
        }
    }

    #[test]
    fn triggers_missing_from_table_are_rejected_without_moving() {
        for state in AppState::ALL {
            for trigger in Trigger::ALL {
                let listed = TRANSITIONS
                    .iter()
                    .any(|t| t.from == state && t.trigger == trigger);
                if listed {
                    continue;
                }
                let mut machine = StateMachine::forced(state, TransitionContext::default());
                assert_eq!(
                    machine.fire(trigger),
                    Err(TransitionError::NotPermitted { state, trigger })
                );
                assert_eq!(machine.state(), state);
            }
        }
    }

    #[test]
    fn confirm_yes_from_loading_fails_and_stays_loading() {
        let mut machine = StateMachine::new();
        let error = machine
            .fire(Trigger::ConfirmYes)
            .expect_err("confirm from loading should fail");
        assert_eq!(
            error.to_string(),
            "trigger ConfirmYes is not permitted in state Loading"
        );
        assert_eq!(machine.state(), AppState::Loading);
    }

    #[test]
    fn load_accounts_guard_flips_with_has_accounts() {
        let mut machine = StateMachine::new();
        machine.fire(Trigger::DataLoaded).expect("loading -> main");
        machine.set_menu_choice(0);

        machine.set_has_accounts(false);
        assert!(machine.can_fire(Trigger::LoadAccounts));
        assert!(!machine.can_fire(Trigger::MenuChoice));

        machine.set_has_accounts(true);
        assert!(!machine.can_fire(Trigger::LoadAccounts));
        assert!(machine.can_fire(Trigger::MenuChoice));
    }

    #[test]
    fn guard_rejection_is_reported_separately() {
        let mut machine = StateMachine::forced(AppState::Main, TransitionContext::default());
        machine.set_menu_choice(1);
        assert_eq!(
            machine.fire(Trigger::MenuChoice),
            Err(TransitionError::GuardRejected {
                state: AppState::Main,
                trigger: Trigger::MenuChoice,
            })
        );
        assert_eq!(machine.state(), AppState::Main);
    }

    #[test]
    fn account_selection_scenario_records_prompt() {
        let mut machine = StateMachine::new();
        machine.fire(Trigger::DataLoaded).expect("loading -> main");
        machine.set_menu_choice(0);
        machine.set_has_accounts(true);
        assert_eq!(machine.fire(Trigger::MenuChoice), Ok(AppState::Accounts));

        machine.set_selected_id("user@example.com");
        let state = machine.fire_with(
            Trigger::AccountSelected,
            EntryArg::Prompt("Switch to account user@example.com?".to_owned()),
        );
        assert_eq!(state, Ok(AppState::Confirming));
        assert_eq!(
            machine.confirm_text(),
            "Switch to account user@example.com?"
        );
        assert_eq!(machine.context().selected_id, "user@example.com");

        assert_eq!(machine.fire(Trigger::ConfirmYes), Ok(AppState::Processing));
    }

    #[test]
    fn entry_actions_record_loading_purpose_and_error() {
        let mut machine = StateMachine::forced(AppState::Main, TransitionContext::default());
        machine
            .fire_with(
                Trigger::LoadProjects,
                EntryArg::Loading(LoadingContext::Projects),
            )
            .expect("main -> loading");
        assert_eq!(machine.context().loading, LoadingContext::Projects);

        machine
            .fire_with(Trigger::Error, EntryArg::Error("boom".to_owned()))
            .expect("loading -> error");
        assert_eq!(machine.state(), AppState::Error);
        assert_eq!(machine.last_error(), Some("boom"));

        assert_eq!(machine.fire(Trigger::GoBack), Ok(AppState::Main));
        assert_eq!(machine.last_error(), Some("boom"));
    }

    #[test]
    fn mismatched_entry_argument_is_ignored() {
        let mut machine = StateMachine::new();
        machine
            .fire_with(Trigger::DataLoaded, EntryArg::Prompt("ignored".to_owned()))
            .expect("loading -> main");
        assert_eq!(machine.state(), AppState::Main);
        assert!(machine.confirm_text().is_empty());
    }

    #[test]
    fn permitted_triggers_follow_guards() {
        let mut machine = StateMachine::forced(AppState::Main, TransitionContext::default());
        machine.set_menu_choice(3);
        assert_eq!(
            machine.permitted_triggers(),
            vec![
                Trigger::MenuChoice,
                Trigger::LoadAccounts,
                Trigger::LoadProjects
            ]
        );

        let processing = StateMachine::forced(AppState::Processing, TransitionContext::default());
        assert_eq!(
            processing.permitted_triggers(),
            vec![Trigger::OperationComplete, Trigger::OperationFailed]
        );
    }

    #[test]
    fn dot_graph_lists_every_transition() {
        let dot = StateMachine::to_dot();
        assert!(dot.starts_with("digraph {"));
        assert!(dot.contains("init -> Loading;"));
        assert!(dot.contains("Main -> Loading [label=\"LoadAccounts [!HasAccounts]\"];"));
        assert!(dot.contains("Error -> Main [label=\"GoBack\"];"));
        assert_eq!(dot.matches(" -> ").count(), TRANSITIONS.len() + 1);
    }
}
