// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod view;

pub use view::{Theme, render, spinner_frame};

use anyhow::{Context, Result};
use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, disable_raw_mode, enable_raw_mode};
use crossterm::execute;
use gcp_switcher_app::{
    Account, ActionSuccess, Command, Event, KeyPress, Model, OpFailure, Outcome, Project,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::{self, Stdout};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const TICK: Duration = Duration::from_millis(120);

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Side-effecting operations the loop hands to worker threads. Methods block
/// until the operation finishes or times out.
pub trait AppRuntime: Send + Sync + 'static {
    fn gcloud_available(&self) -> bool;
    fn active_account(&self) -> Result<String, OpFailure>;
    fn active_project(&self) -> Result<String, OpFailure>;
    fn list_accounts(&self) -> Result<Vec<Account>, OpFailure>;
    fn list_projects(&self) -> Result<Vec<Project>, OpFailure>;
    fn switch_account(&self, account: &str) -> Result<(), OpFailure>;
    fn switch_project(&self, project: &str) -> Result<(), OpFailure>;
    fn login(&self) -> Result<(), OpFailure>;

    /// Runs one dispatcher command. Loop-only commands yield `None`.
    fn execute(&self, command: &Command) -> Option<Outcome> {
        let outcome = match command {
            Command::CheckToolAvailable => Outcome::ToolChecked {
                available: self.gcloud_available(),
            },
            Command::GetActiveAccount => Outcome::ActiveAccount(self.active_account()),
            Command::GetActiveProject => Outcome::ActiveProject(self.active_project()),
            Command::ListAccounts => Outcome::Accounts(self.list_accounts()),
            Command::ListProjects => Outcome::Projects(self.list_projects()),
            Command::SwitchAccount(account) => Outcome::Action(
                self.switch_account(account)
                    .map(|()| ActionSuccess::AccountSwitched(account.clone())),
            ),
            Command::SwitchProject(project) => Outcome::Action(
                self.switch_project(project)
                    .map(|()| ActionSuccess::ProjectSwitched(project.clone())),
            ),
            Command::LoginNewAccount => {
                Outcome::Action(self.login().map(|()| ActionSuccess::LoggedIn))
            }
            Command::ArmFallbackTimer | Command::Exit => return None,
        };
        tracing::debug!(
            command = command.label(),
            success = outcome.is_success(),
            "command finished"
        );
        Some(outcome)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    Outcome(Outcome),
    FallbackElapsed,
}

impl From<InternalEvent> for Event {
    fn from(event: InternalEvent) -> Self {
        match event {
            InternalEvent::Outcome(outcome) => Self::Outcome(outcome),
            InternalEvent::FallbackElapsed => Self::FallbackElapsed,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub fallback_timeout: Duration,
    pub theme: Theme,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            fallback_timeout: Duration::from_secs(10),
            theme: Theme::default(),
        }
    }
}

/// Commands that could not be handed to a worker thread.
#[derive(Debug, Default, PartialEq, Eq)]
struct Dispatched {
    exit: bool,
    interactive: Vec<Command>,
}

impl Dispatched {
    fn merge(&mut self, other: Self) {
        self.exit |= other.exit;
        self.interactive.extend(other.interactive);
    }
}

fn spawn_worker<R: AppRuntime>(runtime: Arc<R>, tx: Sender<InternalEvent>, command: Command) {
    tracing::debug!(command = command.label(), "dispatching");
    thread::spawn(move || {
        if let Some(outcome) = runtime.execute(&command) {
            let _ = tx.send(InternalEvent::Outcome(outcome));
        }
    });
}

fn arm_fallback_timer(tx: Sender<InternalEvent>, after: Duration) {
    thread::spawn(move || {
        thread::sleep(after);
        let _ = tx.send(InternalEvent::FallbackElapsed);
    });
}

fn dispatch<R: AppRuntime>(
    runtime: &Arc<R>,
    tx: &Sender<InternalEvent>,
    fallback_timeout: Duration,
    commands: Vec<Command>,
) -> Dispatched {
    let mut dispatched = Dispatched::default();
    for command in commands {
        match command {
            Command::Exit => dispatched.exit = true,
            Command::ArmFallbackTimer => arm_fallback_timer(tx.clone(), fallback_timeout),
            command if command.is_interactive() => dispatched.interactive.push(command),
            command => spawn_worker(Arc::clone(runtime), tx.clone(), command),
        }
    }
    dispatched
}

/// Feeds every queued worker result through the reducer.
fn drain<R: AppRuntime>(
    model: &mut Model,
    runtime: &Arc<R>,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
    options: &RunOptions,
) -> Dispatched {
    let mut dispatched = Dispatched::default();
    while let Ok(event) = rx.try_recv() {
        let commands = model.update(event.into());
        dispatched.merge(dispatch(runtime, tx, options.fallback_timeout, commands));
    }
    dispatched
}

pub fn map_key(key: KeyEvent) -> Option<KeyPress> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(KeyPress::Interrupt),
            _ => None,
        };
    }
    let press = match key.code {
        KeyCode::Up => KeyPress::Up,
        KeyCode::Down => KeyPress::Down,
        KeyCode::Left => KeyPress::Left,
        KeyCode::Right => KeyPress::Right,
        KeyCode::Home => KeyPress::Home,
        KeyCode::End => KeyPress::End,
        KeyCode::PageUp => KeyPress::PageUp,
        KeyCode::PageDown => KeyPress::PageDown,
        KeyCode::Tab | KeyCode::BackTab => KeyPress::Tab,
        KeyCode::Enter => KeyPress::Enter,
        KeyCode::Esc => KeyPress::Esc,
        KeyCode::Backspace => KeyPress::Backspace,
        KeyCode::Char(ch) => KeyPress::Char(ch),
        _ => return None,
    };
    Some(press)
}

fn suspend(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode().context("disable raw mode")?;
    execute!(terminal.backend_mut(), terminal::LeaveAlternateScreen)
        .context("leave alternate screen")?;
    terminal.show_cursor().context("show cursor")
}

fn resume(terminal: &mut Tui) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    execute!(terminal.backend_mut(), terminal::EnterAlternateScreen)
        .context("enter alternate screen")?;
    terminal.clear().context("clear terminal")
}

/// Hands the terminal to an interactive command, then posts its outcome
/// through the same channel workers use.
fn run_interactive<R: AppRuntime>(
    terminal: &mut Tui,
    runtime: &R,
    tx: &Sender<InternalEvent>,
    command: &Command,
) -> Result<()> {
    tracing::info!(command = command.label(), "suspending terminal");
    suspend(terminal)?;
    let outcome = runtime.execute(command);
    resume(terminal)?;
    if let Some(outcome) = outcome {
        let _ = tx.send(InternalEvent::Outcome(outcome));
    }
    Ok(())
}

fn event_loop<R: AppRuntime>(
    terminal: &mut Tui,
    model: &mut Model,
    runtime: &Arc<R>,
    options: &RunOptions,
) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    let commands = model.bootstrap();
    let mut pending = dispatch(runtime, &tx, options.fallback_timeout, commands);
    let mut tick: usize = 0;

    loop {
        pending.merge(drain(model, runtime, &tx, &rx, options));
        if pending.exit {
            break;
        }
        for command in std::mem::take(&mut pending.interactive) {
            run_interactive(terminal, runtime.as_ref(), &tx, &command)?;
        }

        terminal
            .draw(|frame| render(frame, model, &options.theme, tick))
            .context("draw frame")?;
        tick = tick.wrapping_add(1);

        if !event::poll(TICK).context("poll event")? {
            continue;
        }
        if let TermEvent::Key(key) = event::read().context("read event")?
            && let Some(press) = map_key(key)
        {
            let commands = model.update(Event::Key(press));
            pending.merge(dispatch(runtime, &tx, options.fallback_timeout, commands));
        }
    }
    tracing::info!("exiting");
    Ok(())
}

/// Takes over the terminal until the operator quits. The terminal is restored
/// even when the loop fails.
pub fn run_app<R: AppRuntime>(model: &mut Model, runtime: R, options: RunOptions) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let runtime = Arc::new(runtime);
    let result = event_loop(&mut terminal, model, &runtime, &options);

    let restored = restore(&mut terminal);
    keep_loop_error(result, restored)
}

/// Attempts every restore step even when an earlier one fails.
fn restore(terminal: &mut Tui) -> Result<()> {
    let raw = disable_raw_mode().context("disable raw mode");
    let screen =
        execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen");
    let cursor = terminal.show_cursor().context("show cursor");
    raw.and(screen).and(cursor)
}

fn keep_loop_error(result: Result<()>, restored: Result<()>) -> Result<()> {
    if result.is_err()
        && let Err(error) = &restored
    {
        tracing::warn!(error = %format!("{error:#}"), "terminal restore failed");
    }
    result.and(restored)
}
