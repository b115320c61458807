// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use gcp_switcher_app::{AppState, ConfirmChoice, LoadingContext, MenuItem, Model};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};
use std::ops::Range;

const SPINNER: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];
const ACTIVE_SUFFIX: &str = " (ACTIVE)";

/// Colors used by every view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub border: Style,
    pub title: Style,
    pub subtitle: Style,
    pub info: Style,
    pub success: Style,
    pub error: Style,
    pub highlight: Style,
    pub focused_button: Style,
    pub blurred_button: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            border: Style::default().fg(Color::Indexed(99)),
            title: Style::default()
                .fg(Color::Indexed(213))
                .add_modifier(Modifier::BOLD),
            subtitle: Style::default().fg(Color::Indexed(105)),
            info: Style::default().fg(Color::Indexed(247)),
            success: Style::default().fg(Color::Indexed(84)),
            error: Style::default().fg(Color::Indexed(203)),
            highlight: Style::default()
                .fg(Color::Indexed(159))
                .add_modifier(Modifier::BOLD),
            focused_button: Style::default()
                .fg(Color::Indexed(231))
                .bg(Color::Indexed(99))
                .add_modifier(Modifier::BOLD),
            blurred_button: Style::default().fg(Color::Indexed(240)),
        }
    }
}

pub fn spinner_frame(tick: usize) -> &'static str {
    SPINNER[tick % SPINNER.len()]
}

pub fn render(frame: &mut ratatui::Frame<'_>, model: &Model, theme: &Theme, tick: usize) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme.border);
    let rows = usize::from(block.inner(layout[0]).height);
    let body = Paragraph::new(body_lines(model, theme, tick, rows))
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(body, layout[0]);

    frame.render_widget(Paragraph::new(status_line(model, theme)), layout[1]);
}

fn body_lines(model: &Model, theme: &Theme, tick: usize, rows: usize) -> Vec<Line<'static>> {
    match model.state() {
        AppState::Loading => loading_lines(model, theme, tick),
        AppState::Error => error_lines(model, theme),
        AppState::Main => main_lines(model, theme),
        AppState::Accounts => account_lines(model, theme, rows),
        AppState::Projects => project_lines(model, theme, rows),
        AppState::ManualProject => manual_project_lines(model, theme),
        AppState::Confirming => confirm_lines(model, theme),
        AppState::Processing => vec![
            Line::default(),
            Line::from(format!(
                "   {} Processing, please wait...",
                spinner_frame(tick)
            )),
        ],
    }
}

fn loading_lines(model: &Model, theme: &Theme, tick: usize) -> Vec<Line<'static>> {
    let label = match model.machine.context().loading {
        LoadingContext::Initial => "Loading GCP configuration...",
        LoadingContext::Accounts => "Loading Accounts...",
        LoadingContext::Projects => "Loading Projects...",
    };
    let mut lines = vec![
        Line::default(),
        Line::from(vec![
            Span::styled(format!("   {} ", spinner_frame(tick)), theme.title),
            Span::raw(label),
        ]),
        Line::default(),
    ];
    if model.is_loading(LoadingContext::Initial) {
        lines.push(Line::styled(
            format!(
                "  Commands completed: {}/{}",
                model.tracker.completed(),
                model.tracker.total()
            ),
            theme.info,
        ));
    }
    lines
}

fn error_lines(model: &Model, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = vec![Line::styled("Error", theme.title), Line::default()];
    let message = model.machine.last_error().unwrap_or("unknown error");
    lines.extend(
        message
            .lines()
            .map(|line| Line::styled(line.to_owned(), theme.error)),
    );
    lines.push(Line::default());
    lines.push(Line::styled(
        "Press Enter or Esc to go back, q to quit",
        theme.info,
    ));
    lines
}

fn value_or_none(value: &str) -> String {
    if value.is_empty() {
        "(none)".to_owned()
    } else {
        value.to_owned()
    }
}

fn main_lines(model: &Model, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::styled("GCP Account Manager", theme.title),
        Line::default(),
        Line::from(vec![
            Span::raw("Active Account: "),
            Span::styled(value_or_none(&model.active_account), theme.highlight),
        ]),
        Line::from(vec![
            Span::raw("Active Project: "),
            Span::styled(value_or_none(&model.active_project), theme.highlight),
        ]),
        Line::default(),
        Line::styled("What would you like to do?", theme.subtitle),
        Line::default(),
    ];
    for item in MenuItem::ALL {
        let style = if item == model.menu_cursor {
            theme.focused_button
        } else {
            theme.blurred_button
        };
        lines.push(Line::from(vec![
            Span::raw(format!("{}. ", item.index() + 1)),
            Span::styled(format!("  {}  ", item.label()), style),
        ]));
    }
    lines.push(Line::default());
    lines.push(Line::styled(
        "Press q to quit, ↑/↓ to navigate, Enter to select",
        theme.info,
    ));
    lines
}

/// Rows of a list that keep `selected` visible within `rows` lines.
pub(crate) fn list_window(selected: usize, len: usize, rows: usize) -> Range<usize> {
    if rows == 0 || len == 0 {
        return 0..0;
    }
    if len <= rows {
        return 0..len;
    }
    let start = selected.saturating_sub(rows - 1).min(len - rows);
    start..start + rows
}

struct ListRow {
    label: String,
    detail: String,
    active: bool,
}

fn list_lines(
    title: &str,
    empty: &str,
    rows: Vec<ListRow>,
    selected: usize,
    theme: &Theme,
    height: usize,
) -> Vec<Line<'static>> {
    let mut lines = vec![Line::styled(title.to_owned(), theme.title), Line::default()];
    if rows.is_empty() {
        lines.push(Line::styled(empty.to_owned(), theme.info));
    }
    // title, blank, blank, help
    let window = list_window(selected, rows.len(), height.saturating_sub(4));
    for (index, row) in rows.into_iter().enumerate() {
        if !window.contains(&index) {
            continue;
        }
        let is_selected = index == selected;
        let marker = if is_selected { "> " } else { "  " };
        let label_style = if is_selected {
            theme.highlight
        } else {
            Style::default()
        };
        let mut spans = vec![
            Span::styled(marker, theme.title),
            Span::styled(row.label, label_style),
        ];
        if row.active {
            spans.push(Span::styled(ACTIVE_SUFFIX, theme.success));
        }
        if !row.detail.is_empty() {
            spans.push(Span::styled(format!("  {}", row.detail), theme.info));
        }
        lines.push(Line::from(spans));
    }
    lines.push(Line::default());
    lines.push(Line::styled("Press Enter to select, q to go back", theme.info));
    lines
}

fn account_lines(model: &Model, theme: &Theme, height: usize) -> Vec<Line<'static>> {
    let rows = model
        .accounts
        .iter()
        .map(|account| ListRow {
            label: account.account.clone(),
            detail: String::new(),
            active: account.is_active(),
        })
        .collect();
    list_lines(
        "GCP Accounts",
        "No authenticated accounts.",
        rows,
        model.account_list.selected(),
        theme,
        height,
    )
}

fn project_lines(model: &Model, theme: &Theme, height: usize) -> Vec<Line<'static>> {
    let rows = model
        .projects
        .iter()
        .map(|project| ListRow {
            label: project.project_id.clone(),
            detail: project.name.clone(),
            active: model.is_active_project(project),
        })
        .collect();
    list_lines(
        "GCP Projects",
        "No accessible projects.",
        rows,
        model.project_list.selected(),
        theme,
        height,
    )
}

fn manual_project_lines(model: &Model, theme: &Theme) -> Vec<Line<'static>> {
    let value = model.project_input.value();
    let input = if value.is_empty() {
        Span::styled("Enter project ID...", theme.blurred_button)
    } else {
        Span::raw(value.to_owned())
    };
    vec![
        Line::styled("Enter Project ID", theme.title),
        Line::default(),
        Line::from("Please enter the GCP project ID you want to switch to:"),
        Line::default(),
        Line::from(vec![Span::styled("> ", theme.title), input, Span::raw("█")]),
        Line::default(),
        Line::styled("Press Enter to confirm, Esc to go back", theme.info),
    ]
}

fn confirm_lines(model: &Model, theme: &Theme) -> Vec<Line<'static>> {
    let (yes, no) = match model.confirm_choice {
        ConfirmChoice::Yes => (theme.focused_button, theme.blurred_button),
        ConfirmChoice::No => (theme.blurred_button, theme.focused_button),
    };
    vec![
        Line::styled("Confirmation", theme.title),
        Line::default(),
        Line::from(model.machine.confirm_text().to_owned()),
        Line::default(),
        Line::from(vec![
            Span::styled("  Yes  ", yes),
            Span::raw("   "),
            Span::styled("  No  ", no),
        ]),
        Line::default(),
        Line::styled("(Use arrow keys to select, Enter to confirm)", theme.info),
    ]
}

fn status_line(model: &Model, theme: &Theme) -> Line<'static> {
    match &model.status_line {
        Some(status) => Line::styled(format!(" {status}"), theme.subtitle),
        None => Line::default(),
    }
}
