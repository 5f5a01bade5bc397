// UI module for rendering the TUI.
// Contains the header, project list, pagination bar, status bar and help overlay.

mod list;
mod plain;

pub use list::card_lines;
pub use plain::render_plain;

use ratatui::{prelude::*, widgets::*};

use crate::app::{App, InputMode};
use crate::state::{ShowcaseStatus, ToastLevel};

/// Main draw function that renders the entire UI.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(1), // Search / counter
            Constraint::Min(1),    // Project list
            Constraint::Length(1), // Pagination
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    draw_controls(frame, app, chunks[1]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Projects ");
    let inner = block.inner(chunks[2]);
    frame.render_widget(block, chunks[2]);
    list::render_projects(frame, &mut app.showcase, &app.homepages, inner);

    draw_pagination(frame, app, chunks[3]);
    draw_status_bar(frame, app, chunks[4]);

    // Help overlay (rendered last, on top of everything)
    if app.show_help {
        draw_help_overlay(frame);
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = Line::from(vec![
        Span::styled(
            " folio ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled("· ", Style::default().fg(Color::DarkGray)),
        Span::raw(app.user.clone()),
    ]);

    let sort = Line::from(vec![
        Span::styled("Sort: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            app.showcase.sort().label(),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw(" "),
    ])
    .alignment(Alignment::Right);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Paragraph::new(title), inner);
    frame.render_widget(Paragraph::new(sort), inner);
}

/// Search input on the left, "Showing X of Y" on the right.
fn draw_controls(frame: &mut Frame, app: &App, area: Rect) {
    let search = match app.input_mode {
        InputMode::Search => Line::from(vec![
            Span::styled(" /", Style::default().fg(Color::Yellow)),
            Span::raw(app.search_input.clone()),
            Span::styled("█", Style::default().fg(Color::Yellow)),
        ]),
        InputMode::Normal if !app.showcase.filter().is_empty() => Line::from(vec![
            Span::styled(" Search: ", Style::default().fg(Color::DarkGray)),
            Span::raw(app.showcase.filter().to_string()),
        ]),
        InputMode::Normal => Line::styled(
            " / to search projects",
            Style::default().fg(Color::DarkGray),
        ),
    };

    let counter = match app.showcase.status() {
        ShowcaseStatus::Populated | ShowcaseStatus::Empty => app.showcase.counter_text(),
        _ => String::new(),
    };

    frame.render_widget(Paragraph::new(search), area);
    frame.render_widget(
        Paragraph::new(Line::from(format!("{} ", counter)).alignment(Alignment::Right))
            .style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

fn draw_pagination(frame: &mut Frame, app: &App, area: Rect) {
    if app.showcase.status() != ShowcaseStatus::Populated {
        return;
    }

    let mut spans = Vec::new();
    if app.showcase.has_more() {
        spans.push(Span::styled(" m ", Style::default().fg(Color::Cyan)));
        spans.push(Span::raw("Show more"));
    }
    if app.showcase.can_show_less() {
        spans.push(Span::styled("  l ", Style::default().fg(Color::Cyan)));
        spans.push(Span::raw("Show less"));
    }
    if !app.showcase.pending_languages().is_empty() {
        spans.push(Span::styled(
            "  ⏳ Loading languages...",
            Style::default().fg(Color::Yellow),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Draw the status bar with the current toast or keybinding hints, and rate limit.
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = if let Some(toast) = app.toasts.current() {
        let (icon, color) = match toast.level {
            ToastLevel::Info => ("ℹ️", Color::Cyan),
            ToastLevel::Success => ("✅", Color::Green),
            ToastLevel::Warning => ("⚠️", Color::Yellow),
            ToastLevel::Error => ("❌", Color::Red),
        };
        vec![
            Span::raw(format!(" {} ", icon)),
            Span::styled(toast.message.clone(), Style::default().fg(color)),
        ]
    } else if app.input_mode == InputMode::Search {
        vec![
            Span::raw(" ↵ "),
            Span::styled("Done", Style::default().fg(Color::DarkGray)),
            Span::raw("  Esc "),
            Span::styled("Clear", Style::default().fg(Color::DarkGray)),
        ]
    } else {
        vec![
            Span::raw(" ↑↓ "),
            Span::styled("Navigate", Style::default().fg(Color::DarkGray)),
            Span::raw("  s "),
            Span::styled("Sort", Style::default().fg(Color::DarkGray)),
            Span::raw("  / "),
            Span::styled("Search", Style::default().fg(Color::DarkGray)),
            Span::raw("  r "),
            Span::styled("Reload", Style::default().fg(Color::DarkGray)),
            Span::raw("  ? "),
            Span::styled("Help", Style::default().fg(Color::DarkGray)),
            Span::raw("  q "),
            Span::styled("Quit", Style::default().fg(Color::DarkGray)),
        ]
    };

    // Add rate limit info on the right if available
    let rate = app.rate_limit();
    if rate.is_known() {
        let rate_color = if rate.remaining < 10 {
            Color::Red
        } else if rate.remaining < 30 {
            Color::Yellow
        } else {
            Color::DarkGray
        };
        spans.push(Span::styled(
            format!("  API: {}/{}", rate.remaining, rate.limit),
            Style::default().fg(rate_color),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Draw the help overlay.
fn draw_help_overlay(frame: &mut Frame) {
    let area = frame.area();

    // Create a centered popup
    let popup_width = 48.min(area.width);
    let popup_height = 19.min(area.height);
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let key = |keys: &'static str, action: &'static str| {
        Line::from(vec![
            Span::styled(keys, Style::default().fg(Color::Cyan)),
            Span::raw(action),
        ])
    };

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        key("  ↑/↓ or j/k    ", "Move selection"),
        key("  Home/End g/G  ", "Jump to first/last"),
        key("  m or PgDn     ", "Show more projects"),
        key("  l or PgUp     ", "Show less"),
        key("  s             ", "Cycle sort order"),
        key("  /             ", "Search by name"),
        key("  c             ", "Clear search"),
        key("  r             ", "Reload (uses cache)"),
        key("  R             ", "Reload from GitHub"),
        key("  ?             ", "Show/hide this help"),
        key("  q             ", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::DarkGray)),
            Span::styled("Esc", Style::default().fg(Color::Yellow)),
            Span::styled(" or ", Style::default().fg(Color::DarkGray)),
            Span::styled("?", Style::default().fg(Color::Yellow)),
            Span::styled(" to close", Style::default().fg(Color::DarkGray)),
        ]),
    ];

    let help_paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help ")
                .title_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
        )
        .alignment(Alignment::Left);

    frame.render_widget(help_paragraph, popup_area);
}
