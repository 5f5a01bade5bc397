// Project list rendering.
// Draws cards for the displayed window plus the loading, error and empty panels.

use chrono::{DateTime, Utc};
use ratatui::{prelude::*, widgets::*};

use crate::format::format_number;
use crate::state::{
    HomepageOverrides, LoadError, ProjectCard, Showcase, ShowcaseStatus, language_color,
};

/// Placeholder rows shown while the list loads.
const SKELETON_ROWS: usize = 3;

/// Render a loading indicator with skeleton rows.
pub fn render_loading(frame: &mut Frame, area: Rect, message: &str) {
    let mut lines = vec![
        Line::styled(format!("⏳ {}...", message), Style::default().fg(Color::Yellow)),
        Line::from(""),
    ];
    for _ in 0..SKELETON_ROWS {
        lines.extend(skeleton_lines());
    }

    let text = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(text, area);
}

/// Render an error panel with its hint and a retry prompt.
pub fn render_error(frame: &mut Frame, area: Rect, error: &LoadError) {
    let title = if error.rate_limited {
        "GitHub API rate limit reached"
    } else {
        "Could not load projects"
    };

    let mut lines = vec![
        Line::styled(
            format!("❌ {}", title),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Line::from(""),
        Line::styled(error.message.clone(), Style::default().fg(Color::Red)),
    ];
    if let Some(hint) = &error.hint {
        lines.push(Line::styled(hint.clone(), Style::default().fg(Color::DarkGray)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Press ", Style::default().fg(Color::DarkGray)),
        Span::styled("r", Style::default().fg(Color::Yellow)),
        Span::styled(" to try again", Style::default().fg(Color::DarkGray)),
    ]));

    let text = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(text, area);
}

/// Render an empty state message.
pub fn render_empty(frame: &mut Frame, area: Rect, message: &str) {
    let text = Paragraph::new(message)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(text, area);
}

/// Render the project list for the current showcase state.
pub fn render_projects(
    frame: &mut Frame,
    showcase: &mut Showcase,
    overrides: &HomepageOverrides,
    area: Rect,
) {
    match showcase.status() {
        ShowcaseStatus::Idle => render_empty(frame, area, "Nothing loaded yet"),
        ShowcaseStatus::Loading => render_loading(frame, area, "Loading projects"),
        ShowcaseStatus::Error => {
            if let Some(error) = showcase.error() {
                render_error(frame, area, error);
            }
        }
        ShowcaseStatus::Empty => render_empty(frame, area, &showcase.empty_message()),
        ShowcaseStatus::Populated => {
            let now = Utc::now();
            let items = project_items(showcase, overrides, now);

            let list_widget = List::new(items)
                .highlight_style(Style::default().bg(Color::Rgb(0x2A, 0x2A, 0x2A)))
                .highlight_symbol("▌ ");

            frame.render_stateful_widget(list_widget, area, &mut showcase.list_state);
        }
    }
}

/// One list item per displayed repository. Repositories still waiting on
/// their language breakdown show as skeletons until it arrives.
fn project_items(
    showcase: &Showcase,
    overrides: &HomepageOverrides,
    now: DateTime<Utc>,
) -> Vec<ListItem<'static>> {
    showcase
        .visible()
        .into_iter()
        .map(|repo| {
            if showcase.languages_resolved(repo) {
                let card = ProjectCard::build(repo, showcase.languages_for(repo), overrides, now);
                ListItem::new(card_lines(&card))
            } else {
                ListItem::new(skeleton_lines())
            }
        })
        .collect()
}

/// Lines making up one card.
pub fn card_lines(card: &ProjectCard) -> Vec<Line<'static>> {
    let mut title = Vec::new();
    if card.popular {
        title.push(Span::styled("★ ", Style::default().fg(Color::Yellow)));
    }
    title.push(Span::styled(
        card.title.clone(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ));

    let description_style = if card.has_description {
        Style::default()
    } else {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC)
    };

    let mut meta: Vec<Span<'static>> = Vec::new();
    for language in &card.languages {
        let (r, g, b) = language_color(language);
        meta.push(Span::styled(
            format!(" {} ", language),
            Style::default().bg(Color::Rgb(r, g, b)).fg(Color::Black),
        ));
        meta.push(Span::raw(" "));
    }
    meta.push(Span::styled(
        format!(
            " ★ {}  ⑂ {}  Updated {}",
            format_number(card.stars),
            format_number(card.forks),
            card.updated
        ),
        Style::default().fg(Color::DarkGray),
    ));

    let mut links = vec![Span::styled(
        card.url.clone(),
        Style::default().fg(Color::Blue),
    )];
    if let Some(homepage) = &card.homepage {
        links.push(Span::styled("  Demo: ", Style::default().fg(Color::DarkGray)));
        links.push(Span::styled(homepage.clone(), Style::default().fg(Color::Green)));
    }

    vec![
        Line::from(title),
        Line::styled(card.description.clone(), description_style),
        Line::from(meta),
        Line::from(links),
        Line::from(""),
    ]
}

fn skeleton_lines() -> Vec<Line<'static>> {
    let style = Style::default().fg(Color::DarkGray);
    vec![
        Line::styled("░░░░░░░░░░░░░░░░", style),
        Line::styled("░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░", style),
        Line::styled("░░░░░░  ░░░░░░", style),
        Line::from(""),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> ProjectCard {
        ProjectCard {
            name: "riftfinder".to_string(),
            title: "Riftfinder".to_string(),
            description: "Finds rifts.".to_string(),
            has_description: true,
            languages: vec!["Python".to_string(), "Rust".to_string()],
            stars: 1234,
            forks: 5,
            updated: "3 days ago".to_string(),
            homepage: Some("https://example.com/rift/".to_string()),
            url: "https://github.com/octocat/riftfinder".to_string(),
            popular: true,
        }
    }

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_card_lines() {
        let lines = card_lines(&card());

        assert_eq!(text(&lines[0]), "★ Riftfinder");
        assert_eq!(text(&lines[1]), "Finds rifts.");
        assert_eq!(
            text(&lines[2]),
            " Python   Rust   ★ 1,234  ⑂ 5  Updated 3 days ago"
        );
        assert_eq!(
            text(&lines[3]),
            "https://github.com/octocat/riftfinder  Demo: https://example.com/rift/"
        );
    }

    #[test]
    fn test_card_without_extras() {
        let mut card = card();
        card.popular = false;
        card.homepage = None;

        let lines = card_lines(&card);
        assert_eq!(text(&lines[0]), "Riftfinder");
        assert_eq!(text(&lines[3]), "https://github.com/octocat/riftfinder");
    }
}
