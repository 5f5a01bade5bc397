// Plain text rendering for non-interactive output.

use chrono::{DateTime, Utc};

use crate::format::format_number;
use crate::state::{HomepageOverrides, ProjectCard, Showcase, ShowcaseStatus};

/// Render the displayed window as plain text, one block per project.
pub fn render_plain(showcase: &Showcase, overrides: &HomepageOverrides, now: DateTime<Utc>) -> String {
    let mut out = String::new();

    match showcase.status() {
        ShowcaseStatus::Idle | ShowcaseStatus::Loading => {}
        ShowcaseStatus::Error => {
            if let Some(error) = showcase.error() {
                out.push_str(&format!("error: {}\n", error.message));
                if let Some(hint) = &error.hint {
                    out.push_str(&format!("hint: {}\n", hint));
                }
            }
        }
        ShowcaseStatus::Empty => {
            out.push_str(&showcase.empty_message());
            out.push('\n');
        }
        ShowcaseStatus::Populated => {
            out.push_str(&format!(
                "{} (sorted by {})\n\n",
                showcase.counter_text(),
                showcase.sort().label()
            ));
            for card in showcase.cards(overrides, now) {
                out.push_str(&card_text(&card));
                out.push('\n');
            }
            if showcase.has_more() {
                out.push_str("More projects available.\n");
            }
        }
    }
    out
}

fn card_text(card: &ProjectCard) -> String {
    let marker = if card.popular { "★ " } else { "" };
    let mut text = format!(
        "{}{}\n  {}\n  [{}]  ★ {}  ⑂ {}  Updated {}\n  {}\n",
        marker,
        card.title,
        card.description,
        card.languages.join(", "),
        format_number(card.stars),
        format_number(card.forks),
        card.updated,
        card.url,
    );
    if let Some(homepage) = &card.homepage {
        text.push_str(&format!("  Demo: {}\n", homepage));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::{Owner, Repository};
    use crate::state::SortOrder;
    use chrono::TimeZone;

    fn repo(name: &str, stars: u64) -> Repository {
        Repository {
            name: name.to_string(),
            owner: Owner {
                login: "octocat".to_string(),
            },
            description: Some(format!("About {}", name)),
            language: Some("Rust".to_string()),
            languages_url: None,
            stargazers_count: stars,
            forks_count: 0,
            updated_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
            homepage: None,
            html_url: format!("https://github.com/octocat/{}", name),
            fork: false,
            private: false,
        }
    }

    #[test]
    fn test_render_first_page() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 18, 0, 0).unwrap();
        let mut showcase = Showcase::new(1, 1, SortOrder::Stars);
        showcase.set_loaded(vec![repo("small", 1), repo("big", 2500)]);
        showcase.set_languages("octocat", "big", vec!["Shell".to_string()]);

        let overrides =
            HomepageOverrides::new(vec![("big".to_string(), "https://example.com".to_string())]);
        let text = render_plain(&showcase, &overrides, now);

        assert!(text.starts_with("Showing 1 of 2 projects (sorted by Most stars)"));
        assert!(text.contains("★ Big\n"));
        assert!(text.contains("[Rust, Shell]  ★ 2,500"));
        assert!(text.contains("Demo: https://example.com"));
        assert!(!text.contains("Small"));
        assert!(text.ends_with("More projects available.\n"));
    }

    #[test]
    fn test_render_empty() {
        let mut showcase = Showcase::default();
        showcase.set_loaded(Vec::new());
        let text = render_plain(&showcase, &HomepageOverrides::default(), Utc::now());
        assert_eq!(text, "No public projects available right now.\n");
    }
}
