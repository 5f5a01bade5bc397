// Display formatting helpers.
// Relative dates, number grouping, word-aware truncation and project names.

use chrono::{DateTime, Utc};

/// Words kept fully uppercase in project names.
const PRESERVED_ACRONYMS: &[&str] = &["API", "TCC", "JS", "TS", "HTML", "CSS", "UI", "UX", "ID", "URL"];

/// Format a timestamp relative to `now` ("today", "3 days ago", "2 months ago").
pub fn format_relative_date(dt: &DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = now.signed_duration_since(*dt).num_days();

    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {} ago", unit)
        } else {
            format!("{} {}s ago", n, unit)
        }
    };

    match days {
        i64::MIN..=0 => "today".to_string(),
        1 => "yesterday".to_string(),
        2..=6 => plural(days, "day"),
        7..=29 => plural(days / 7, "week"),
        30..=364 => plural(days / 30, "month"),
        _ => plural(days / 365, "year"),
    }
}

/// Group thousands with commas: 1234567 -> "1,234,567".
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Truncate to at most `max_chars` characters, cutting at the last space
/// before the limit and appending `suffix`.
pub fn truncate_by_words(text: &str, max_chars: usize, suffix: &str) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let keep = max_chars.saturating_sub(suffix.chars().count());
    let truncated: String = text.chars().take(keep).collect();

    match truncated.rfind(' ') {
        Some(space) if space > 0 => format!("{}{}", &truncated[..space], suffix),
        _ => format!("{}{}", truncated, suffix),
    }
}

/// Turn a repository name into a title: "my_api-client" -> "My API Client".
pub fn format_project_name(name: &str) -> String {
    name.split(['-', '_', ' '])
        .map(|word| {
            let upper = word.to_uppercase();
            if PRESERVED_ACRONYMS.contains(&upper.as_str()) {
                return upper;
            }

            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
