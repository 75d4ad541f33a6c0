//! Formatting helpers

use chrono::{DateTime, Utc};

/// Compact relative age, e.g. `42s ago`, `3m ago`, `5h ago`, `2d ago`
pub fn format_age(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - created_at).num_seconds().max(0);
    match secs {
        0..=59 => format!("{}s ago", secs),
        60..=3599 => format!("{}m ago", secs / 60),
        3600..=86_399 => format!("{}h ago", secs / 3600),
        _ => format!("{}d ago", secs / 86_400),
    }
}

/// First line of `text`, cut to `max` characters with an ellipsis
pub fn truncate(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or_default().trim();
    if line.chars().count() <= max {
        return line.to_string();
    }
    let cut: String = line.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", cut.trim_end())
}

/// Deployment ids carry a `dpl_` prefix and a long random tail
pub fn short_id(id: &str) -> &str {
    let tail = id.strip_prefix("dpl_").unwrap_or(id);
    match tail.char_indices().nth(8) {
        Some((idx, _)) => &tail[..idx],
        None => tail,
    }
}
