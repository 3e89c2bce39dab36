//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Stylesheet served from `static/`, hashed by the build script.
const STYLESHEET: &str = "/static/css/main.css";

/// Returns the current year for the sidebar footer.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Returns the stylesheet URL with its content hash as a cache buster.
///
/// Usage in templates: `{{ ""|stylesheet_url }}`
#[askama::filter_fn]
pub fn stylesheet_url(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(versioned(STYLESHEET, env!("CSS_HASH")))
}

/// Renders a unit count as "1 item" or "N items".
///
/// Usage in templates: `{{ cart.summary.item_count|item_count }}`
#[askama::filter_fn]
pub fn item_count(count: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(count_label(&count.to_string()))
}

fn versioned(path: &str, hash: &str) -> String {
    format!("{path}?v={hash}")
}

fn count_label(count: &str) -> String {
    if count == "1" {
        "1 item".to_string()
    } else {
        format!("{count} items")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stylesheet_url_carries_hash() {
        assert_eq!(
            versioned(STYLESHEET, "1a2b3c4d"),
            "/static/css/main.css?v=1a2b3c4d"
        );
        assert!(!env!("CSS_HASH").is_empty());
    }

    #[test]
    fn test_count_label() {
        assert_eq!(count_label("0"), "0 items");
        assert_eq!(count_label("1"), "1 item");
        assert_eq!(count_label("12"), "12 items");
    }
}
