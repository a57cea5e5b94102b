use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashboardTab {
    #[default]
    Users,
    Affirmations,
    Categories,
}

impl DashboardTab {
    pub fn as_str(&self) -> &'static str {
        match self {
            DashboardTab::Users => "users",
            DashboardTab::Affirmations => "affirmations",
            DashboardTab::Categories => "categories",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "users" => Some(DashboardTab::Users),
            "affirmations" => Some(DashboardTab::Affirmations),
            "categories" => Some(DashboardTab::Categories),
            _ => None,
        }
    }

    /// Resolve a persisted tab name, falling back to the default tab.
    pub fn from_persisted(s: Option<&str>) -> Self {
        s.and_then(Self::from_str).unwrap_or_default()
    }

    pub fn all() -> Vec<DashboardTab> {
        vec![DashboardTab::Users, DashboardTab::Affirmations, DashboardTab::Categories]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DashboardTab::Users => "Users",
            DashboardTab::Affirmations => "Affirmations",
            DashboardTab::Categories => "Categories",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            DashboardTab::Users => DashboardTab::Affirmations,
            DashboardTab::Affirmations => DashboardTab::Categories,
            DashboardTab::Categories => DashboardTab::Users,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            DashboardTab::Users => DashboardTab::Categories,
            DashboardTab::Affirmations => DashboardTab::Users,
            DashboardTab::Categories => DashboardTab::Affirmations,
        }
    }
}

fn timestamp_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2})").expect("timestamp pattern is valid")
    })
}

/// Render a table cell, turning a leading `YYYY-MM-DD HH:MM:SS` into e.g. `Mar 5, 2025, 2:07 PM`.
/// Anything else is returned trimmed and otherwise untouched.
pub fn format_cell(text: &str) -> String {
    let text = text.trim();
    let parsed = timestamp_pattern()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| NaiveDateTime::parse_from_str(m.as_str(), "%Y-%m-%d %H:%M:%S").ok());

    match parsed {
        Some(when) => when.format("%b %-d, %Y, %-I:%M %p").to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_round_trip() {
        for tab in DashboardTab::all() {
            assert_eq!(DashboardTab::from_str(tab.as_str()), Some(tab));
        }
    }

    #[test]
    fn test_unknown_persisted_tab_uses_default() {
        assert_eq!(DashboardTab::from_persisted(None), DashboardTab::Users);
        assert_eq!(DashboardTab::from_persisted(Some("settings")), DashboardTab::Users);
        assert_eq!(DashboardTab::from_persisted(Some("Categories")), DashboardTab::Categories);
    }

    #[test]
    fn test_tab_cycle() {
        let mut tab = DashboardTab::Users;
        for _ in 0..3 {
            tab = tab.next();
        }
        assert_eq!(tab, DashboardTab::Users);
        assert_eq!(DashboardTab::Users.prev(), DashboardTab::Categories);
    }

    #[test]
    fn test_format_timestamp_cell() {
        assert_eq!(format_cell("2025-03-05 14:07:33"), "Mar 5, 2025, 2:07 PM");
        assert_eq!(format_cell(" 2024-12-25 00:30:00.123456 "), "Dec 25, 2024, 12:30 AM");
    }

    #[test]
    fn test_format_leaves_other_cells() {
        assert_eq!(format_cell("alice@example.com"), "alice@example.com");
        assert_eq!(format_cell("2025-03-05"), "2025-03-05");
        assert_eq!(format_cell("2025-13-45 99:00:00"), "2025-13-45 99:00:00");
    }
}
