//! Wire types shared with the affirmations service.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category selection for a random lookup. `All` is sent as the literal `all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Category(i64),
}

impl CategoryFilter {
    pub fn as_query(&self) -> String {
        match self {
            CategoryFilter::All => "all".to_string(),
            CategoryFilter::Category(id) => id.to_string(),
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Some(CategoryFilter::All);
        }
        s.parse().ok().map(CategoryFilter::Category)
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_query())
    }
}

/// `categories` arrives either as a single label or as an ordered list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CategoryLabels {
    One(String),
    Many(Vec<String>),
}

impl CategoryLabels {
    pub fn joined(&self) -> String {
        match self {
            CategoryLabels::One(label) => label.clone(),
            CategoryLabels::Many(labels) => labels.join(", "),
        }
    }
}

impl Default for CategoryLabels {
    fn default() -> Self {
        CategoryLabels::Many(Vec::new())
    }
}

/// Body of `GET /affirmations/random`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RandomAffirmation {
    pub affirmation: String,
    #[serde(default)]
    pub categories: CategoryLabels,
    #[serde(default)]
    pub affirmation_id: Option<i64>,
}

/// Per-user action recorded against an affirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionType {
    Pin,
    Favorite,
    Delete,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Pin => "pin",
            ActionType::Favorite => "favorite",
            ActionType::Delete => "delete",
        }
    }

    /// Server-side cap on concurrent actions of this type per user.
    pub fn limit(&self) -> usize {
        match self {
            ActionType::Pin => 3,
            ActionType::Favorite => 15,
            ActionType::Delete => 1,
        }
    }
}

/// Text and categories for `/affirmations/add` and `/affirmations/edit/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AffirmationDraft {
    pub affirmation_text: String,
    pub category_ids: Vec<i64>,
}

impl AffirmationDraft {
    pub fn new(text: &str, category_ids: Vec<i64>) -> Self {
        Self {
            affirmation_text: text.trim().to_string(),
            category_ids,
        }
    }

    /// Parse a comma separated id list such as `"1, 4,7"`. Blank entries are skipped.
    pub fn parse_category_ids(input: &str) -> Result<Vec<i64>, String> {
        input
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<i64>().map_err(|_| format!("Invalid category ID: {}", s)))
            .collect()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AffirmationRef {
    pub affirmation_id: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CategorySelection {
    pub affirmation_id: i64,
    pub category_id: i64,
}

/// Generic `{message}` / `{error}` envelope returned by mutation endpoints.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ServerReply {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_as_list() {
        let body = r#"{"affirmation": "X", "categories": ["A", "B"], "affirmation_id": 7}"#;
        let parsed: RandomAffirmation = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.affirmation, "X");
        assert_eq!(parsed.categories.joined(), "A, B");
        assert_eq!(parsed.affirmation_id, Some(7));
    }

    #[test]
    fn test_categories_as_string_without_id() {
        let body = r#"{"affirmation": "Breathe", "categories": "Calm"}"#;
        let parsed: RandomAffirmation = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.categories.joined(), "Calm");
        assert_eq!(parsed.affirmation_id, None);
    }

    #[test]
    fn test_filter_query_values() {
        assert_eq!(CategoryFilter::All.as_query(), "all");
        assert_eq!(CategoryFilter::Category(2).as_query(), "2");
        assert_eq!(CategoryFilter::from_str("ALL"), Some(CategoryFilter::All));
        assert_eq!(CategoryFilter::from_str(" 12 "), Some(CategoryFilter::Category(12)));
        assert_eq!(CategoryFilter::from_str("calm"), None);
    }

    #[test]
    fn test_parse_category_ids() {
        assert_eq!(AffirmationDraft::parse_category_ids("1, 4,,7"), Ok(vec![1, 4, 7]));
        assert_eq!(AffirmationDraft::parse_category_ids(""), Ok(vec![]));
        assert!(AffirmationDraft::parse_category_ids("1,x").is_err());
    }

    #[test]
    fn test_camel_case_bodies() {
        let body = serde_json::to_value(CategorySelection { affirmation_id: 3, category_id: 9 }).unwrap();
        assert_eq!(body, serde_json::json!({"affirmationId": 3, "categoryId": 9}));
    }
}
