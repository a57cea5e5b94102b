use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

use crate::dashboard::DashboardTab;
use crate::model::CategoryFilter;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// A category the filter picker can offer. The site renders these into HTML, so the
/// client keeps its own list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CategoryEntry {
    pub id: i64,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    pub base_url: Option<String>,
    pub session_cookie: Option<String>,
    pub default_category: Option<String>,
    #[serde(default)]
    pub categories: Vec<CategoryEntry>,
    pub active_tab: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            base_url: Some(DEFAULT_BASE_URL.to_string()),
            session_cookie: None,
            default_category: None,
            categories: Vec::new(),
            active_tab: None,
        }
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    /// `AFFIRM_BASE_URL` and `AFFIRM_SESSION` take precedence over the file.
    pub fn with_env(mut self) -> Self {
        if let Ok(url) = std::env::var("AFFIRM_BASE_URL") {
            self.base_url = Some(url);
        }
        if let Ok(session) = std::env::var("AFFIRM_SESSION") {
            self.session_cookie = Some(session);
        }
        self
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn active_tab(&self) -> DashboardTab {
        DashboardTab::from_persisted(self.active_tab.as_deref())
    }

    pub fn default_filter(&self) -> CategoryFilter {
        self.default_category
            .as_deref()
            .and_then(CategoryFilter::from_str)
            .unwrap_or_default()
    }

    pub fn category_name(&self, id: i64) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.as_str())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("affirm").join("config.json"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.active_tab(), DashboardTab::Users);
        assert_eq!(config.default_filter(), CategoryFilter::All);
    }

    #[test]
    fn test_active_tab_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::new();
        config.active_tab = Some(DashboardTab::Categories.as_str().to_string());
        config.categories.push(CategoryEntry { id: 2, name: "Calm".to_string() });
        config.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.active_tab(), DashboardTab::Categories);
        assert_eq!(reloaded.category_name(2), Some("Calm"));
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"default_category": "4"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.default_filter(), CategoryFilter::Category(4));
        assert!(config.categories.is_empty());
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
    }
}
