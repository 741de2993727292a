//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::env::{BuildMode, Environment};

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub site_description: String,
    pub author: String,
    pub locale: String,

    // URL
    pub url: String,
    pub base_path: String,
    pub social_image: String,
    pub avatar: String,

    // Person (structured data)
    #[serde(default)]
    pub person: PersonConfig,

    // Head
    pub google_site_verification: Option<String>,
    #[serde(default)]
    pub theme_color: ThemeColorConfig,
    pub analytics: Option<AnalyticsConfig>,

    // Directory
    pub content_dir: String,
    pub public_dir: String,
    pub static_dir: String,

    // Writing
    pub render_drafts: bool,
    pub typography_locale: String,
    #[serde(default)]
    pub highlight: HighlightThemes,
    pub date_format: String,
    pub words_per_minute: usize,

    // Feeds
    pub rss_limit: usize,
    #[serde(default)]
    pub robots_disallow: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Vladyslav Pavlenko".to_string(),
            description: "Go Engineer".to_string(),
            site_description: "Vladyslav Pavlenko’s Blog on Engineering, Technology, and More"
                .to_string(),
            author: "Vladyslav Pavlenko".to_string(),
            locale: "en_US".to_string(),

            url: "https://pvlnk.xyz".to_string(),
            base_path: String::new(),
            social_image: "/social.png".to_string(),
            avatar: "/pic.png".to_string(),

            person: PersonConfig::default(),

            google_site_verification: Some(
                "Oh4RDwXU307Z8ZofFyLQcqmin4Zuv309dats9oWWeHU".to_string(),
            ),
            theme_color: ThemeColorConfig::default(),
            analytics: None,

            content_dir: "content".to_string(),
            public_dir: "public".to_string(),
            static_dir: "static".to_string(),

            render_drafts: false,
            typography_locale: "en-US".to_string(),
            highlight: HighlightThemes::default(),
            date_format: "%B %-d, %Y".to_string(),
            words_per_minute: 200,

            rss_limit: 20,
            robots_disallow: vec!["/login".to_string()],
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply environment overrides, returning the effective build mode.
    pub fn apply_env(&mut self, env: &Environment) -> BuildMode {
        if let Some(url) = &env.base_url {
            tracing::debug!("Base URL overridden from environment: {}", url);
            self.url = url.clone();
        }
        if let Some(base_path) = &env.base_path {
            self.base_path = base_path.clone();
        }
        env.mode
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

/// Structured-data fields describing the site owner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonConfig {
    pub job_title: String,
    pub alumni_of: Option<String>,
    pub gender: Option<String>,
    #[serde(default)]
    pub same_as: Vec<String>,
}

impl Default for PersonConfig {
    fn default() -> Self {
        Self {
            job_title: "Go Engineer".to_string(),
            alumni_of: Some("Kyiv National University".to_string()),
            gender: Some("male".to_string()),
            same_as: vec!["https://www.linkedin.com/in/vladyslavpavlenko".to_string()],
        }
    }
}

/// `theme-color` meta values for both color schemes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeColorConfig {
    pub light: String,
    pub dark: String,
}

impl Default for ThemeColorConfig {
    fn default() -> Self {
        Self {
            light: "#DFDFDE".to_string(),
            dark: "#000".to_string(),
        }
    }
}

/// Third-party analytics script
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    pub script_src: String,
    pub website_id: String,
}

/// Syntax highlighting theme pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightThemes {
    pub dark: String,
    pub light: String,
}

impl Default for HighlightThemes {
    fn default() -> Self {
        Self {
            dark: "github-dark".to_string(),
            light: "github-light".to_string(),
        }
    }
}
