//! folio-rs: a static site generator for a personal portfolio and blog
//!
//! Posts are markdown files with YAML front-matter. They are transformed
//! with typography and dual-theme syntax highlighting, wrapped in SEO
//! metadata and rendered through embedded Tera templates.

pub mod cache;
pub mod client;
pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod seo;
pub mod server;
pub mod templates;
pub mod theme;

use anyhow::Result;
use std::path::{Path, PathBuf};

use config::{normalize_base_path, BuildMode, Environment, SiteConfig};

/// A site rooted at a directory, with its effective configuration
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration, environment overrides applied
    pub config: SiteConfig,
    /// Production or development
    pub mode: BuildMode,
    /// Base directory
    pub base_dir: PathBuf,
    /// Content directory
    pub content_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Static assets copied verbatim to the output
    pub static_dir: PathBuf,
}

impl Site {
    /// Open a site from a directory, reading `_config.yml` and the environment
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            SiteConfig::load(&config_path)?
        } else {
            SiteConfig::default()
        };

        let env = Environment::from_env()?;
        let mode = config.apply_env(&env);

        Ok(Self::with_config(base_dir, config, mode))
    }

    /// Build a site from an already resolved configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, mut config: SiteConfig, mode: BuildMode) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        config.base_path = normalize_base_path(&config.base_path);

        let content_dir = base_dir.join(&config.content_dir);
        let public_dir = base_dir.join(&config.public_dir);
        let static_dir = base_dir.join(&config.static_dir);

        Self {
            config,
            mode,
            base_dir,
            content_dir,
            public_dir,
            static_dir,
        }
    }

    /// Directory holding post sources
    pub fn posts_dir(&self) -> PathBuf {
        self.content_dir.join("posts")
    }

    /// Whether drafts are hidden from this build
    pub fn hides_drafts(&self) -> bool {
        self.mode.is_production() && !self.config.render_drafts
    }
}
