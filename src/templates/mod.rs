//! Built-in site templates using the Tera template engine
//!
//! Templates are embedded in the binary. Autoescaping is off: every value
//! placed in a view is escaped when the view is built, and document bodies
//! are inserted as already-rendered HTML.

use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

use crate::client::ShareLink;
use crate::theme::{ThemeMode, ThemeState};

/// Stylesheet written to the output root
pub const STYLESHEET: &str = include_str!("site/style.css");

/// Template renderer with the embedded site theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("post.html", include_str!("site/post.html")),
            ("index.html", include_str!("site/index.html")),
            ("not_found.html", include_str!("site/not_found.html")),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Site-wide values available to every template
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub lang: String,
    pub home: String,
    pub avatar: String,
    pub stylesheet: String,
}

/// Theme values for the `<html>` element
#[derive(Debug, Clone, Serialize)]
pub struct ThemeData {
    pub mode: ThemeMode,
    pub mounted: bool,
}

impl From<&ThemeState> for ThemeData {
    fn from(state: &ThemeState) -> Self {
        Self {
            mode: state.effective_mode(),
            mounted: state.readiness == crate::theme::Readiness::Mounted,
        }
    }
}

/// Cover image of a post page
#[derive(Debug, Clone, Serialize)]
pub struct CoverData {
    /// Variant chosen for the current theme state
    pub src: String,
    pub alt: String,
    pub light: Option<String>,
    pub dark: Option<String>,
    pub default: Option<String>,
}

/// A full post page
#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub slug: String,
    pub title: String,
    pub path: String,
    pub url: String,
    pub draft: bool,
    pub cover: Option<CoverData>,
    pub date_iso: String,
    pub date_display: String,
    pub reading_time: Option<u32>,
    pub share: Vec<ShareLink>,
    /// Rendered document HTML
    pub body: String,
}

/// A post in the index listing
#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub title: String,
    pub path: String,
    pub date_iso: String,
    pub date_display: String,
    pub reading_time: Option<u32>,
    pub draft: bool,
}
