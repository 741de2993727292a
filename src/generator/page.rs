//! Page rendering: post, index and not-found pages with their `<head>`

use anyhow::{anyhow, Result};
use tera::Context;

use crate::client::{self, ShareLink};
use crate::config::SiteConfig;
use crate::content::Post;
use crate::helpers::{date_iso, escape_html, format_date, full_url_for, url_for};
use crate::seo::{self, SeoDescriptor, SeoOverrides, SiteDefaults};
use crate::templates::{CoverData, PostData, PostSummary, SiteData, TemplateRenderer, ThemeData};
use crate::theme::{self, ThemeState};

/// Renders complete HTML pages for a site
pub struct PageRenderer {
    templates: TemplateRenderer,
    config: SiteConfig,
    defaults: SiteDefaults,
    site_data: SiteData,
    script: String,
}

impl PageRenderer {
    pub fn new(config: &SiteConfig) -> Result<Self> {
        Ok(Self {
            templates: TemplateRenderer::new()?,
            config: config.clone(),
            defaults: SiteDefaults::from_config(config),
            site_data: build_site_data(config),
            script: client::inline_script(),
        })
    }

    pub fn defaults(&self) -> &SiteDefaults {
        &self.defaults
    }

    /// Effective SEO metadata of a post page
    pub fn post_seo(&self, post: &Post) -> SeoDescriptor {
        let overrides = SeoOverrides {
            title: Some(post.title.clone()),
            description: post.meta_description.clone(),
            image: post
                .covers
                .light_first()
                .map(|cover| url_for(&self.config, cover)),
            path: Some(url_for(&self.config, &post.route())),
        };
        seo::compose(&overrides, &self.defaults)
    }

    /// Render a post page. The post body must already be serialized.
    pub fn render_post(&self, post: &Post, theme: &ThemeState) -> Result<String> {
        let document = post
            .document()
            .ok_or_else(|| anyhow!("Post '{}' has not been transformed", post.slug))?;

        let path = url_for(&self.config, &post.route());
        let url = full_url_for(&self.config, &post.route());

        let cover = theme::post_cover(post, theme).map(|src| CoverData {
            src: self.asset_url(src),
            alt: escape_html(&post.cover_alt_text()),
            light: post.covers.light.as_deref().map(|u| self.asset_url(u)),
            dark: post.covers.dark.as_deref().map(|u| self.asset_url(u)),
            default: post.covers.default.as_deref().map(|u| self.asset_url(u)),
        });

        let share = client::share_links(&post.title, &url)
            .into_iter()
            .map(|link| ShareLink {
                name: link.name,
                href: escape_html(&link.href),
            })
            .collect();

        let data = PostData {
            slug: post.slug.clone(),
            title: escape_html(&post.title),
            path: escape_html(&path),
            url: escape_html(&url),
            draft: post.draft,
            cover,
            date_iso: date_iso(&post.published),
            date_display: format_date(&post.published, &self.config.date_format),
            reading_time: post.reading_time,
            share,
            body: document.html.clone(),
        };

        let mut context = self.base_context(&self.post_seo(post), theme);
        context.insert("post", &data);

        self.templates.render("post.html", &context)
    }

    /// Render the home page listing
    pub fn render_index(&self, posts: &[Post], theme: &ThemeState) -> Result<String> {
        let summaries: Vec<PostSummary> = posts
            .iter()
            .map(|post| PostSummary {
                title: escape_html(&post.title),
                path: escape_html(&url_for(&self.config, &post.route())),
                date_iso: date_iso(&post.published),
                date_display: format_date(&post.published, &self.config.date_format),
                reading_time: post.reading_time,
                draft: post.draft,
            })
            .collect();

        let overrides = SeoOverrides {
            path: Some(url_for(&self.config, "/")),
            ..Default::default()
        };

        let mut context = self.base_context(&seo::compose(&overrides, &self.defaults), theme);
        context.insert("posts", &summaries);

        self.templates.render("index.html", &context)
    }

    /// Render the page served for unknown routes
    pub fn render_not_found(&self, theme: &ThemeState) -> Result<String> {
        let seo = seo::compose(&SeoOverrides::titled("Not found"), &self.defaults);
        let context = self.base_context(&seo, theme);
        self.templates.render("not_found.html", &context)
    }

    fn base_context(&self, seo: &SeoDescriptor, theme: &ThemeState) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.site_data);
        context.insert("theme", &ThemeData::from(theme));
        context.insert("head", &seo::render_head(seo, &self.defaults));
        context.insert("script", &self.script);
        context
    }

    fn asset_url(&self, url: &str) -> String {
        escape_html(&url_for(&self.config, url))
    }
}

fn build_site_data(config: &SiteConfig) -> SiteData {
    let lang = config
        .locale
        .split(['_', '-'])
        .next()
        .filter(|lang| !lang.is_empty())
        .unwrap_or("en");

    SiteData {
        title: escape_html(&config.title),
        description: escape_html(&config.site_description),
        author: escape_html(&config.author),
        lang: lang.to_string(),
        home: escape_html(&url_for(config, "/")),
        avatar: escape_html(&url_for(config, &config.avatar)),
        stylesheet: escape_html(&url_for(config, "/styles.css")),
    }
}
