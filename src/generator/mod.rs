//! Generator module - resolves posts and writes the static site

mod feed;
mod page;

pub use feed::{build_robots, build_rss, build_sitemap, RSS_PATH};
pub use page::PageRenderer;

use anyhow::{Context as _, Result};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use thiserror::Error;
use walkdir::WalkDir;

use crate::cache::{self, CacheDb, CacheStats};
use crate::content::{ContentLoader, MarkdownRenderer, PluginConfig, Post, TransformError};
use crate::templates::STYLESHEET;
use crate::theme::ThemeState;
use crate::Site;

/// Result of resolving a slug to a page
#[derive(Debug)]
pub enum PageOutcome {
    /// A servable post with its serialized body
    Found(Box<Post>),
    /// No such post, or a draft hidden from this build
    NotFound,
}

/// A post that could not be built; other posts are unaffected
#[derive(Debug, Error)]
pub enum PostError {
    #[error("Post '{slug}': {message}")]
    Load { slug: String, message: String },

    #[error("Post '{slug}': {source}")]
    Transform {
        slug: String,
        #[source]
        source: TransformError,
    },
}

impl PostError {
    pub fn slug(&self) -> &str {
        match self {
            PostError::Load { slug, .. } | PostError::Transform { slug, .. } => slug,
        }
    }
}

/// Summary of a full build
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Slugs written to the output, newest first
    pub generated: Vec<String>,
    /// Drafts left out of this build
    pub hidden: Vec<String>,
    pub failures: Vec<PostError>,
    pub cache: CacheStats,
}

impl BuildReport {
    pub fn failed_slugs(&self) -> Vec<&str> {
        self.failures.iter().map(PostError::slug).collect()
    }
}

/// A page rendered for a request path
#[derive(Debug)]
pub enum RenderedPage {
    Found(String),
    NotFound(String),
}

enum Resolved {
    Built { post: Box<Post>, cached: bool },
    Hidden,
}

/// Static site generator
pub struct Generator {
    site: Site,
    markdown: MarkdownRenderer,
    plugins: PluginConfig,
    pages: PageRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(site: &Site) -> Result<Self> {
        Ok(Self {
            site: site.clone(),
            markdown: MarkdownRenderer::new(),
            plugins: PluginConfig::from_config(&site.config),
            pages: PageRenderer::new(&site.config)?,
        })
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    pub fn pages(&self) -> &PageRenderer {
        &self.pages
    }

    /// Resolve a slug to a servable, transformed post
    pub fn resolve_post(&self, slug: &str) -> Result<PageOutcome, PostError> {
        let loaded = ContentLoader::new(&self.site)
            .load_by_slug(slug)
            .map_err(|e| load_error(slug, e))?;

        match loaded {
            None => Ok(PageOutcome::NotFound),
            Some(post) => match self.resolve_loaded(post, None)? {
                Resolved::Built { post, .. } => Ok(PageOutcome::Found(post)),
                Resolved::Hidden => Ok(PageOutcome::NotFound),
            },
        }
    }

    /// Render the page for a slug, or the not-found page
    pub fn render_slug(&self, slug: &str, theme: &ThemeState) -> Result<RenderedPage> {
        match self.resolve_post(slug)? {
            PageOutcome::Found(post) => Ok(RenderedPage::Found(self.pages.render_post(&post, theme)?)),
            PageOutcome::NotFound => Ok(RenderedPage::NotFound(self.pages.render_not_found(theme)?)),
        }
    }

    /// Render the home page from the current content
    pub fn render_index(&self, theme: &ThemeState) -> Result<String> {
        let posts: Vec<Post> = ContentLoader::new(&self.site)
            .load_posts()?
            .into_iter()
            .filter_map(|post| match self.resolve_loaded(post, None) {
                Ok(Resolved::Built { post, .. }) => Some(*post),
                Ok(Resolved::Hidden) => None,
                Err(e) => {
                    tracing::warn!("{}", e);
                    None
                }
            })
            .collect();
        self.pages.render_index(&posts, theme)
    }

    /// Generate the entire site.
    ///
    /// Posts that fail to load or transform are reported, the rest of the
    /// site is still written.
    pub fn generate(&self, force: bool) -> Result<BuildReport> {
        let public_dir = &self.site.public_dir;
        fs::create_dir_all(public_dir)
            .with_context(|| format!("Failed to create {:?}", public_dir))?;

        // Pages of removed or hidden posts must not linger
        let posts_out = public_dir.join("posts");
        if posts_out.exists() {
            fs::remove_dir_all(&posts_out)?;
        }

        let cache_db = if force {
            CacheDb::new()
        } else {
            CacheDb::load(&self.site.base_dir)
        };

        let loaded = ContentLoader::new(&self.site).load_all()?;
        let slugs: BTreeSet<String> = loaded.iter().map(|(slug, _)| slug.clone()).collect();

        let results: Vec<(String, Result<Resolved, PostError>)> = loaded
            .into_par_iter()
            .map(|(slug, post)| {
                let resolved = post
                    .map_err(|e| load_error(&slug, e))
                    .and_then(|post| self.resolve_loaded(post, Some(&cache_db)));
                (slug, resolved)
            })
            .collect();

        let mut report = BuildReport::default();
        let mut posts = Vec::new();
        for (slug, result) in results {
            match result {
                Ok(Resolved::Built { post, cached }) => {
                    if cached {
                        report.cache.hits += 1;
                    } else {
                        report.cache.misses += 1;
                    }
                    posts.push(*post);
                }
                Ok(Resolved::Hidden) => {
                    tracing::debug!("Hiding draft: {}", slug);
                    report.hidden.push(slug);
                }
                Err(e) => {
                    tracing::error!("{}", e);
                    report.failures.push(e);
                }
            }
        }
        posts.sort_by(|a, b| b.published.cmp(&a.published).then(a.slug.cmp(&b.slug)));

        let theme = ThemeState::server();
        posts
            .par_iter()
            .try_for_each(|post| self.write_post(post, &theme))?;

        self.write_file("index.html", &self.pages.render_index(&posts, &theme)?)?;
        self.write_file("404.html", &self.pages.render_not_found(&theme)?)?;
        self.write_file(RSS_PATH, &build_rss(&self.site.config, &posts))?;
        self.write_file("sitemap.xml", &build_sitemap(&self.site.config, &posts))?;
        self.write_file("robots.txt", &build_robots(&self.site.config))?;
        self.write_file("styles.css", STYLESHEET)?;
        self.copy_static_assets()?;

        let mut cache_db = cache_db;
        for post in &posts {
            if let Some(document) = post.document() {
                cache_db.insert(&post.slug, document.clone());
            }
        }
        let dropped = cache_db.retain_slugs(&slugs);
        if dropped > 0 {
            tracing::debug!("Dropped {} stale cache entries", dropped);
        }
        cache_db.save(&self.site.base_dir)?;

        report.generated = posts.into_iter().map(|post| post.slug).collect();
        Ok(report)
    }

    /// Apply draft visibility and transform the body, reusing cached documents
    fn resolve_loaded(&self, post: Post, cache: Option<&CacheDb>) -> Result<Resolved, PostError> {
        if post.draft && self.site.hides_drafts() {
            return Ok(Resolved::Hidden);
        }

        let Some(raw) = post.raw() else {
            return Ok(Resolved::Built {
                post: Box::new(post),
                cached: true,
            });
        };

        let key = cache::document_key(raw, &self.plugins);
        let (document, cached) = match cache.and_then(|db| db.get(&post.slug, &key)) {
            Some(document) => (document.clone(), true),
            None => {
                let document = self
                    .markdown
                    .serialize(raw, &self.plugins)
                    .map_err(|source| PostError::Transform {
                        slug: post.slug.clone(),
                        source,
                    })?;
                (document, false)
            }
        };

        let post = post.with_document(document, self.site.config.words_per_minute);
        Ok(Resolved::Built {
            post: Box::new(post),
            cached,
        })
    }

    fn write_post(&self, post: &Post, theme: &ThemeState) -> Result<()> {
        let html = self.pages.render_post(post, theme)?;
        let relative = format!("posts/{}/index.html", post.slug);
        self.write_file(&relative, &html)?;
        tracing::debug!("Generated post: {}", relative);
        Ok(())
    }

    fn write_file(&self, relative: &str, content: &str) -> Result<()> {
        let output_path = self.site.public_dir.join(relative);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
        }
        fs::write(&output_path, content)
            .map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", output_path, e))?;
        Ok(())
    }

    /// Copy static assets (images, icons, ...) to the public directory
    fn copy_static_assets(&self) -> Result<()> {
        let static_dir = &self.site.static_dir;
        if !static_dir.exists() {
            return Ok(());
        }

        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(static_dir)?;
            let dest = self.site.public_dir.join(relative);
            copy_file(path, &dest)?;
        }

        Ok(())
    }
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(from, to).with_context(|| format!("Failed to copy {:?} to {:?}", from, to))?;
    Ok(())
}

fn load_error(slug: &str, error: anyhow::Error) -> PostError {
    PostError::Load {
        slug: slug.to_string(),
        message: format!("{:#}", error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BuildMode, HighlightThemes, SiteConfig};
    use tempfile::TempDir;

    fn write_post(dir: &Path, name: &str, content: &str) {
        let posts = dir.join("content").join("posts");
        fs::create_dir_all(&posts).unwrap();
        fs::write(posts.join(name), content).unwrap();
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        write_post(
            dir.path(),
            "first.md",
            "---\ntitle: First\npublishedDate: 2024-01-10\n---\n\nHello -- world.\n",
        );
        write_post(
            dir.path(),
            "second.md",
            "---\ntitle: Second\npublishedDate: 2024-02-10\ncoverLight: /c.png\n---\n\n```rust\nfn main() {}\n```\n",
        );
        write_post(
            dir.path(),
            "wip.md",
            "---\ntitle: WIP\npublishedDate: 2024-03-10\ndraft: true\n---\n\nNot yet.\n",
        );
        dir
    }

    fn site(dir: &TempDir, mode: BuildMode) -> Site {
        let config = SiteConfig {
            url: "https://example.com".to_string(),
            ..Default::default()
        };
        Site::with_config(dir.path(), config, mode)
    }

    #[test]
    fn test_generate_writes_one_page_per_servable_slug() {
        let dir = fixture();
        let site = site(&dir, BuildMode::Production);
        let report = Generator::new(&site).unwrap().generate(false).unwrap();

        assert_eq!(report.generated, vec!["second", "first"]);
        assert_eq!(report.hidden, vec!["wip"]);
        assert!(report.failures.is_empty());

        let public = &site.public_dir;
        assert!(public.join("posts/first/index.html").exists());
        assert!(public.join("posts/second/index.html").exists());
        assert!(!public.join("posts/wip/index.html").exists());
        assert!(public.join("404.html").exists());
        assert!(public.join("index.html").exists());
        assert!(public.join("sitemap.xml").exists());
        assert!(public.join("robots.txt").exists());
        assert!(public.join("styles.css").exists());

        let rss = fs::read_to_string(public.join("posts/rss")).unwrap();
        assert!(rss.contains("https://example.com/posts/second"));
        assert!(!rss.contains("posts/wip"));

        let first = fs::read_to_string(public.join("posts/first/index.html")).unwrap();
        assert!(first.contains("Hello – world."));
    }

    #[test]
    fn test_drafts_built_in_development() {
        let dir = fixture();
        let site = site(&dir, BuildMode::Development);
        let report = Generator::new(&site).unwrap().generate(false).unwrap();

        assert_eq!(report.generated, vec!["wip", "second", "first"]);
        let wip = fs::read_to_string(site.public_dir.join("posts/wip/index.html")).unwrap();
        assert!(wip.contains("Draft Post"));
    }

    #[test]
    fn test_second_build_uses_cache() {
        let dir = fixture();
        let site = site(&dir, BuildMode::Production);
        let generator = Generator::new(&site).unwrap();

        let first = generator.generate(false).unwrap();
        assert_eq!(first.cache.misses, 2);

        let second = generator.generate(false).unwrap();
        assert_eq!(second.cache.hits, 2);
        assert_eq!(second.cache.misses, 0);

        let forced = generator.generate(true).unwrap();
        assert_eq!(forced.cache.misses, 2);
    }

    #[test]
    fn test_transform_failure_is_scoped_to_slug() {
        let dir = fixture();
        let config = SiteConfig {
            highlight: HighlightThemes {
                dark: "no-such-theme".to_string(),
                light: "github-light".to_string(),
            },
            ..Default::default()
        };
        let site = Site::with_config(dir.path(), config, BuildMode::Production);
        let report = Generator::new(&site).unwrap().generate(false).unwrap();

        // Every post fails highlighting setup, the site shell still builds
        assert_eq!(report.failed_slugs(), vec!["first", "second"]);
        assert!(matches!(
            report.failures[0],
            PostError::Transform {
                source: TransformError::UnknownTheme(_),
                ..
            }
        ));
        assert!(site.public_dir.join("404.html").exists());
    }

    #[test]
    fn test_load_failure_is_scoped_to_slug() {
        let dir = fixture();
        write_post(dir.path(), "broken.md", "---\ntitle: [oops\n---\nBody\n");
        let site = site(&dir, BuildMode::Production);
        let report = Generator::new(&site).unwrap().generate(false).unwrap();

        assert_eq!(report.failed_slugs(), vec!["broken"]);
        assert_eq!(report.generated.len(), 2);
    }

    #[test]
    fn test_resolve_post() {
        let dir = fixture();
        let site = site(&dir, BuildMode::Production);
        let generator = Generator::new(&site).unwrap();

        match generator.resolve_post("second").unwrap() {
            PageOutcome::Found(post) => {
                let document = post.document().unwrap();
                assert!(document.html.contains(r#"data-theme="light""#));
                assert!(document.html.contains(r#"data-theme="dark""#));
                assert_eq!(post.reading_time, Some(1));
            }
            PageOutcome::NotFound => panic!("expected a post"),
        }

        assert!(matches!(
            generator.resolve_post("missing").unwrap(),
            PageOutcome::NotFound
        ));
        assert!(matches!(
            generator.resolve_post("wip").unwrap(),
            PageOutcome::NotFound
        ));
    }

    #[test]
    fn test_render_slug_not_found() {
        let dir = fixture();
        let site = site(&dir, BuildMode::Production);
        let generator = Generator::new(&site).unwrap();

        match generator.render_slug("nope", &ThemeState::server()).unwrap() {
            RenderedPage::NotFound(html) => assert!(html.contains("<h1>Not found</h1>")),
            RenderedPage::Found(_) => panic!("expected not found"),
        }
    }

    #[test]
    fn test_static_assets_copied() {
        let dir = fixture();
        let site = site(&dir, BuildMode::Production);
        fs::create_dir_all(site.static_dir.join("img")).unwrap();
        fs::write(site.static_dir.join("img/pic.png"), b"png").unwrap();

        Generator::new(&site).unwrap().generate(false).unwrap();
        assert_eq!(
            fs::read(site.public_dir.join("img/pic.png")).unwrap(),
            b"png"
        );
    }

    #[test]
    fn test_removed_post_page_is_deleted() {
        let dir = fixture();
        let site = site(&dir, BuildMode::Production);
        let generator = Generator::new(&site).unwrap();
        generator.generate(false).unwrap();

        fs::remove_file(site.posts_dir().join("first.md")).unwrap();
        generator.generate(false).unwrap();
        assert!(!site.public_dir.join("posts/first/index.html").exists());
    }
}
