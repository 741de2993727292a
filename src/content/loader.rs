//! Content loader - resolves post slugs to files under `<content_dir>/posts`

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{Covers, FrontMatter, Post, PostBody};
use crate::Site;

/// Loads posts from the content directory
pub struct ContentLoader<'a> {
    site: &'a Site,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(site: &'a Site) -> Self {
        Self { site }
    }

    /// All known slugs, drafts included, sorted
    pub fn list_slugs(&self) -> Result<Vec<String>> {
        Ok(self.index()?.into_keys().collect())
    }

    /// Load a post by slug; `None` when no such post exists
    pub fn load_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        if !is_url_safe(slug) {
            return Ok(None);
        }
        match self.index()?.get(slug) {
            Some(path) => self.load_post(path, slug).map(Some),
            None => Ok(None),
        }
    }

    /// Load every servable post, newest first.
    ///
    /// Posts that fail to load are logged and skipped.
    pub fn load_posts(&self) -> Result<Vec<Post>> {
        let mut posts = Vec::new();

        for (slug, path) in self.index()? {
            match self.load_post(&path, &slug) {
                Ok(post) if self.is_servable(&post) => posts.push(post),
                Ok(post) => tracing::debug!("Hiding draft: {}", post.slug),
                Err(e) => tracing::warn!("Failed to load post {:?}: {:#}", path, e),
            }
        }

        posts.sort_by(|a, b| b.published.cmp(&a.published).then(a.slug.cmp(&b.slug)));

        Ok(posts)
    }

    /// Load every indexed post, drafts included, keeping per-slug failures
    pub fn load_all(&self) -> Result<Vec<(String, Result<Post>)>> {
        Ok(self
            .index()?
            .into_iter()
            .map(|(slug, path)| {
                let post = self.load_post(&path, &slug);
                (slug, post)
            })
            .collect())
    }

    /// Drafts are only served in development, or when `render_drafts` is set
    pub fn is_servable(&self, post: &Post) -> bool {
        !post.draft || !self.site.mode.is_production() || self.site.config.render_drafts
    }

    /// Map of slug to source file
    fn index(&self) -> Result<BTreeMap<String, PathBuf>> {
        let posts_dir = self.site.posts_dir();
        let mut index = BTreeMap::new();
        if !posts_dir.exists() {
            return Ok(index);
        }

        let mut files: Vec<PathBuf> = WalkDir::new(&posts_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| p.is_file() && is_markdown_file(p))
            .collect();
        files.sort();

        for path in files {
            let Some(slug) = slug_for(&path)? else {
                tracing::warn!("No usable slug for {:?}, skipping", path);
                continue;
            };
            if let Some(existing) = index.get(&slug) {
                tracing::warn!(
                    "Duplicate slug `{}`: keeping {:?}, ignoring {:?}",
                    slug,
                    existing,
                    path
                );
                continue;
            }
            index.insert(slug, path);
        }

        Ok(index)
    }

    /// Load a single post from a file
    fn load_post(&self, path: &Path, slug: &str) -> Result<Post> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let (fm, body) = FrontMatter::parse(&content)
            .with_context(|| format!("Invalid front-matter in {:?}", path))?;

        let published = fm.parse_published().unwrap_or_else(|| {
            let modified = fs::metadata(path)
                .and_then(|m| m.modified())
                .map(DateTime::<Local>::from)
                .unwrap_or_else(|_| Local::now());
            modified.date_naive()
        });

        let title = fm
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| slug.to_string());

        Ok(Post {
            slug: slug.to_string(),
            title,
            meta_description: fm.meta_description.filter(|d| !d.trim().is_empty()),
            published,
            covers: Covers {
                default: fm.cover_url,
                light: fm.cover_light,
                dark: fm.cover_dark,
            },
            cover_alt: fm.cover_alt,
            draft: fm.draft,
            body: PostBody::Raw(body.to_string()),
            reading_time: fm.reading_time,
            source: path.to_path_buf(),
        })
    }
}

/// Slug from the explicit front-matter field, else from the file name
fn slug_for(path: &Path) -> Result<Option<String>> {
    let explicit = match fs::read_to_string(path) {
        Ok(content) => match FrontMatter::parse(&content) {
            Ok((fm, _)) => fm.slug,
            Err(e) => {
                tracing::warn!("Invalid front-matter in {:?}: {}", path, e);
                None
            }
        },
        Err(e) => return Err(e).with_context(|| format!("Failed to read {:?}", path)),
    };

    let stem = path.file_stem().and_then(|s| s.to_str()).map(url_slug);
    Ok(explicit
        .as_deref()
        .map(url_slug)
        .filter(|slug| !slug.is_empty())
        .or_else(|| {
            if explicit.is_some() {
                tracing::warn!(
                    "Slug in {:?} has no URL-safe characters, using the file name",
                    path
                );
            }
            stem.filter(|slug| !slug.is_empty())
        }))
}

/// `raw` as it is when already URL-safe, else slugified
fn url_slug(raw: &str) -> String {
    if is_url_safe(raw) {
        raw.to_string()
    } else {
        slug::slugify(raw)
    }
}

/// Slugs may only contain ASCII alphanumerics, `-`, `_` and `.`
pub fn is_url_safe(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('.')
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Check if a file is a markdown or MDX file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e, "md" | "mdx" | "markdown"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BuildMode, SiteConfig};
    use chrono::NaiveDate;
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
            "hello-world.md",
            "---\ntitle: Hello World\npublishedDate: 2024-01-15\n---\n\nHello.\n",
        );
        write_post(
            dir.path(),
            "second.mdx",
            "---\ntitle: Second\npublishedDate: 2024-02-01\ncoverLight: /l.png\n---\n\nBody.\n",
        );
        write_post(
            dir.path(),
            "wip.md",
            "---\ntitle: Work in progress\npublishedDate: 2024-03-01\ndraft: true\n---\n\nDraft.\n",
        );
        write_post(
            dir.path(),
            "2020-old-name.md",
            "---\nslug: renamed\ntitle: Renamed\npublishedDate: 2020-01-01\n---\n\nOld.\n",
        );
        dir
    }

    fn site(dir: &TempDir, mode: BuildMode) -> Site {
        Site::with_config(dir.path(), SiteConfig::default(), mode)
    }

    #[test]
    fn test_every_listed_slug_loads() {
        let dir = fixture();
        let site = site(&dir, BuildMode::Production);
        let loader = ContentLoader::new(&site);

        let slugs = loader.list_slugs().unwrap();
        assert_eq!(slugs, vec!["hello-world", "renamed", "second", "wip"]);
        for slug in &slugs {
            let post = loader.load_by_slug(slug).unwrap();
            assert_eq!(post.map(|p| p.slug), Some(slug.clone()));
        }
    }

    #[test]
    fn test_unknown_slug_is_absent() {
        let dir = fixture();
        let site = site(&dir, BuildMode::Production);
        let loader = ContentLoader::new(&site);

        assert!(loader.load_by_slug("missing").unwrap().is_none());
        assert!(loader.load_by_slug("../secrets").unwrap().is_none());
        assert!(loader.load_by_slug("").unwrap().is_none());
    }

    #[test]
    fn test_loaded_fields() {
        let dir = fixture();
        let site = site(&dir, BuildMode::Production);
        let post = ContentLoader::new(&site)
            .load_by_slug("second")
            .unwrap()
            .unwrap();

        assert_eq!(post.title, "Second");
        assert_eq!(post.published, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(post.covers.light.as_deref(), Some("/l.png"));
        assert_eq!(post.raw(), Some("Body.\n"));
        assert_eq!(post.meta_description, None);
    }

    #[test]
    fn test_drafts_hidden_in_production() {
        let dir = fixture();
        let site = site(&dir, BuildMode::Production);
        let posts = ContentLoader::new(&site).load_posts().unwrap();
        let slugs: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["second", "hello-world", "renamed"]);
    }

    #[test]
    fn test_drafts_visible_in_development() {
        let dir = fixture();
        let site = site(&dir, BuildMode::Development);
        let posts = ContentLoader::new(&site).load_posts().unwrap();
        assert_eq!(posts[0].slug, "wip");
        assert!(posts[0].draft);
    }

    #[test]
    fn test_render_drafts_overrides_production() {
        let dir = fixture();
        let config = SiteConfig {
            render_drafts: true,
            ..Default::default()
        };
        let site = Site::with_config(dir.path(), config, BuildMode::Production);
        let posts = ContentLoader::new(&site).load_posts().unwrap();
        assert_eq!(posts.len(), 4);
    }

    #[test]
    fn test_load_all_keeps_failures_per_slug() {
        let dir = fixture();
        write_post(dir.path(), "broken.md", "---\ntitle: [unclosed\n---\nBody");
        let site = site(&dir, BuildMode::Production);

        let loaded = ContentLoader::new(&site).load_all().unwrap();
        assert_eq!(loaded.len(), 5);
        let (slug, result) = &loaded[0];
        assert_eq!(slug, "broken");
        assert!(result.is_err());
        assert!(loaded[1..].iter().all(|(_, post)| post.is_ok()));
    }

    #[test]
    fn test_missing_title_falls_back_to_slug() {
        let dir = TempDir::new().unwrap();
        write_post(dir.path(), "untitled-note.md", "Just text.\n");
        let site = site(&dir, BuildMode::Production);
        let post = ContentLoader::new(&site)
            .load_by_slug("untitled-note")
            .unwrap()
            .unwrap();
        assert_eq!(post.title, "untitled-note");
        assert_eq!(post.raw(), Some("Just text.\n"));
    }

    #[test]
    fn test_duplicate_slugs_keep_first() {
        let dir = TempDir::new().unwrap();
        write_post(dir.path(), "a.md", "---\nslug: same\ntitle: A\n---\nA");
        write_post(dir.path(), "b.md", "---\nslug: same\ntitle: B\n---\nB");
        let site = site(&dir, BuildMode::Production);
        let loader = ContentLoader::new(&site);
        assert_eq!(loader.list_slugs().unwrap(), vec!["same"]);
        assert_eq!(loader.load_by_slug("same").unwrap().unwrap().title, "A");
    }

    #[test]
    fn test_unusable_explicit_slug_falls_back_to_file_name() {
        let dir = TempDir::new().unwrap();
        write_post(dir.path(), "bangs.md", "---\nslug: \"!!!\"\ntitle: Bangs\n---\nB");
        write_post(dir.path(), "spaced.md", "---\nslug: Hello World\ntitle: S\n---\nS");
        write_post(dir.path(), "!!!.md", "---\ntitle: Nothing usable\n---\nN");
        let site = site(&dir, BuildMode::Production);
        let loader = ContentLoader::new(&site);

        let slugs = loader.list_slugs().unwrap();
        assert_eq!(slugs, vec!["bangs", "hello-world"]);
        for slug in &slugs {
            assert!(loader.load_by_slug(slug).unwrap().is_some(), "{}", slug);
        }
    }

    #[test]
    fn test_missing_posts_dir() {
        let dir = TempDir::new().unwrap();
        let site = site(&dir, BuildMode::Production);
        assert!(ContentLoader::new(&site).list_slugs().unwrap().is_empty());
    }

    #[test]
    fn test_url_safety() {
        assert!(is_url_safe("hello-world_2"));
        assert!(!is_url_safe("a/b"));
        assert!(!is_url_safe(".."));
        assert!(!is_url_safe("héllo"));
    }
}
