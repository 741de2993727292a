//! Create a new post

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::content::loader::is_url_safe;
use crate::content::FrontMatter;
use crate::Site;

/// Scaffold a post file and return its path
pub fn create_post(site: &Site, title: &str, draft: bool, slug: Option<&str>) -> Result<PathBuf> {
    let today = chrono::Local::now().date_naive();

    let slug = match slug {
        Some(slug) if is_url_safe(slug) => slug.to_string(),
        Some(slug) => anyhow::bail!("Slug must be URL-safe: {:?}", slug),
        None => slug::slugify(title),
    };
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a slug from title {:?}", title);
    }

    let target_dir = site.posts_dir();
    fs::create_dir_all(&target_dir)?;
    let file_path = target_dir.join(format!("{}.md", slug));

    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let front_matter = FrontMatter {
        title: Some(title.to_string()),
        meta_description: Some(String::new()),
        published_date: Some(today.format("%Y-%m-%d").to_string()),
        draft,
        ..Default::default()
    };

    let content = format!("{}\n", front_matter.to_block()?);
    fs::write(&file_path, content)?;

    println!("Created: {:?}", file_path);

    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BuildMode, SiteConfig};
    use crate::content::ContentLoader;
    use tempfile::TempDir;

    fn site(dir: &TempDir) -> Site {
        Site::with_config(dir.path(), SiteConfig::default(), BuildMode::Development)
    }

    #[test]
    fn test_create_post_round_trips_through_loader() {
        let dir = TempDir::new().unwrap();
        let site = site(&dir);

        let path = create_post(&site, "Hello, World!", true, None).unwrap();
        assert_eq!(path, site.posts_dir().join("hello-world.md"));

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("---\n"));
        assert!(content.contains("Hello, World!"));
        assert!(content.contains("publishedDate:"));
        assert!(content.contains("draft: true"));

        let post = ContentLoader::new(&site)
            .load_by_slug("hello-world")
            .unwrap()
            .unwrap();
        assert_eq!(post.title, "Hello, World!");
        assert!(post.draft);
        assert_eq!(post.published, chrono::Local::now().date_naive());
    }

    #[test]
    fn test_create_post_with_explicit_slug() {
        let dir = TempDir::new().unwrap();
        let site = site(&dir);
        let path = create_post(&site, "Anything", false, Some("custom-slug")).unwrap();
        assert!(path.ends_with("custom-slug.md"));
        assert!(create_post(&site, "Anything", false, Some("bad/slug")).is_err());
    }

    #[test]
    fn test_create_post_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let site = site(&dir);
        create_post(&site, "Twice", false, None).unwrap();
        assert!(create_post(&site, "Twice", false, None).is_err());
    }
}
