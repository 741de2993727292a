//! SEO metadata: per-page descriptors merged over site defaults, and the
//! `<head>` tags rendered from them.

use serde_json::json;
use std::fmt::Write;

use crate::config::{AnalyticsConfig, PersonConfig, SiteConfig, ThemeColorConfig};
use crate::helpers::{escape_html, is_absolute};

/// Site-wide SEO defaults
#[derive(Debug, Clone)]
pub struct SiteDefaults {
    pub title: String,
    pub description: String,
    pub site_name: String,
    pub author: String,
    pub locale: String,
    /// Base URL without a trailing slash
    pub base_url: String,
    /// Absolute URL of the social preview image
    pub social_image: String,
    pub person: PersonConfig,
    pub google_site_verification: Option<String>,
    pub theme_color: ThemeColorConfig,
    pub analytics: Option<AnalyticsConfig>,
}

impl SiteDefaults {
    pub fn from_config(config: &SiteConfig) -> Self {
        let base_url = config.base_url().to_string();
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            site_name: config.title.clone(),
            author: config.author.clone(),
            locale: config.locale.clone(),
            social_image: resolve_image_url(&config.social_image, &base_url),
            base_url,
            person: config.person.clone(),
            google_site_verification: config.google_site_verification.clone(),
            theme_color: config.theme_color.clone(),
            analytics: config.analytics.clone(),
        }
    }

    /// RSS feed URL
    pub fn feed_url(&self) -> String {
        format!("{}/posts/rss", self.base_url)
    }
}

/// Page-supplied SEO fields; each one present replaces the site default
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeoOverrides {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub path: Option<String>,
}

impl SeoOverrides {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }
}

/// Effective metadata of one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeoDescriptor {
    pub title: String,
    pub description: String,
    /// Present only when the page supplied a path
    pub canonical: Option<String>,
    pub image: String,
    pub image_alt: String,
}

/// Shallow, field-by-field merge of page overrides over site defaults
pub fn compose(overrides: &SeoOverrides, defaults: &SiteDefaults) -> SeoDescriptor {
    let title = overrides
        .title
        .clone()
        .unwrap_or_else(|| defaults.title.clone());
    let description = overrides
        .description
        .clone()
        .unwrap_or_else(|| defaults.description.clone());
    let image = overrides
        .image
        .as_deref()
        .map(|img| resolve_image_url(img, &defaults.base_url))
        .unwrap_or_else(|| defaults.social_image.clone());
    let canonical = overrides
        .path
        .as_deref()
        .map(|path| canonical_url(&defaults.base_url, path));

    SeoDescriptor {
        image_alt: title.clone(),
        title,
        description,
        canonical,
        image,
    }
}

/// `/` resolves to the bare base URL, other paths are appended
pub fn canonical_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if path.is_empty() || path == "/" {
        base.to_string()
    } else if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

/// Absolute URLs are kept, relative ones are resolved against the base URL
pub fn resolve_image_url(url: &str, base_url: &str) -> String {
    if is_absolute(url) {
        url.to_string()
    } else {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            url.trim_start_matches('/')
        )
    }
}

/// JSON-LD block describing the site and its author
pub fn structured_data(defaults: &SiteDefaults) -> serde_json::Value {
    let mut person = json!({
        "@context": "http://schema.org",
        "@type": "Person",
        "name": defaults.title,
        "url": defaults.base_url,
        "jobTitle": defaults.person.job_title,
    });
    if let Some(alumni_of) = &defaults.person.alumni_of {
        person["alumniOf"] = json!(alumni_of);
    }
    if let Some(gender) = &defaults.person.gender {
        person["gender"] = json!(gender);
    }
    person["image"] = json!(defaults.social_image);
    person["sameAs"] = json!(defaults.person.same_as);

    json!({
        "@context": "http://schema.org",
        "@type": "WebSite",
        "name": defaults.title,
        "url": defaults.base_url,
        "image": defaults.social_image,
        "author": person,
    })
}

/// Render all head tags for a page
pub fn render_head(seo: &SeoDescriptor, defaults: &SiteDefaults) -> String {
    let mut head = String::new();
    let og_url = seo.canonical.as_deref().unwrap_or(&defaults.base_url);

    let _ = writeln!(head, "<title>{}</title>", escape_html(&seo.title));
    meta_name(&mut head, "description", &seo.description);
    meta_name(&mut head, "robots", "index,follow");
    meta_name(&mut head, "googlebot", "index,follow");

    meta_property(&mut head, "og:type", "website");
    meta_property(&mut head, "og:locale", &defaults.locale);
    meta_property(&mut head, "og:url", og_url);
    meta_property(&mut head, "og:site_name", &defaults.site_name);
    meta_property(&mut head, "og:title", &seo.title);
    meta_property(&mut head, "og:description", &seo.description);
    meta_property(&mut head, "og:image", &seo.image);
    meta_property(&mut head, "og:image:alt", &seo.image_alt);
    meta_name(&mut head, "twitter:card", "summary_large_image");

    head.push_str(r#"<link rel="icon" href="/favicon.ico" sizes="any"/>"#);
    head.push('\n');
    head.push_str(r#"<link rel="icon" href="/favicon.svg" type="image/svg+xml" sizes="any"/>"#);
    head.push('\n');
    head.push_str(r#"<link rel="apple-touch-icon" href="/apple-touch-icon.png"/>"#);
    head.push('\n');

    if let Some(canonical) = &seo.canonical {
        let _ = writeln!(
            head,
            r#"<link rel="canonical" href="{}"/>"#,
            escape_html(canonical)
        );
    }

    // `</` must not terminate the script element early
    let json_ld = structured_data(defaults).to_string().replace("</", "<\\/");
    let _ = writeln!(
        head,
        r#"<script type="application/ld+json">{}</script>"#,
        json_ld
    );

    meta_name(&mut head, "author", &defaults.author);
    let _ = writeln!(
        head,
        r#"<meta name="theme-color" content="{}" media="(prefers-color-scheme: light)"/>"#,
        escape_html(&defaults.theme_color.light)
    );
    let _ = writeln!(
        head,
        r#"<meta name="theme-color" content="{}" media="(prefers-color-scheme: dark)"/>"#,
        escape_html(&defaults.theme_color.dark)
    );
    if let Some(token) = &defaults.google_site_verification {
        meta_name(&mut head, "google-site-verification", token);
    }
    let _ = writeln!(
        head,
        r#"<link rel="alternate" type="application/rss+xml" title="RSS feed" href="{}"/>"#,
        escape_html(&defaults.feed_url())
    );
    if let Some(analytics) = &defaults.analytics {
        let _ = writeln!(
            head,
            r#"<script defer src="{}" data-website-id="{}"></script>"#,
            escape_html(&analytics.script_src),
            escape_html(&analytics.website_id)
        );
    }

    head
}

fn meta_name(head: &mut String, name: &str, content: &str) {
    let _ = writeln!(
        head,
        r#"<meta name="{}" content="{}"/>"#,
        name,
        escape_html(content)
    );
}

fn meta_property(head: &mut String, property: &str, content: &str) {
    let _ = writeln!(
        head,
        r#"<meta property="{}" content="{}"/>"#,
        property,
        escape_html(content)
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> SiteDefaults {
        SiteDefaults::from_config(&SiteConfig::default())
    }

    #[test]
    fn test_page_title_overrides_default() {
        let seo = compose(&SeoOverrides::titled("My Post"), &defaults());
        assert_eq!(seo.title, "My Post");
        assert_eq!(seo.description, "Go Engineer");
    }

    #[test]
    fn test_missing_fields_fall_back() {
        let seo = compose(&SeoOverrides::default(), &defaults());
        assert_eq!(seo.title, "Vladyslav Pavlenko");
        assert_eq!(seo.image, "https://pvlnk.xyz/social.png");
        assert_eq!(seo.canonical, None);
    }

    #[test]
    fn test_image_override_is_resolved() {
        let overrides = SeoOverrides {
            image: Some("covers/a.png".to_string()),
            ..Default::default()
        };
        let seo = compose(&overrides, &defaults());
        assert_eq!(seo.image, "https://pvlnk.xyz/covers/a.png");
        assert_eq!(seo.image_alt, "Vladyslav Pavlenko");
    }

    #[test]
    fn test_canonical_url() {
        assert_eq!(canonical_url("https://pvlnk.xyz", "/"), "https://pvlnk.xyz");
        assert_eq!(canonical_url("https://pvlnk.xyz/", "/"), "https://pvlnk.xyz");
        assert_eq!(
            canonical_url("https://pvlnk.xyz", "/posts/foo"),
            "https://pvlnk.xyz/posts/foo"
        );
        assert_eq!(
            canonical_url("https://pvlnk.xyz", "posts/foo"),
            "https://pvlnk.xyz/posts/foo"
        );
    }

    #[test]
    fn test_resolve_image_url() {
        let base = "https://pvlnk.xyz";
        assert_eq!(
            resolve_image_url("https://cdn.example.com/a.png", base),
            "https://cdn.example.com/a.png"
        );
        assert_eq!(resolve_image_url("/a.png", base), "https://pvlnk.xyz/a.png");
        assert_eq!(resolve_image_url("a.png", base), "https://pvlnk.xyz/a.png");
        assert_eq!(
            resolve_image_url("//cdn.example.com/x.png", base),
            "//cdn.example.com/x.png"
        );
    }

    #[test]
    fn test_structured_data_shape() {
        let data = structured_data(&defaults());
        assert_eq!(data["@type"], "WebSite");
        assert_eq!(data["url"], "https://pvlnk.xyz");
        assert_eq!(data["author"]["@type"], "Person");
        assert_eq!(data["author"]["jobTitle"], "Go Engineer");
        assert_eq!(data["author"]["alumniOf"], "Kyiv National University");
        assert_eq!(
            data["author"]["sameAs"][0],
            "https://www.linkedin.com/in/vladyslavpavlenko"
        );
        let text = data.to_string();
        assert!(text.starts_with(r#"{"@context":"http://schema.org","@type":"WebSite""#));
    }

    #[test]
    fn test_head_contains_static_tags() {
        let overrides = SeoOverrides {
            title: Some("Tom & Jerry".to_string()),
            path: Some("/posts/tom".to_string()),
            ..Default::default()
        };
        let defaults = defaults();
        let head = render_head(&compose(&overrides, &defaults), &defaults);

        assert!(head.contains("<title>Tom &amp; Jerry</title>"));
        assert!(head.contains(r#"<link rel="canonical" href="https://pvlnk.xyz/posts/tom"/>"#));
        assert!(head.contains(r#"<meta property="og:url" content="https://pvlnk.xyz/posts/tom"/>"#));
        assert!(head.contains(
            r##"<meta name="theme-color" content="#DFDFDE" media="(prefers-color-scheme: light)"/>"##
        ));
        assert!(head.contains(
            r##"<meta name="theme-color" content="#000" media="(prefers-color-scheme: dark)"/>"##
        ));
        assert!(head.contains(r#"href="https://pvlnk.xyz/posts/rss""#));
        assert!(head.contains("google-site-verification"));
        assert!(head.contains("application/ld+json"));
        assert!(head.contains(r#"<meta name="author" content="Vladyslav Pavlenko"/>"#));
    }

    #[test]
    fn test_head_without_path_has_no_canonical() {
        let defaults = defaults();
        let head = render_head(&compose(&SeoOverrides::titled("Not found"), &defaults), &defaults);
        assert!(!head.contains("rel=\"canonical\""));
        assert!(head.contains(r#"<meta property="og:url" content="https://pvlnk.xyz"/>"#));
    }
}
