//! Machine-readable outputs: RSS feed, sitemap and robots.txt

use rss::{ChannelBuilder, GuidBuilder, ItemBuilder};
use std::fmt::Write;

use crate::config::SiteConfig;
use crate::content::Post;
use crate::helpers::{date_iso, date_rfc2822, full_url_for, strip_html};

/// Output path of the feed, relative to the public directory
pub const RSS_PATH: &str = "posts/rss";

/// Length of generated item descriptions, in characters
const EXCERPT_CHARS: usize = 200;

/// RSS 2.0 feed of the newest posts. `posts` must be sorted newest first.
pub fn build_rss(config: &SiteConfig, posts: &[Post]) -> String {
    let items: Vec<_> = posts
        .iter()
        .take(config.rss_limit)
        .map(|post| {
            let link = full_url_for(config, &post.route());
            ItemBuilder::default()
                .title(post.title.clone())
                .link(Some(link.clone()))
                .guid(GuidBuilder::default().permalink(true).value(link).build())
                .description(item_description(post))
                .pub_date(date_rfc2822(&post.published))
                .build()
        })
        .collect();

    let channel = ChannelBuilder::default()
        .title(&config.title)
        .link(full_url_for(config, "/"))
        .description(&config.site_description)
        .language(Some(config.locale.replace('_', "-").to_lowercase()))
        .generator(Some(format!("folio-rs {}", env!("CARGO_PKG_VERSION"))))
        .items(items)
        .build();

    channel.to_string()
}

/// Sitemap listing the home page and every post
pub fn build_sitemap(config: &SiteConfig, posts: &[Post]) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
    xml.push('\n');

    let _ = writeln!(
        xml,
        "  <url><loc>{}</loc></url>",
        escape_xml(&full_url_for(config, "/"))
    );
    for post in posts {
        let _ = writeln!(
            xml,
            "  <url><loc>{}</loc><lastmod>{}</lastmod></url>",
            escape_xml(&full_url_for(config, &post.route())),
            date_iso(&post.published)
        );
    }

    xml.push_str("</urlset>\n");
    xml
}

/// robots.txt allowing everything but the configured paths
pub fn build_robots(config: &SiteConfig) -> String {
    let mut robots = String::from("User-agent: *\nAllow: /\n");
    for path in &config.robots_disallow {
        let _ = writeln!(robots, "Disallow: {}", path);
    }
    let _ = writeln!(robots, "\nSitemap: {}", full_url_for(config, "/sitemap.xml"));
    robots
}

/// The post's meta description, else an excerpt of its body
fn item_description(post: &Post) -> Option<String> {
    post.meta_description.clone().or_else(|| {
        let text = strip_html(&post.document()?.html);
        let excerpt = excerpt(&text, EXCERPT_CHARS);
        (!excerpt.is_empty()).then_some(excerpt)
    })
}

/// Whitespace-collapsed prefix of `text`, cut at a word boundary
fn excerpt(text: &str, max_chars: usize) -> String {
    let mut out = String::new();
    for word in text.split_whitespace() {
        let needed = word.chars().count() + usize::from(!out.is_empty());
        if out.chars().count() + needed > max_chars {
            out.push('…');
            return out;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::SerializedDocument;
    use chrono::NaiveDate;

    fn config() -> SiteConfig {
        SiteConfig {
            url: "https://example.com".to_string(),
            title: "Example".to_string(),
            rss_limit: 2,
            ..Default::default()
        }
    }

    fn posts() -> Vec<Post> {
        (1..=3)
            .rev()
            .map(|day| {
                let mut post = Post::new(
                    format!("post-{}", day),
                    format!("Post {}", day),
                    NaiveDate::from_ymd_opt(2024, 2, day).unwrap(),
                );
                post.meta_description = Some(format!("About post {}", day));
                post
            })
            .collect()
    }

    #[test]
    fn test_rss_contains_newest_posts_up_to_limit() {
        let xml = build_rss(&config(), &posts());

        assert!(xml.contains("<title>Example</title>"));
        assert!(xml.contains("<link>https://example.com/posts/post-3</link>"));
        assert!(xml.contains("<link>https://example.com/posts/post-2</link>"));
        assert!(!xml.contains("post-1</link>"));
        assert!(xml.contains("About post 3"));
        assert!(!xml.contains("About post 1"));
        assert!(xml.contains("<language>en-us</language>"));
    }

    #[test]
    fn test_description_falls_back_to_excerpt() {
        let mut post = Post::new("p", "P", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(item_description(&post), None);

        let document = SerializedDocument {
            html: "<p>First   paragraph.</p>\n<p>Second <em>one</em>.</p>".to_string(),
            ..Default::default()
        };
        post = post.with_document(document, 200);
        assert_eq!(
            item_description(&post).as_deref(),
            Some("First paragraph. Second one.")
        );
    }

    #[test]
    fn test_excerpt_cuts_at_word_boundary() {
        assert_eq!(excerpt("alpha beta gamma", 10), "alpha beta…");
        assert_eq!(excerpt("alpha beta", 10), "alpha beta");
    }

    #[test]
    fn test_sitemap() {
        let xml = build_sitemap(&config(), &posts());
        assert!(xml.contains("<loc>https://example.com/</loc>"));
        assert!(xml.contains(
            "<loc>https://example.com/posts/post-1</loc><lastmod>2024-02-01</lastmod>"
        ));
    }

    #[test]
    fn test_robots() {
        let robots = build_robots(&config());
        assert!(robots.starts_with("User-agent: *\nAllow: /\n"));
        assert!(robots.contains("Disallow: /login\n"));
        assert!(robots.contains("Sitemap: https://example.com/sitemap.xml"));
    }
}
