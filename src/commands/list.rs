//! List site content

use anyhow::Result;

use crate::content::loader::ContentLoader;
use crate::content::Post;
use crate::Site;

/// One line per post: date, slug, title, and a draft marker
pub fn format_listing(site: &Site, posts: &[Post]) -> Vec<String> {
    posts
        .iter()
        .map(|post| {
            let hidden = post.draft && site.hides_drafts();
            format!(
                "  {} - {} ({}){}",
                post.published.format("%Y-%m-%d"),
                post.slug,
                post.title,
                match (post.draft, hidden) {
                    (true, true) => " [draft, hidden]",
                    (true, false) => " [draft]",
                    _ => "",
                }
            )
        })
        .collect()
}

/// List every post, drafts included, newest first
pub fn run(site: &Site) -> Result<()> {
    let loader = ContentLoader::new(site);

    let mut posts = Vec::new();
    for (slug, post) in loader.load_all()? {
        match post {
            Ok(post) => posts.push(post),
            Err(e) => println!("  {} failed to load: {:#}", slug, e),
        }
    }
    posts.sort_by(|a, b| b.published.cmp(&a.published).then(a.slug.cmp(&b.slug)));

    println!("Posts ({}):", posts.len());
    for line in format_listing(site, &posts) {
        println!("{}", line);
    }

    Ok(())
}
