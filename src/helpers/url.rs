//! URL helper functions

use crate::config::SiteConfig;

/// Site-relative URL with the base path prepended
///
/// # Examples
/// ```ignore
/// url_for(&config, "/pic.png") // -> "/blog/pic.png" with base_path "/blog"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    if is_absolute(path) {
        return path.to_string();
    }

    let root = config.base_path.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Absolute URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/posts/foo") // -> "https://pvlnk.xyz/posts/foo"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    if is_absolute(path) {
        return path.to_string();
    }
    format!("{}{}", config.base_url(), url_for(config, path))
}

/// Whether a URL carries its own scheme
pub fn is_absolute(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://") || url.starts_with("//")
}
