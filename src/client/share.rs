//! Share links for a post

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;

/// Unreserved characters (RFC 3986) stay literal
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// A single share target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareLink {
    pub name: &'static str,
    pub href: String,
}

/// Share targets for a page title and absolute URL
pub fn share_links(title: &str, url: &str) -> Vec<ShareLink> {
    let title = encode(title);
    let url = encode(url);

    vec![
        ShareLink {
            name: "X",
            href: format!("https://x.com/intent/tweet?text={}&url={}", title, url),
        },
        ShareLink {
            name: "LinkedIn",
            href: format!(
                "https://www.linkedin.com/sharing/share-offsite/?url={}",
                url
            ),
        },
        ShareLink {
            name: "Telegram",
            href: format!("https://t.me/share/url?url={}&text={}", url, title),
        },
        ShareLink {
            name: "Email",
            href: format!("mailto:?subject={}&body={}", title, url),
        },
    ]
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}
