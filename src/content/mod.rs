//! Content module - posts, front-matter and markdown transformation

mod frontmatter;
pub mod loader;
mod markdown;
mod post;
mod typography;

pub use frontmatter::{parse_date_string, FrontMatter};
pub use loader::ContentLoader;
pub use markdown::{Heading, MarkdownRenderer, PluginConfig, SerializedDocument, TransformError};
pub use post::{estimate_reading_time, Covers, Post, PostBody};
pub use typography::{Typographer, TypographyError};
