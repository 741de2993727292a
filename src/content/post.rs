//! Post model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::markdown::SerializedDocument;

/// Cover image variants of a post
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Covers {
    /// Generic cover, used when no themed variant exists
    pub default: Option<String>,
    pub light: Option<String>,
    pub dark: Option<String>,
}

impl Covers {
    pub fn is_empty(&self) -> bool {
        self.default.is_none() && self.light.is_none() && self.dark.is_none()
    }

    /// Light-first precedence, independent of the active theme
    pub fn light_first(&self) -> Option<&str> {
        self.light
            .as_deref()
            .or(self.dark.as_deref())
            .or(self.default.as_deref())
    }

    pub fn dark_first(&self) -> Option<&str> {
        self.dark
            .as_deref()
            .or(self.light.as_deref())
            .or(self.default.as_deref())
    }
}

/// Body of a post before and after transformation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum PostBody {
    Raw(String),
    Serialized(SerializedDocument),
}

/// A blog post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// URL-safe identifier
    pub slug: String,

    pub title: String,

    pub meta_description: Option<String>,

    pub published: NaiveDate,

    pub covers: Covers,

    pub cover_alt: Option<String>,

    pub draft: bool,

    pub body: PostBody,

    /// Minutes, from front-matter or estimated from the word count
    pub reading_time: Option<u32>,

    /// Source file path
    pub source: PathBuf,
}

impl Post {
    /// Create a post with a raw body and no optional metadata
    pub fn new(slug: impl Into<String>, title: impl Into<String>, published: NaiveDate) -> Self {
        Self {
            slug: slug.into(),
            title: title.into(),
            meta_description: None,
            published,
            covers: Covers::default(),
            cover_alt: None,
            draft: false,
            body: PostBody::Raw(String::new()),
            reading_time: None,
            source: PathBuf::new(),
        }
    }

    /// Raw markdown, if the body has not been serialized yet
    pub fn raw(&self) -> Option<&str> {
        match &self.body {
            PostBody::Raw(raw) => Some(raw),
            PostBody::Serialized(_) => None,
        }
    }

    pub fn document(&self) -> Option<&SerializedDocument> {
        match &self.body {
            PostBody::Serialized(doc) => Some(doc),
            PostBody::Raw(_) => None,
        }
    }

    /// Replace the raw body with its serialized form, filling in the reading time
    pub fn with_document(mut self, document: SerializedDocument, words_per_minute: usize) -> Self {
        if self.reading_time.is_none() {
            self.reading_time = Some(estimate_reading_time(document.word_count, words_per_minute));
        }
        self.body = PostBody::Serialized(document);
        self
    }

    /// Site-relative route of the post page
    pub fn route(&self) -> String {
        format!("/posts/{}", self.slug)
    }

    /// Alt text for the cover image
    pub fn cover_alt_text(&self) -> String {
        self.cover_alt
            .clone()
            .unwrap_or_else(|| format!("Cover image for post: {}", self.title))
    }
}

/// Minutes to read `words`, never less than one
pub fn estimate_reading_time(words: usize, words_per_minute: usize) -> u32 {
    let wpm = words_per_minute.max(1);
    words.div_ceil(wpm).max(1) as u32
}
