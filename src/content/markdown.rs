//! Markdown transformation: typography pass, then dual-theme syntax highlighting
//!
//! The output is a [`SerializedDocument`], the build-time form of a post body
//! that templates embed verbatim.

use lazy_static::lazy_static;
use pulldown_cmark::{
    html, CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd,
    TextMergeStream,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;
use thiserror::Error;

use super::typography::{Typographer, TypographyError};
use crate::cache;
use crate::config::{HighlightThemes, SiteConfig};
use crate::helpers::escape_html;

/// Plugin settings applied by [`MarkdownRenderer::serialize`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Locale for typography rules, e.g. `en-US`
    pub locale: String,
    pub highlight_themes: HighlightThemes,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            locale: "en-US".to_string(),
            highlight_themes: HighlightThemes::default(),
        }
    }
}

impl PluginConfig {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            locale: config.typography_locale.clone(),
            highlight_themes: config.highlight.clone(),
        }
    }
}

/// Heading found in a document, used for anchors and outlines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub level: u8,
    pub id: String,
    pub text: String,
}

/// Rendered form of a markdown body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedDocument {
    pub html: String,
    pub headings: Vec<Heading>,
    pub word_count: usize,
    /// Hash of the raw source and plugin settings that produced this document
    pub content_hash: String,
}

/// A failed transformation pass
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("typography pass failed: {0}")]
    Typography(#[from] TypographyError),

    #[error("unknown highlight theme `{0}`")]
    UnknownTheme(String),

    #[error("highlighting `{lang}` code failed: {message}")]
    Highlight { lang: String, message: String },
}

/// Aliases for theme names that syntect does not bundle
const THEME_ALIASES: &[(&str, &str)] = &[
    ("github-dark", "base16-ocean.dark"),
    ("github-light", "InspiredGitHub"),
    ("one-dark-pro", "base16-eighties.dark"),
    ("solarized-dark", "Solarized (dark)"),
    ("solarized-light", "Solarized (light)"),
];

/// Markdown renderer with typography and syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    /// Serialize raw markdown into a renderable document
    pub fn serialize(
        &self,
        raw: &str,
        plugins: &PluginConfig,
    ) -> Result<SerializedDocument, TransformError> {
        let light = self.resolve_theme(&plugins.highlight_themes.light)?;
        let dark = self.resolve_theme(&plugins.highlight_themes.dark)?;
        let typographer = Typographer::for_locale(&plugins.locale)?;

        let source = strip_mdx_esm(raw);
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_GFM
            | Options::ENABLE_SMART_PUNCTUATION;
        let parser = TextMergeStream::new(Parser::new_ext(&source, options));

        let mut events: Vec<Event> = Vec::new();
        let mut code_block: Option<(Option<String>, String)> = None;
        let mut heading: Option<HeadingBuffer> = None;
        let mut headings = Vec::new();
        let mut used_ids: HashMap<String, usize> = HashMap::new();
        let mut word_count = 0;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => code_language(&info),
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some((lang, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, code)) = code_block.take() {
                        let html = self.highlight_code(&code, lang.as_deref(), light, dark)?;
                        events.push(Event::Html(CowStr::from(html)));
                    }
                }
                Event::Text(text) if code_block.is_some() => {
                    if let Some((_, code)) = code_block.as_mut() {
                        code.push_str(&text);
                    }
                }
                Event::Start(Tag::Heading {
                    level,
                    id,
                    classes,
                    attrs,
                }) => {
                    heading = Some(HeadingBuffer {
                        level,
                        id: id.map(|i| i.to_string()),
                        classes,
                        attrs,
                        text: String::new(),
                        events: Vec::new(),
                    });
                }
                Event::End(TagEnd::Heading(level)) => {
                    if let Some(buffer) = heading.take() {
                        let base = buffer
                            .id
                            .clone()
                            .unwrap_or_else(|| slug::slugify(&buffer.text));
                        let id = unique_id(base, &mut used_ids);
                        headings.push(Heading {
                            level: heading_level(level),
                            id: id.clone(),
                            text: buffer.text.trim().to_string(),
                        });
                        events.push(Event::Start(Tag::Heading {
                            level: buffer.level,
                            id: Some(CowStr::from(id)),
                            classes: buffer.classes,
                            attrs: buffer.attrs,
                        }));
                        events.extend(buffer.events);
                        events.push(Event::End(TagEnd::Heading(level)));
                    }
                }
                Event::Text(text) => {
                    word_count += text.split_whitespace().count();
                    let text = typographer.apply(&text);
                    push_inline(&mut heading, &mut events, Event::Text(CowStr::from(text)));
                }
                Event::Code(code) => {
                    if let Some(buffer) = heading.as_mut() {
                        buffer.text.push_str(&code);
                    }
                    push_inline(&mut heading, &mut events, Event::Code(code));
                }
                other => push_inline(&mut heading, &mut events, other),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(SerializedDocument {
            html: html_output,
            headings,
            word_count,
            content_hash: cache::document_key(raw, plugins),
        })
    }

    fn resolve_theme(&self, name: &str) -> Result<&Theme, TransformError> {
        if let Some(theme) = self.theme_set.themes.get(name) {
            return Ok(theme);
        }
        THEME_ALIASES
            .iter()
            .find(|(alias, _)| *alias == name)
            .and_then(|(_, bundled)| self.theme_set.themes.get(*bundled))
            .ok_or_else(|| TransformError::UnknownTheme(name.to_string()))
    }

    /// Highlight a code block once per theme; CSS shows the one matching the page theme
    fn highlight_code(
        &self,
        code: &str,
        lang: Option<&str>,
        light: &Theme,
        dark: &Theme,
    ) -> Result<String, TransformError> {
        let lang = lang.unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let mut figure = format!(
            r#"<figure data-code-block data-language="{}">"#,
            escape_html(lang)
        );
        for (variant, theme) in [("light", light), ("dark", dark)] {
            let highlighted = highlighted_html_for_string(code, &self.syntax_set, syntax, theme)
                .map_err(|e| TransformError::Highlight {
                    lang: lang.to_string(),
                    message: e.to_string(),
                })?;
            figure.push_str(&highlighted.replacen(
                "<pre",
                &format!(r#"<pre data-theme="{}""#, variant),
                1,
            ));
        }
        figure.push_str("</figure>\n");

        Ok(figure)
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

struct HeadingBuffer<'a> {
    level: HeadingLevel,
    id: Option<String>,
    classes: Vec<CowStr<'a>>,
    attrs: Vec<(CowStr<'a>, Option<CowStr<'a>>)>,
    text: String,
    events: Vec<Event<'a>>,
}

fn push_inline<'a>(
    heading: &mut Option<HeadingBuffer<'a>>,
    events: &mut Vec<Event<'a>>,
    event: Event<'a>,
) {
    match heading.as_mut() {
        Some(buffer) => {
            if let Event::Text(text) = &event {
                buffer.text.push_str(text);
            }
            buffer.events.push(event);
        }
        None => events.push(event),
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn unique_id(base: String, used: &mut HashMap<String, usize>) -> String {
    let base = if base.is_empty() {
        "section".to_string()
    } else {
        base
    };
    let count = used.entry(base.clone()).or_insert(0);
    *count += 1;
    if *count == 1 {
        base
    } else {
        format!("{}-{}", base, *count - 1)
    }
}

/// `ts {1,3}` or `rust,ignore` -> language token
fn code_language(info: &str) -> Option<String> {
    info.split(|c: char| c.is_whitespace() || c == ',' || c == '{')
        .next()
        .filter(|lang| !lang.is_empty())
        .map(str::to_string)
}

lazy_static! {
    static ref MDX_ESM: Regex = Regex::new(
        r#"^(?:import\s+(?:[\w$*{][^'"]*\s+from\s+)?['"]|export\s+(?:default\b|const\b|let\b|var\b|function\b|class\b|\{|\*))"#
    )
    .unwrap();
}

/// Drop top-level MDX `import`/`export` statements, leaving fenced code alone
fn strip_mdx_esm(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut fence: Option<&str> = None;

    for line in raw.lines() {
        let trimmed = line.trim_start();
        match fence {
            Some(marker) => {
                if trimmed.starts_with(marker) {
                    fence = None;
                }
            }
            None => {
                if trimmed.starts_with("```") {
                    fence = Some("```");
                } else if trimmed.starts_with("~~~") {
                    fence = Some("~~~");
                } else if MDX_ESM.is_match(line) {
                    continue;
                }
            }
        }
        out.push_str(line);
        out.push('\n');
    }

    out
}
