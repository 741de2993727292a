//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

const CONFIG_TEMPLATE: &str = r#"# folio configuration
# Environment overrides: FOLIO_BASE_URL, FOLIO_BASE_PATH, FOLIO_ENV

# Site
title: My Folio
description: Software Engineer
site_description: Notes on engineering, technology, and more
author: John Doe
locale: en_US

# URL
url: https://example.com
base_path: ''
social_image: /social.png
avatar: /pic.png

# Structured data
person:
  job_title: Software Engineer
  alumni_of: ~
  gender: ~
  same_as: []

# Head
google_site_verification: ~
theme_color:
  light: '#DFDFDE'
  dark: '#000'

# Directory
content_dir: content
public_dir: public
static_dir: static

# Writing
render_drafts: false
typography_locale: en-US
highlight:
  dark: github-dark
  light: github-light
date_format: '%B %-d, %Y'
words_per_minute: 200

# Feeds
rss_limit: 20
robots_disallow:
  - /login
"#;

const SAMPLE_POST: &str = r#"Welcome to your new site! This post lives in `content/posts/hello-world.md`.

## Quick Start

### Create a new post

```bash
$ folio new "My New Post"
```

### Run server

```bash
$ folio server
```

### Generate static files

```bash
$ folio generate
```

Files under `static/` are copied to the output as they are.
"#;

/// Initialize a new site in the given directory. Existing files are kept.
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir.join("content/posts"))?;
    fs::create_dir_all(target_dir.join("static"))?;

    write_if_missing(&target_dir.join("_config.yml"), CONFIG_TEMPLATE)?;

    let today = chrono::Local::now().format("%Y-%m-%d");
    let sample_post = format!(
        "---\ntitle: Hello World\nmetaDescription: My first post\npublishedDate: {}\n---\n\n{}",
        today, SAMPLE_POST
    );
    write_if_missing(
        &target_dir.join("content/posts/hello-world.md"),
        &sample_post,
    )?;

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        tracing::warn!("Keeping existing {:?}", path);
        return Ok(());
    }
    fs::write(path, content)?;
    tracing::debug!("Created {:?}", path);
    Ok(())
}
