//! Generate static files

use anyhow::Result;
use notify::Watcher;
use std::sync::mpsc::channel;
use std::time::Duration;

use crate::generator::Generator;
use crate::Site;

/// Generate the static site.
///
/// Every buildable post is written even when some posts fail; the failures
/// are then returned as a single error naming each slug.
pub fn run(site: &Site, force: bool) -> Result<()> {
    let start = std::time::Instant::now();

    if force {
        tracing::info!("Full generation (cache bypassed)");
    }

    let generator = Generator::new(site)?;
    let report = generator.generate(force)?;

    tracing::info!(
        "Generated {} posts, {} drafts hidden ({})",
        report.generated.len(),
        report.hidden.len(),
        report.cache.summary()
    );
    let duration = start.elapsed();
    tracing::info!("Completed in {:.2}s", duration.as_secs_f64());

    if !report.failures.is_empty() {
        let details: Vec<String> = report.failures.iter().map(|e| e.to_string()).collect();
        anyhow::bail!(
            "{} post(s) failed to build: {}\n  {}",
            report.failures.len(),
            report.failed_slugs().join(", "),
            details.join("\n  ")
        );
    }

    Ok(())
}

/// Watch for file changes and regenerate
pub async fn watch(site: &Site) -> Result<()> {
    let (tx, rx) = channel();

    let mut watcher = notify::recommended_watcher(move |res| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;

    for dir in [&site.content_dir, &site.static_dir] {
        if dir.exists() {
            watcher.watch(dir, notify::RecursiveMode::Recursive)?;
        }
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    let site = site.clone();
    tokio::task::spawn_blocking(move || {
        // Debounce: only rebuild if more than 500ms since last rebuild
        let mut last_rebuild = std::time::Instant::now();

        loop {
            match rx.recv_timeout(Duration::from_millis(100)) {
                Ok(_event) => {
                    if last_rebuild.elapsed() > Duration::from_millis(500) {
                        tracing::info!("File changed, regenerating...");
                        if let Err(e) = run(&site, false) {
                            tracing::error!("Generation failed: {:#}", e);
                        }
                        last_rebuild = std::time::Instant::now();
                    }
                }
                Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {}
                Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }
    })
    .await?;

    drop(watcher);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BuildMode, HighlightThemes, SiteConfig};
    use std::fs;
    use tempfile::TempDir;

    fn write_post(dir: &TempDir, name: &str, content: &str) {
        let posts = dir.path().join("content").join("posts");
        fs::create_dir_all(&posts).unwrap();
        fs::write(posts.join(name), content).unwrap();
    }

    #[test]
    fn test_run_succeeds() {
        let dir = TempDir::new().unwrap();
        write_post(&dir, "a.md", "---\ntitle: A\npublishedDate: 2024-01-01\n---\nA\n");
        let site = Site::with_config(dir.path(), SiteConfig::default(), BuildMode::Production);

        run(&site, false).unwrap();
        assert!(site.public_dir.join("posts/a/index.html").exists());
    }

    #[test]
    fn test_run_reports_failing_slugs() {
        let dir = TempDir::new().unwrap();
        write_post(&dir, "good.md", "---\ntitle: Good\npublishedDate: 2024-01-01\n---\nA\n");
        write_post(&dir, "bad.md", "---\ntitle: [bad\n---\nB\n");
        let site = Site::with_config(dir.path(), SiteConfig::default(), BuildMode::Production);

        let err = run(&site, false).unwrap_err().to_string();
        assert!(err.contains("bad"));
        assert!(err.contains("1 post(s) failed"));
        assert!(site.public_dir.join("posts/good/index.html").exists());
    }

    #[test]
    fn test_run_fails_on_unknown_theme() {
        let dir = TempDir::new().unwrap();
        write_post(&dir, "a.md", "---\ntitle: A\n---\nA\n");
        let config = SiteConfig {
            highlight: HighlightThemes {
                dark: "github-dark".to_string(),
                light: "missing".to_string(),
            },
            ..Default::default()
        };
        let site = Site::with_config(dir.path(), config, BuildMode::Production);

        let err = run(&site, true).unwrap_err().to_string();
        assert!(err.contains("unknown highlight theme `missing`"));
    }
}
