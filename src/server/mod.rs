//! Development server with live reload
//!
//! Post pages and the home page are rendered per request from the content
//! directory, everything else is served from the generated output.

use anyhow::Result;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        Path as UrlPath, State, WebSocketUpgrade,
    },
    http::{header, Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;

use crate::generator::{Generator, RenderedPage, RSS_PATH};
use crate::theme::ThemeState;
use crate::Site;

/// Live reload script injected into HTML pages
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function() {
    var ws = new WebSocket('ws://' + location.host + '/__livereload');
    ws.onmessage = function(msg) {
        if (msg.data === 'reload') {
            location.reload();
        }
    };
    ws.onclose = function() {
        console.log('Live reload disconnected. Attempting to reconnect...');
        setTimeout(function() { location.reload(); }, 1000);
    };
})();
</script>
</body>
"#;

/// Server state
struct ServerState {
    generator: Arc<Generator>,
    public_dir: PathBuf,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

impl ServerState {
    fn html(&self, status: StatusCode, html: String) -> Response {
        let html = if self.live_reload {
            inject_live_reload(&html)
        } else {
            html
        };
        (status, Html(html)).into_response()
    }
}

/// Start the development server
pub async fn start(site: &Site, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    let generator = Arc::new(Generator::new(site)?);

    // Static outputs (stylesheet, assets, feed) are served from disk
    initial_build(generator.clone()).await?;

    let (reload_tx, _) = broadcast::channel::<()>(16);

    let state = Arc::new(ServerState {
        generator: generator.clone(),
        public_dir: site.public_dir.clone(),
        reload_tx: reload_tx.clone(),
        live_reload: watch,
    });

    let app = Router::new()
        .route("/__livereload", get(livereload_handler))
        .route("/", get(index_handler))
        .route("/posts/rss", get(rss_handler))
        .route("/posts/:slug", get(post_handler))
        .route("/posts/:slug/", get(post_handler))
        .fallback(fallback_handler)
        .with_state(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {} ({} mode)", url, site.mode);
    if watch {
        println!("Live reload enabled. Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if watch {
        let watched = vec![site.content_dir.clone(), site.static_dir.clone()];
        let config_path = site.base_dir.join("_config.yml");

        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_reload(watched, config_path, generator, reload_tx) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn initial_build(generator: Arc<Generator>) -> Result<()> {
    let report = tokio::task::spawn_blocking(move || generator.generate(false)).await??;
    for failure in &report.failures {
        tracing::warn!("{}", failure);
    }
    tracing::info!(
        "Built {} posts ({})",
        report.generated.len(),
        report.cache.summary()
    );
    Ok(())
}

/// Watch for file changes, rebuild static outputs and trigger reload
fn watch_and_reload(
    watched: Vec<PathBuf>,
    config_path: PathBuf,
    generator: Arc<Generator>,
    reload_tx: broadcast::Sender<()>,
) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    // Create debouncer to avoid multiple rapid rebuilds
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    for dir in &watched {
        if dir.exists() {
            debouncer.watcher().watch(dir, RecursiveMode::Recursive)?;
            tracing::debug!("Watching: {:?}", dir);
        }
    }

    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
        tracing::debug!("Watching: {:?}", config_path);
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant_events: Vec<_> = events
                    .iter()
                    .filter(|e| is_relevant_change(&e.path))
                    .collect();

                if relevant_events.is_empty() {
                    continue;
                }

                println!();
                for event in &relevant_events {
                    println!("📝 File changed: {}", event.path.display());
                }
                if relevant_events.iter().any(|e| e.path == config_path) {
                    println!("⚠️  _config.yml changed; restart the server to apply it");
                }

                println!("\n🔄 Regenerating...");
                match generator.generate(false) {
                    Ok(report) if report.failures.is_empty() => {
                        println!("✅ Regenerated successfully!");
                        let _ = reload_tx.send(());
                    }
                    Ok(report) => {
                        for failure in &report.failures {
                            println!("❌ {}", failure);
                        }
                        let _ = reload_tx.send(());
                    }
                    Err(e) => {
                        println!("❌ Generation failed: {:#}", e);
                    }
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Editor swap files, VCS metadata and the like
fn is_relevant_change(path: &std::path::Path) -> bool {
    let path_str = path.to_string_lossy();
    !path_str.contains(".git")
        && !path_str.contains(".DS_Store")
        && !path_str.contains(".folio-cache")
        && !path_str.ends_with('~')
        && !path_str.ends_with(".swp")
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

/// Handle WebSocket connection for live reload
async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// Render a post page from the current content
async fn post_handler(
    State(state): State<Arc<ServerState>>,
    UrlPath(slug): UrlPath<String>,
) -> Response {
    let generator = state.generator.clone();
    let rendered = tokio::task::spawn_blocking(move || {
        generator.render_slug(&slug, &ThemeState::server())
    })
    .await;

    match rendered {
        Ok(Ok(RenderedPage::Found(html))) => state.html(StatusCode::OK, html),
        Ok(Ok(RenderedPage::NotFound(html))) => state.html(StatusCode::NOT_FOUND, html),
        Ok(Err(e)) => server_error(e),
        Err(e) => server_error(e.into()),
    }
}

/// Render the home page from the current content
async fn index_handler(State(state): State<Arc<ServerState>>) -> Response {
    let generator = state.generator.clone();
    let rendered =
        tokio::task::spawn_blocking(move || generator.render_index(&ThemeState::server())).await;

    match rendered {
        Ok(Ok(html)) => state.html(StatusCode::OK, html),
        Ok(Err(e)) => server_error(e),
        Err(e) => server_error(e.into()),
    }
}

/// The feed file has no extension, so its content type is set here
async fn rss_handler(State(state): State<Arc<ServerState>>) -> Response {
    match tokio::fs::read_to_string(state.public_dir.join(RSS_PATH)).await {
        Ok(xml) => (
            [(header::CONTENT_TYPE, "application/rss+xml; charset=utf-8")],
            xml,
        )
            .into_response(),
        Err(_) => not_found(&state).await,
    }
}

/// Serve generated files, falling back to the not-found page
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let mut service = ServeDir::new(&state.public_dir).append_index_html_on_directories(true);
    match service.try_call(request).await {
        Ok(response) if response.status() == StatusCode::NOT_FOUND => not_found(&state).await,
        Ok(response) => response.into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

async fn not_found(state: &Arc<ServerState>) -> Response {
    let generator = state.generator.clone();
    let rendered = tokio::task::spawn_blocking(move || {
        generator.pages().render_not_found(&ThemeState::server())
    })
    .await;

    match rendered {
        Ok(Ok(html)) => state.html(StatusCode::NOT_FOUND, html),
        Ok(Err(e)) => server_error(e),
        Err(e) => server_error(e.into()),
    }
}

fn server_error(error: anyhow::Error) -> Response {
    tracing::error!("Render failed: {:#}", error);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Render failed: {:#}", error),
    )
        .into_response()
}

/// Inject live reload script into HTML content
fn inject_live_reload(html: &str) -> String {
    if html.contains("</body>") {
        html.replacen("</body>", LIVE_RELOAD_SCRIPT, 1)
    } else {
        format!("{}{}", html, LIVE_RELOAD_SCRIPT)
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
