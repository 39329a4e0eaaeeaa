//! Live preview server: serves the rendered HTML and regenerates it whenever
//! the source YAML file changes on disk.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use axum::extract::State;
use axum::http::{header, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use chrono::{SecondsFormat, Utc};
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::errors::AppError;
use crate::render::Generator;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Injected before `</body>` so the browser reloads when the reload token
/// returned by `/_reload` changes.
const LIVE_RELOAD_SCRIPT: &str = r#"<script>
(function() {
    let lastModified = '';
    setInterval(function() {
        fetch('/_reload')
            .then(r => r.text())
            .then(t => {
                if (lastModified && lastModified !== t) {
                    location.reload();
                }
                lastModified = t;
            })
            .catch(() => {});
    }, 500);
})();
</script>"#;

struct PreviewState {
    data_path: PathBuf,
    output_dir: PathBuf,
    theme: String,
    color: String,
    // Last-regeneration token; readers (HTTP handlers) take the read side,
    // regeneration takes the write side.
    last_regen: RwLock<String>,
}

impl PreviewState {
    fn html_path(&self) -> PathBuf {
        self.output_dir.join("cv.html")
    }

    /// Reloads the source file, re-renders the HTML and advances the reload
    /// token. A failure leaves the previously rendered output untouched.
    async fn regenerate(&self) -> Result<(), AppError> {
        let generator = Generator::from_file(&self.data_path, &self.theme, &self.color)?;
        generator.generate_html(&self.html_path())?;

        let mut last_regen = self.last_regen.write().await;
        *last_regen = Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true);
        Ok(())
    }
}

/// Runs the preview server until interrupted.
pub async fn run(
    data_path: &Path,
    output_dir: &Path,
    theme: &str,
    color: &str,
    port: u16,
) -> Result<(), AppError> {
    if !data_path.exists() {
        return Err(AppError::FileNotFound(data_path.display().to_string()));
    }
    std::fs::create_dir_all(output_dir)?;

    let state = Arc::new(PreviewState {
        data_path: data_path.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        theme: theme.to_string(),
        color: color.to_string(),
        last_regen: RwLock::new(String::new()),
    });

    info!("generating initial preview");
    state.regenerate().await?;

    tokio::spawn(watch_file(Arc::clone(&state)));

    let app = Router::new()
        .route("/_reload", get(handle_reload))
        .fallback(get(handle_any))
        .with_state(Arc::clone(&state))
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!(url = %format!("http://localhost:{port}"), "preview server listening");
    info!(file = %data_path.display(), "watching for changes");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Polls the source file's mtime and regenerates on change. Regeneration
/// errors are logged and the last good output keeps being served.
async fn watch_file(state: Arc<PreviewState>) {
    let mut last_seen: Option<SystemTime> = None;
    let mut ticker = tokio::time::interval(POLL_INTERVAL);

    loop {
        ticker.tick().await;

        let Ok(modified) = std::fs::metadata(&state.data_path).and_then(|m| m.modified()) else {
            continue;
        };

        if last_seen.is_some_and(|seen| modified <= seen) {
            continue;
        }
        let first_pass = last_seen.is_none();
        last_seen = Some(modified);
        if first_pass {
            // Initial generation already happened before the server started.
            continue;
        }

        info!(file = %state.data_path.display(), "file changed, regenerating");
        match state.regenerate().await {
            Ok(()) => info!("preview regenerated"),
            Err(e) => error!("regeneration failed: {e}"),
        }
    }
}

async fn handle_reload(State(state): State<Arc<PreviewState>>) -> Response {
    let last_regen = state.last_regen.read().await;
    ([(header::CONTENT_TYPE, "text/plain")], last_regen.clone()).into_response()
}

/// Serves the rendered document at `/`, static assets (photos etc.) from the
/// output directory, and falls back to the document for anything else.
async fn handle_any(
    State(state): State<Arc<PreviewState>>,
    uri: Uri,
) -> Result<Response, AppError> {
    let path = uri.path();
    if path != "/" {
        if let Some(candidate) = resolve_static_path(&state.output_dir, path) {
            if candidate.is_file() {
                return serve_static(&candidate).await;
            }
        }
    }
    serve_document(&state).await
}

/// Maps a request path to a file under the output directory. The raw path is
/// not normalized by the router, so anything but plain name components
/// (`..`, `.`, root or prefix segments) is rejected outright rather than
/// joined, keeping lookups confined to the output directory.
fn resolve_static_path(output_dir: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = Path::new(request_path.trim_start_matches('/'));
    if relative
        .components()
        .all(|c| matches!(c, std::path::Component::Normal(_)))
    {
        Some(output_dir.join(relative))
    } else {
        None
    }
}

async fn serve_document(state: &PreviewState) -> Result<Response, AppError> {
    let html_path = state.html_path();
    let html = tokio::fs::read_to_string(&html_path)
        .await
        .map_err(|_| AppError::FileNotFound(html_path.display().to_string()))?;
    Ok(Html(inject_live_reload(&html)).into_response())
}

async fn serve_static(path: &Path) -> Result<Response, AppError> {
    let bytes = tokio::fs::read(path).await?;
    Ok(([(header::CONTENT_TYPE, content_type_for(path))], bytes).into_response())
}

fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

fn inject_live_reload(html: &str) -> String {
    match html.rfind("</body>") {
        Some(idx) => format!(
            "{}{}\n{}",
            &html[..idx],
            LIVE_RELOAD_SCRIPT,
            &html[idx..]
        ),
        None => format!("{html}{LIVE_RELOAD_SCRIPT}"),
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down preview server");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_before_body_close() {
        let html = "<html><body><p>hi</p></body></html>";
        let injected = inject_live_reload(html);
        let script_at = injected.find("<script>").unwrap();
        let body_at = injected.find("</body>").unwrap();
        assert!(script_at < body_at);
        assert!(injected.ends_with("</body></html>"));
    }

    #[test]
    fn test_inject_appends_without_body_close() {
        let injected = inject_live_reload("<p>fragment</p>");
        assert!(injected.starts_with("<p>fragment</p><script>"));
    }

    #[test]
    fn test_resolve_static_path_plain_components() {
        let out = Path::new("/srv/output");
        assert_eq!(
            resolve_static_path(out, "/photo.jpg"),
            Some(out.join("photo.jpg"))
        );
        assert_eq!(
            resolve_static_path(out, "/img/photo.jpg"),
            Some(out.join("img/photo.jpg"))
        );
    }

    #[test]
    fn test_resolve_static_path_rejects_traversal() {
        let out = Path::new("/srv/output");
        assert_eq!(resolve_static_path(out, "/../../../../etc/passwd"), None);
        assert_eq!(resolve_static_path(out, "/img/../../secret"), None);
        assert_eq!(resolve_static_path(out, "/./photo.jpg"), None);
    }

    #[test]
    fn test_content_type_lookup() {
        assert_eq!(content_type_for(Path::new("photo.jpg")), "image/jpeg");
        assert_eq!(
            content_type_for(Path::new("cv.html")),
            "text/html; charset=utf-8"
        );
        assert_eq!(
            content_type_for(Path::new("unknown.bin")),
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn test_regenerate_advances_token_once() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("cv.yaml");
        std::fs::write(&data, "personal:\n  firstName: Ada\n").unwrap();

        let state = PreviewState {
            data_path: data,
            output_dir: dir.path().join("output"),
            theme: "modern".into(),
            color: String::new(),
            last_regen: RwLock::new(String::new()),
        };

        state.regenerate().await.unwrap();
        let first = state.last_regen.read().await.clone();
        assert!(!first.is_empty());
        assert!(state.html_path().is_file());

        state.regenerate().await.unwrap();
        let second = state.last_regen.read().await.clone();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_regenerate_failure_keeps_last_output() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("cv.yaml");
        std::fs::write(&data, "personal:\n  firstName: Ada\n").unwrap();

        let state = PreviewState {
            data_path: data.clone(),
            output_dir: dir.path().join("output"),
            theme: "modern".into(),
            color: String::new(),
            last_regen: RwLock::new(String::new()),
        };
        state.regenerate().await.unwrap();
        let good = std::fs::read_to_string(state.html_path()).unwrap();

        std::fs::remove_file(&data).unwrap();
        assert!(state.regenerate().await.is_err());
        assert_eq!(std::fs::read_to_string(state.html_path()).unwrap(), good);
    }
}
