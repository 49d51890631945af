use std::io;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Instant;

use axum::{
    Router,
    handler::HandlerWithoutStateExt,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tokio::{fs, net::TcpSocket};
use tracing::{Level, debug};

use tower_http::{
    services::ServeDir,
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::consts::PORT;
use crate::server_utils::{CustomOnResponse, find_open_port, log_server_start};

const FALLBACK_404: &str = "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Not found</title></head><body><h1>404</h1><p>This page does not exist.</p></body></html>";

/// Answers unknown paths with the site's own `404.html`, if it has one.
async fn not_found_page(dist_dir: &Path) -> Response {
    let content = match fs::read_to_string(dist_dir.join("404.html")).await {
        Ok(custom_content) => custom_content,
        Err(_) => FALLBACK_404.to_string(),
    };

    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        content,
    )
        .into_response()
}

pub async fn start_preview_web_server(dist_dir: PathBuf, host: bool) -> io::Result<()> {
    let start_time = Instant::now();

    // Bind to every interface with --host, localhost otherwise
    let addr = if host {
        IpAddr::from([0, 0, 0, 0])
    } else {
        IpAddr::from([127, 0, 0, 1])
    };

    let port = find_open_port(&addr, PORT).await?;
    let socket = TcpSocket::new_v4()?;
    let _ = socket.set_reuseaddr(true);

    socket.bind(SocketAddr::new(addr, port))?;
    let listener = socket.listen(1024)?;
    let local_addr = listener.local_addr()?;

    debug!("listening on {}", local_addr);

    let router = router(dist_dir);

    log_server_start(start_time, host, local_addr, "Preview");

    axum::serve(listener, router.into_make_service()).await
}

fn router(dist_dir: PathBuf) -> Router {
    let not_found_dir = dist_dir.clone();
    let service = (move || {
        let dist_dir = not_found_dir.clone();
        async move { not_found_page(&dist_dir).await }
    })
    .into_service();
    let serve_dir = ServeDir::new(dist_dir).not_found_service(service);

    Router::new().fallback_service(serve_dir).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_response(CustomOnResponse),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn test_not_found_uses_site_page() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("404.html"), "<h1>Stran ne obstaja</h1>").unwrap();

        let response = not_found_page(dir.path()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"<h1>Stran ne obstaja</h1>");
    }

    #[tokio::test]
    async fn test_not_found_without_site_page() {
        let dir = tempfile::tempdir().unwrap();

        let response = not_found_page(dir.path()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], FALLBACK_404.as_bytes());
    }
}
