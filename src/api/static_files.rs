use axum::{
    body::Body,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use mime_guess::from_path;
use rust_embed::RustEmbed;
use std::path::{Component, Path, PathBuf};

#[derive(RustEmbed)]
#[folder = "frontend/dist"]
pub struct Assets;

const INDEX: &str = "index.html";

/// Serve static files from the configured directory, then embedded assets
pub async fn serve_static(uri: Uri, static_dir: Option<String>) -> Response {
    let path = uri.path().trim_start_matches('/');
    let path = if path.is_empty() { INDEX } else { path };

    if !is_safe_relative(path) {
        return not_found();
    }

    if let Some(ref dir) = static_dir {
        let file_path = PathBuf::from(dir).join(path);
        if let Ok(content) = tokio::fs::read(&file_path).await {
            return file_response(&file_path, Body::from(content));
        }
    }

    serve_embedded(path)
}

fn serve_embedded(path: &str) -> Response {
    match Assets::get(path) {
        Some(content) => file_response(Path::new(path), Body::from(content.data)),
        None => not_found(),
    }
}

fn file_response(path: &Path, body: Body) -> Response {
    let mime = from_path(path).first_or_octet_stream();
    ([(header::CONTENT_TYPE, mime.to_string())], body).into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "404 Not Found").into_response()
}

// Rejects `..`, absolute paths and drive prefixes.
fn is_safe_relative(path: &str) -> bool {
    Path::new(path)
        .components()
        .all(|component| matches!(component, Component::Normal(_)))
}
