use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::Response,
    routing::get,
    Router,
};
use handout_core::{display_name, ShareError};
use tokio_util::io::ReaderStream;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/download/:id", get(download))
        .with_state(state)
}

async fn download(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, (StatusCode, String)> {
    // Lock scope is the lookup only; file I/O happens on the clone.
    let Some(path) = state.registry.resolve(&id) else {
        tracing::debug!(%id, "download for unknown id");
        return Err(map_err(ShareError::UnknownId));
    };

    let meta = match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => meta,
        Ok(_) => {
            tracing::warn!(%id, path = %path.display(), "shared path is no longer a regular file");
            return Err(map_err(ShareError::FileVanished(path)));
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(%id, path = %path.display(), "shared file vanished");
            return Err(map_err(ShareError::FileVanished(path)));
        }
        Err(e) => return Err(map_err(ShareError::Io(e))),
    };

    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(%id, path = %path.display(), "shared file vanished");
            return Err(map_err(ShareError::FileVanished(path)));
        }
        Err(e) => return Err(map_err(ShareError::Io(e))),
    };

    let name = display_name(&path);
    tracing::info!(%id, name = %name, size = meta.len(), "serving download");

    let mut resp = Response::new(Body::from_stream(ReaderStream::new(file)));
    let h = resp.headers_mut();
    h.insert(header::CONTENT_TYPE, content_type_for(&name));
    h.insert(header::CONTENT_LENGTH, HeaderValue::from(meta.len()));
    h.insert(header::CONTENT_DISPOSITION, attachment(&name));
    Ok(resp)
}

fn map_err(e: ShareError) -> (StatusCode, String) {
    use ShareError::*;
    match e {
        UnknownId => (StatusCode::NOT_FOUND, "unknown share id".into()),
        FileVanished(_) => (StatusCode::GONE, "shared file is no longer available".into()),
        NotAFile(p) => (StatusCode::BAD_REQUEST, format!("not a file: {}", p.display())),
        Io(err) => (StatusCode::INTERNAL_SERVER_ERROR, format!("io: {err}")),
    }
}

/// Content type guessed from the file extension. Anything unrecognized is
/// served as an opaque byte stream.
fn content_type_for(name: &str) -> HeaderValue {
    let ext = name.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase());
    let mime = match ext.as_deref() {
        Some("txt") | Some("md") | Some("log") => "text/plain",
        Some("html") | Some("htm") => "text/html",
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("json") => "application/json",
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("mp3") => "audio/mpeg",
        Some("mp4") => "video/mp4",
        Some("zip") => "application/zip",
        _ => "application/octet-stream",
    };
    HeaderValue::from_static(mime)
}

/// `Content-Disposition` value carrying the file name hint. Names that
/// cannot be represented in a header fall back to a bare attachment.
fn attachment(name: &str) -> HeaderValue {
    let safe: String = name
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            c => c,
        })
        .collect();
    HeaderValue::from_str(&format!("attachment; filename=\"{safe}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}
