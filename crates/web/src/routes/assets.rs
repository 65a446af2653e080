//! Static assets.
//!
//! JavaScript and CSS are served with headers that forbid caching so a
//! deploy takes effect on the next page load. Paths that would leave the
//! static root are refused with 400.

use std::path::{Component, Path, PathBuf};

use axum::extract::{Path as UrlPath, Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::{debug, instrument};

use crate::state::AppState;

/// `Cache-Control` sent with JS and CSS.
pub const NO_CACHE: &str = "no-store, no-cache, must-revalidate, max-age=0";

/// Join `requested` onto `root`, refusing anything but plain path segments.
#[must_use]
pub fn resolve(root: &Path, requested: &str) -> Option<PathBuf> {
    let mut resolved = root.to_path_buf();
    for component in Path::new(requested).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(resolved)
}

/// Whether a file must never be cached by the browser.
#[must_use]
pub fn is_uncached(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("js") || ext.eq_ignore_ascii_case("css"))
}

/// Serve a file below the static root.
#[instrument(skip(state, request))]
pub async fn serve(
    State(state): State<AppState>,
    UrlPath(path): UrlPath<String>,
    request: Request,
) -> Response {
    let Some(file) = resolve(&state.config().static_dir, &path) else {
        debug!("Refused path outside static root");
        return StatusCode::BAD_REQUEST.into_response();
    };

    let mut response = match ServeFile::new(&file).oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    };

    if is_uncached(&file) {
        let headers = response.headers_mut();
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_CACHE));
        headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    }

    response
}
