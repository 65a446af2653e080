//! Profile page.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tracing::{debug, instrument};

use nijitter_core::Handle;
use nijitter_core::media::{DEFAULT_ICON, resolve_image_url};

use super::Shell;
use crate::db::{ProfileRow, RepositoryError, UserRepository};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "user.html")]
pub struct UserTemplate {
    pub shell: Shell,
    pub username: String,
    pub handle: Handle,
    pub icon_src: String,
    pub bio: Option<String>,
    pub status_message: Option<String>,
    pub joined: String,
}

impl UserTemplate {
    fn new(shell: Shell, profile: ProfileRow) -> Self {
        let image_base = (!shell.image_url.is_empty()).then_some(shell.image_url.as_str());
        let icon_src = profile
            .icon_path
            .as_deref()
            .and_then(|path| resolve_image_url(path, image_base))
            .unwrap_or_else(|| DEFAULT_ICON.to_string());
        let joined = profile.joined();

        Self {
            username: profile.username,
            handle: profile.user_id,
            icon_src,
            bio: profile.bio.filter(|b| !b.trim().is_empty()),
            status_message: profile.status_message.filter(|s| !s.trim().is_empty()),
            joined,
            shell,
        }
    }
}

fn user_not_found() -> AppError {
    AppError::NotFound("user".to_string())
}

/// Display a user's profile page.
///
/// Lookups are cached for a minute.
///
/// # Errors
///
/// Returns 404 JSON if no user has this handle and 500 JSON if the
/// database query fails.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<UserTemplate> {
    let handle = Handle::parse(&id).map_err(|_| user_not_found())?;

    let profile = if let Some(profile) = state.profiles().get(handle.as_str()).await {
        debug!("Profile served from cache");
        profile
    } else {
        let profile = UserRepository::new(state.pool())
            .get_profile(&handle)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => user_not_found(),
                other => AppError::Database(other),
            })?;
        state
            .profiles()
            .insert(handle.as_str().to_owned(), profile.clone())
            .await;
        profile
    };

    Ok(UserTemplate::new(Shell::from_state(&state), profile))
}
