//! Static page shells.
//!
//! These pages render no server-side data beyond the shell attributes; the
//! browser code fills them in.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tracing::instrument;

use nijitter_core::CarrotId;

use super::Shell;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Timeline page.
#[derive(Template, WebTemplate)]
#[template(path = "timeline.html")]
pub struct TimelineTemplate {
    pub shell: Shell,
}

/// Carrot detail page.
#[derive(Template, WebTemplate)]
#[template(path = "carrot.html")]
pub struct CarrotTemplate {
    pub shell: Shell,
    pub carrot_id: CarrotId,
}

/// Standalone composer.
#[derive(Template, WebTemplate)]
#[template(path = "postcarrot.html")]
pub struct PostCarrotTemplate {
    pub shell: Shell,
}

/// Shown while posting is closed for the night.
#[derive(Template, WebTemplate)]
#[template(path = "night.html")]
pub struct NightTemplate {
    pub shell: Shell,
}

/// Login form.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub shell: Shell,
}

/// Generic error page, also rendered by the sign-up gate on refusal.
#[derive(Template, WebTemplate)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub shell: Shell,
}

#[derive(Template, WebTemplate)]
#[template(path = "success.html")]
pub struct SuccessTemplate {
    pub shell: Shell,
}

/// Entry point of the Slack sign-up gate.
#[derive(Template, WebTemplate)]
#[template(path = "slack.html")]
pub struct SlackTemplate {
    pub shell: Shell,
}

#[instrument(skip(state))]
pub async fn timeline(State(state): State<AppState>) -> TimelineTemplate {
    TimelineTemplate {
        shell: Shell::from_state(&state),
    }
}

/// Display the carrot detail page.
///
/// # Errors
///
/// Returns 404 if `id` is not a carrot id.
#[instrument(skip(state))]
pub async fn carrot(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<CarrotTemplate> {
    let carrot_id = id
        .parse::<CarrotId>()
        .map_err(|_| AppError::NotFound("carrot".to_string()))?;

    Ok(CarrotTemplate {
        shell: Shell::from_state(&state),
        carrot_id,
    })
}

#[instrument(skip(state))]
pub async fn post_carrot(State(state): State<AppState>) -> PostCarrotTemplate {
    PostCarrotTemplate {
        shell: Shell::from_state(&state),
    }
}

#[instrument(skip(state))]
pub async fn night(State(state): State<AppState>) -> NightTemplate {
    NightTemplate {
        shell: Shell::from_state(&state),
    }
}

#[instrument(skip(state))]
pub async fn login(State(state): State<AppState>) -> LoginTemplate {
    LoginTemplate {
        shell: Shell::from_state(&state),
    }
}

#[instrument(skip(state))]
pub async fn error(State(state): State<AppState>) -> ErrorTemplate {
    ErrorTemplate {
        shell: Shell::from_state(&state),
    }
}

#[instrument(skip(state))]
pub async fn success(State(state): State<AppState>) -> SuccessTemplate {
    SuccessTemplate {
        shell: Shell::from_state(&state),
    }
}

#[instrument(skip(state))]
pub async fn slack(State(state): State<AppState>) -> SlackTemplate {
    SlackTemplate {
        shell: Shell::from_state(&state),
    }
}
