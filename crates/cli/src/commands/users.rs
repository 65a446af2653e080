//! Follows and profile management.

use std::path::PathBuf;

use nijitter_client::Upload;
use nijitter_core::{Handle, ProfileUpdate};

use super::Context;
use crate::render::{format_profile, line, status};

/// Follow (`follow = true`) or unfollow a user.
///
/// # Errors
///
/// Returns an error if a request fails.
pub async fn follow(ctx: &Context, handle: &Handle, follow: bool) -> Result<(), Box<dyn std::error::Error>> {
    let page = ctx.api.get_user(handle, None).await?;
    if page.user.followed_by_viewer() == follow {
        line(if follow { "Already following" } else { "Not following" });
        return Ok(());
    }

    let reloaded = ctx.api.toggle_follow(&page.user).await?;
    line(&format_profile(&reloaded.user));
    Ok(())
}

/// Show the signed-in user's profile.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn me(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let me = ctx.api.get_me().await?;
    line(&format_profile(&me));
    Ok(())
}

/// Update profile fields; only the given ones are sent.
///
/// # Errors
///
/// Returns an error if the icon cannot be read or a request fails.
pub async fn edit_profile(
    ctx: &Context,
    username: Option<String>,
    bio: Option<String>,
    status_message: Option<String>,
    icon: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let me = ctx.api.get_me().await?;

    let trimmed = |v: Option<String>| v.map(|s| s.trim().to_owned());
    let update = ProfileUpdate {
        username: trimmed(username),
        icon_path: None,
        bio: trimmed(bio),
        status_message: trimmed(status_message),
    };

    let icon = match icon {
        Some(path) => Some(Upload::from_path(&path).await?),
        None => None,
    };

    if update.is_empty() && icon.is_none() {
        status("Nothing to update.");
        return Ok(());
    }

    let profile = ctx.api.save_profile(&me.handle, &update, icon).await?;
    line(&format_profile(&profile));
    Ok(())
}

/// Delete the signed-in user's account.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn delete_account(ctx: &Context, confirmed: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !confirmed {
        status("This deletes your account and all carrots. Re-run with --yes to confirm.");
        return Ok(());
    }

    let me = ctx.api.get_me().await?;
    ctx.api.delete_user(&me.handle).await?;
    ctx.api.clear_tokens();
    line("Account deleted.");
    Ok(())
}
