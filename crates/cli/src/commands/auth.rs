//! Sign-in, sign-up and sign-out.

use nijitter_core::Registration;
use secrecy::SecretString;

use super::{Context, prompt_password};
use crate::render::{line, status};

/// Sign in; the password is prompted for when not given.
///
/// # Errors
///
/// Returns an error if the credentials are refused or the request fails.
pub async fn login(
    ctx: &Context,
    email_or_id: &str,
    password: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let password = match password {
        Some(password) => password,
        None => prompt_password("Password: ")?,
    };

    ctx.api
        .login(email_or_id.trim(), &SecretString::from(password))
        .await?;
    line("Signed in.");
    Ok(())
}

/// Sign out.
///
/// # Errors
///
/// Returns an error if the logout request cannot be sent.
pub async fn logout(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    ctx.api.logout().await?;
    Ok(())
}

/// Request a verification mail.
///
/// # Errors
///
/// Returns an error if the address is malformed or refused.
pub async fn signup(ctx: &Context, email: &str) -> Result<(), Box<dyn std::error::Error>> {
    let email = ctx.api.signup(email).await?;
    line(&format!("Verification mail sent to {email}."));
    Ok(())
}

/// Complete a signup.
///
/// The form is checked locally before anything is sent.
///
/// # Errors
///
/// Returns an error if the form is invalid or the server refuses it.
pub async fn verify(
    ctx: &Context,
    token: &str,
    handle: &str,
    username: &str,
    password: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(email) = ctx.api.pending_signup_email() {
        status(&format!("Completing signup for {email}"));
    }

    let (password, confirm) = match password {
        Some(password) => (password.clone(), password),
        None => (prompt_password("Password: ")?, prompt_password("Confirm password: ")?),
    };

    let registration = Registration::new(token, handle, username.trim(), &password, &confirm)?;
    ctx.api.verify(registration).await?;
    line("Welcome to Nijitter!");
    Ok(())
}
