//! Terminal output.
//!
//! Feeds re-emit their whole state on every change; [`FeedPrinter`] keeps the
//! ids it has already printed so each carrot appears once, the way the web
//! front end skips nodes whose `data-carrot-id` is already in the DOM.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use chrono::Local;
use nijitter_client::{FeedState, Navigator};
use nijitter_core::media::{Viewport, icon_or_default, thumbnail_url};
use nijitter_core::{Carrot, CarrotId, Location, Notification, SearchResults, UserProfile};

/// Print a line to stdout.
pub fn line(text: &str) {
    println!("{text}");
}

/// Print a status line to stderr.
pub fn status(text: &str) {
    eprintln!("{text}");
}

fn timestamp(carrot: &Carrot) -> String {
    carrot
        .created_at
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

/// Render one carrot as text.
#[must_use]
pub fn format_carrot(carrot: &Carrot, image_base: Option<&str>) -> String {
    let mut out = format!(
        "#{} {} @{} · {}",
        carrot.id,
        carrot.username,
        carrot.handle,
        timestamp(carrot)
    );
    if let Some(parent) = carrot.reply_to {
        out.push_str(&format!("\n  ↩ #{parent}"));
    }
    for text_line in carrot.content.lines() {
        out.push_str("\n  ");
        out.push_str(text_line);
    }
    for image in &carrot.images {
        let url = thumbnail_url(image, image_base, Viewport::Desktop)
            .map_or_else(|| image.clone(), |u| u.to_string());
        out.push_str(&format!("\n  [image] {url}"));
    }
    if carrot.is_liked {
        out.push_str("\n  ♥ liked");
    }
    out
}

/// Render a profile header as text.
#[must_use]
pub fn format_profile(user: &UserProfile) -> String {
    let mut out = format!("{} @{}", user.username, user.handle);
    if let Some(status) = user.status_message.as_deref().filter(|s| !s.is_empty()) {
        out.push_str(&format!("\n  {status}"));
    }
    if let Some(bio) = user.bio_text() {
        out.push_str(&format!("\n  {bio}"));
    }
    out.push_str(&format!(
        "\n  icon: {}",
        icon_or_default(user.icon_path.as_deref())
    ));
    if let (Some(followers), Some(following)) = (user.follower_count, user.following_count) {
        out.push_str(&format!("\n  {followers} followers · {following} following"));
    }
    if user.followed_by_viewer() {
        out.push_str("\n  (following)");
    }
    out
}

/// Render a notification as text.
#[must_use]
pub fn format_notification(notification: &Notification) -> String {
    let marker = if notification.is_read { " " } else { "●" };
    let target = notification
        .target()
        .map(|location| format!(" → {location}"))
        .unwrap_or_default();
    format!(
        "{marker} [{}] {}{target}",
        notification.id,
        notification.message()
    )
}

/// Print search results.
pub fn print_search(results: &SearchResults, image_base: Option<&str>) {
    if results.is_empty() {
        line("No results");
        return;
    }
    for user in &results.users {
        line(&format!("@{} {}", user.handle, user.username));
    }
    for carrot in &results.carrots {
        line(&format_carrot(carrot, image_base));
    }
}

/// Prints feed states, skipping carrots already shown.
#[derive(Debug, Default)]
pub struct FeedPrinter {
    image_base: Option<String>,
    seen: Mutex<HashSet<CarrotId>>,
}

impl FeedPrinter {
    #[must_use]
    pub fn new(image_base: Option<String>) -> Self {
        Self {
            image_base,
            seen: Mutex::new(HashSet::new()),
        }
    }

    /// Carrots of `state` not printed before, in feed order.
    pub fn unseen<'a>(&self, state: &'a FeedState) -> Vec<&'a Carrot> {
        let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
        state
            .carrots
            .iter()
            .filter(|carrot| seen.insert(carrot.id))
            .collect()
    }

    /// Feed listener: loader line while loading, then new carrots.
    pub fn render(&self, state: &FeedState) {
        if state.is_loading {
            status("Loading…");
            return;
        }
        for carrot in self.unseen(state) {
            line(&format_carrot(carrot, self.image_base.as_deref()));
        }
    }
}

/// Navigator for the terminal: redirects become hints, alerts go to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, location: &Location) {
        tracing::debug!(path = %location, "navigate");
        match location {
            Location::Login => status("Signed out. Run `nijitter login` to sign in."),
            Location::Verify => {
                status("Check your inbox, then run `nijitter verify --token <token> ...`.");
            }
            Location::Night => status("Nijitter is closed for the night."),
            _ => {}
        }
    }

    fn alert(&self, message: &str) {
        status(&format!("! {message}"));
    }
}
