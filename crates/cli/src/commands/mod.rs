//! Command implementations.

pub mod auth;
pub mod carrot;
pub mod feed;
pub mod notifications;
pub mod search;
pub mod users;

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use nijitter_client::{ClientConfig, FileStore, NijitterApi, Upload};

use crate::render::TerminalNavigator;

/// Everything a command needs.
pub struct Context {
    pub config: ClientConfig,
    pub api: NijitterApi,
}

impl Context {
    /// Load configuration, open the credential file and build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or credentials cannot be loaded.
    pub fn new(api_url: Option<url::Url>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = ClientConfig::from_env()?;
        if let Some(api_url) = api_url {
            config.api_url = api_url;
        }

        let store = Arc::new(FileStore::open(&config.credentials_path)?);
        let api = NijitterApi::new(&config, store, Arc::new(TerminalNavigator))?;
        tracing::debug!(api_url = %config.api_url, "Client ready");

        Ok(Self { config, api })
    }

    /// Image host used when printing image links.
    pub fn image_base(&self) -> Option<&str> {
        self.config.image_url.as_deref()
    }
}

/// Read a line from stdin after printing `prompt` to stderr.
///
/// # Errors
///
/// Returns an I/O error if stdin cannot be read.
pub fn prompt(prompt: &str) -> io::Result<String> {
    let mut stderr = io::stderr();
    write!(stderr, "{prompt}")?;
    stderr.flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_owned())
}

/// Read a password without echoing it.
///
/// Falls back to [`prompt`] when stdin is not a terminal, so passwords can
/// still be piped in.
///
/// # Errors
///
/// Returns an I/O error if the terminal cannot be read, or
/// `ErrorKind::Interrupted` if the user cancels with Esc or Ctrl-C.
pub fn prompt_password(prompt_text: &str) -> io::Result<String> {
    if !io::stdin().is_terminal() {
        return prompt(prompt_text);
    }

    let mut stderr = io::stderr();
    write!(stderr, "{prompt_text}")?;
    stderr.flush()?;

    let mut input = String::new();
    let outcome = {
        let _raw = RawMode::enable()?;
        loop {
            if let Event::Key(key) = event::read()? {
                match edit_secret(&mut input, key) {
                    SecretKey::Continue => {}
                    outcome => break outcome,
                }
            }
        }
    };
    writeln!(stderr)?;

    match outcome {
        SecretKey::Cancel => Err(io::Error::new(io::ErrorKind::Interrupted, "cancelled")),
        _ => Ok(input),
    }
}

/// Raw terminal mode for the lifetime of the guard.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SecretKey {
    Continue,
    Submit,
    Cancel,
}

/// Apply one key press to a hidden input line.
fn edit_secret(input: &mut String, key: KeyEvent) -> SecretKey {
    if key.kind == KeyEventKind::Release {
        return SecretKey::Continue;
    }
    match key.code {
        KeyCode::Enter => SecretKey::Submit,
        KeyCode::Esc => SecretKey::Cancel,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => SecretKey::Cancel,
        KeyCode::Backspace => {
            input.pop();
            SecretKey::Continue
        }
        KeyCode::Char(c) => {
            input.push(c);
            SecretKey::Continue
        }
        _ => SecretKey::Continue,
    }
}

/// Read every image from disk.
///
/// # Errors
///
/// Returns an error if a file cannot be read.
pub async fn read_uploads(paths: Vec<PathBuf>) -> Result<Vec<Upload>, nijitter_client::ApiError> {
    let mut uploads = Vec::with_capacity(paths.len());
    for path in paths {
        uploads.push(Upload::from_path(&path).await?);
    }
    Ok(uploads)
}
