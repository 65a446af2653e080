//! Credential persistence.
//!
//! The client keeps exactly two values between runs: the access token
//! (`accessToken`) and the email of a signup awaiting verification
//! (`signup_email`). The refresh token lives in the HTTP cookie jar and is
//! never written here.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while reading or writing stored credentials.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed credential file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Values persisted between sessions.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone, Default)]
pub struct Credentials {
    pub access_token: Option<SecretString>,
    pub signup_email: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("signup_email", &self.signup_email)
            .finish()
    }
}

/// Storage backend for [`Credentials`].
///
/// Implementors only provide `load` and `save`; the accessors are built on
/// top of them.
pub trait CredentialStore: Send + Sync {
    /// Current credentials.
    fn load(&self) -> Credentials;

    /// Replace the stored credentials.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot persist the values.
    fn save(&self, credentials: &Credentials) -> Result<(), StoreError>;

    /// Stored access token, if any.
    fn access_token(&self) -> Option<SecretString> {
        self.load().access_token
    }

    /// Store a new access token.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot persist the values.
    fn set_access_token(&self, token: SecretString) -> Result<(), StoreError> {
        let mut credentials = self.load();
        credentials.access_token = Some(token);
        self.save(&credentials)
    }

    /// Forget the access token.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot persist the values.
    fn clear_access_token(&self) -> Result<(), StoreError> {
        let mut credentials = self.load();
        if credentials.access_token.is_none() {
            return Ok(());
        }
        credentials.access_token = None;
        self.save(&credentials)
    }

    /// Email of a signup awaiting verification.
    fn signup_email(&self) -> Option<String> {
        self.load().signup_email
    }

    /// Remember the email a verification mail was sent to.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot persist the values.
    fn set_signup_email(&self, email: &str) -> Result<(), StoreError> {
        let mut credentials = self.load();
        credentials.signup_email = Some(email.to_owned());
        self.save(&credentials)
    }

    /// Forget the pending signup email.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot persist the values.
    fn clear_signup_email(&self) -> Result<(), StoreError> {
        let mut credentials = self.load();
        credentials.signup_email = None;
        self.save(&credentials)
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// Credentials held in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    credentials: Mutex<Credentials>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that starts out holding `token`.
    #[must_use]
    pub fn with_token(token: &str) -> Self {
        Self {
            credentials: Mutex::new(Credentials {
                access_token: Some(SecretString::from(token.to_owned())),
                signup_email: None,
            }),
        }
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self) -> Credentials {
        self.credentials
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn save(&self, credentials: &Credentials) -> Result<(), StoreError> {
        *self
            .credentials
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = credentials.clone();
        Ok(())
    }
}

// =============================================================================
// FileStore
// =============================================================================

/// On-disk layout of the credential file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredCredentials {
    #[serde(rename = "accessToken", default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    signup_email: Option<String>,
}

/// Credentials persisted as a small JSON file.
///
/// The file is read once on open and rewritten on every change. On Unix it
/// is created with mode `0600`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    cached: Mutex<Credentials>,
}

impl FileStore {
    /// Open the credential file at `path`, starting empty if it is missing.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let stored = match fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => StoredCredentials::default(),
            Ok(bytes) => serde_json::from_slice::<StoredCredentials>(&bytes)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => StoredCredentials::default(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            cached: Mutex::new(Credentials {
                access_token: stored.access_token.map(SecretString::from),
                signup_email: stored.signup_email,
            }),
        })
    }

    /// Location of the credential file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, credentials: &Credentials) -> Result<(), StoreError> {
        let stored = StoredCredentials {
            access_token: credentials
                .access_token
                .as_ref()
                .map(|t| t.expose_secret().to_owned()),
            signup_email: credentials.signup_email.clone(),
        };
        let json = serde_json::to_vec_pretty(&stored)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        restrict_permissions(&tmp)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl CredentialStore for FileStore {
    fn load(&self) -> Credentials {
        self.cached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn save(&self, credentials: &Credentials) -> Result<(), StoreError> {
        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        self.write(credentials)?;
        *cached = credentials.clone();
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}
