//! Credential persistence
//!
//! The credential lives under one fixed key in a small key/value document. It
//! is read once at startup and rewritten whenever the caller changes it. An
//! empty value removes the key. The pipeline never touches a store directly;
//! callers load a [`Credential`] and pass it in.

use super::error::{ConfigError, ConfigResult};
use super::secrets::Credential;
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Key the credential is stored under
pub const CREDENTIAL_KEY: &str = "openai_api_key";

/// Persistence adapter for the completion credential
pub trait CredentialStore: Send + Sync {
    /// Read the stored credential, if any
    fn load(&self) -> ConfigResult<Option<Credential>>;

    /// Replace the stored credential. A missing (blank) credential clears it.
    fn save(&self, credential: &Credential) -> ConfigResult<()>;

    /// Remove the stored credential
    fn clear(&self) -> ConfigResult<()> {
        self.save(&Credential::default())
    }
}

/// Stores the credential in a JSON document on disk.
///
/// Other keys in the document are preserved across writes.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> ConfigResult<Map<String, Value>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(ConfigError::CorruptStore {
                path: self.display_path(),
                message: "expected a JSON object".to_string(),
            }),
            Err(e) => Err(ConfigError::CorruptStore {
                path: self.display_path(),
                message: e.to_string(),
            }),
        }
    }

    fn write_document(&self, document: &Map<String, Value>) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }

        let content = serde_json::to_string_pretty(document).map_err(|e| ConfigError::CorruptStore {
            path: self.display_path(),
            message: e.to_string(),
        })?;
        fs::write(&self.path, content).map_err(|e| self.io_error(e))
    }

    fn io_error(&self, source: std::io::Error) -> ConfigError {
        ConfigError::IoError {
            path: self.display_path(),
            source,
        }
    }

    fn display_path(&self) -> String {
        self.path.to_string_lossy().to_string()
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> ConfigResult<Option<Credential>> {
        let document = self.read_document()?;
        let credential = document
            .get(CREDENTIAL_KEY)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
            .map(Credential::from);

        debug!(
            "Loaded credential store {} (credential present: {})",
            self.display_path(),
            credential.is_some()
        );
        Ok(credential)
    }

    fn save(&self, credential: &Credential) -> ConfigResult<()> {
        let mut document = self.read_document()?;
        if credential.is_missing() {
            document.remove(CREDENTIAL_KEY);
        } else {
            document.insert(
                CREDENTIAL_KEY.to_string(),
                Value::String(credential.expose_secret().to_string()),
            );
        }
        self.write_document(&document)
    }
}

/// In-process store, for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credential: Mutex<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> ConfigResult<Option<Credential>> {
        let guard = self.credential.lock().unwrap_or_else(|e| e.into_inner());
        Ok(guard.clone())
    }

    fn save(&self, credential: &Credential) -> ConfigResult<()> {
        let mut guard = self.credential.lock().unwrap_or_else(|e| e.into_inner());
        *guard = if credential.is_missing() {
            None
        } else {
            Some(credential.clone())
        };
        Ok(())
    }
}
