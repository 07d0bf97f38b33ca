use crate::Error;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Key under which the refresh token is stored.
pub const REFRESH_TOKEN_KEY: &str = "REFRESHKEY";

/// The flat JSON object held by a credential store.
pub type CredentialDocument = Map<String, Value>;

/// Storage for the credential document.
///
/// The document is always read and written whole, so keys other than
/// [`REFRESH_TOKEN_KEY`] survive a rewrite.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<CredentialDocument, Error>;
    fn save(&self, document: &CredentialDocument) -> Result<(), Error>;
}

/// Read the refresh token from a credential document.
///
/// An absent, non-string or empty value means the client was never authorized.
pub fn stored_refresh_token(document: &CredentialDocument) -> Option<&str> {
    document
        .get(REFRESH_TOKEN_KEY)
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
}

pub fn set_refresh_token(document: &mut CredentialDocument, refresh_token: &str) {
    document.insert(
        REFRESH_TOKEN_KEY.to_string(),
        Value::String(refresh_token.to_string()),
    );
}

/// Credential document kept in a JSON file, `credentials.json` by default.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

impl CredentialStore for JsonFileStore {
    fn load(&self) -> Result<CredentialDocument, Error> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No credential file at {}", self.path.display());
                return Ok(CredentialDocument::new());
            }
            Err(e) => return Err(e.into()),
        };

        if contents.trim().is_empty() {
            return Ok(CredentialDocument::new());
        }

        match serde_json::from_str(&contents)? {
            Value::Object(document) => Ok(document),
            other => Err(Error::InvalidCredentialStore(format!(
                "{} holds {}",
                self.path.display(),
                other
            ))),
        }
    }

    fn save(&self, document: &CredentialDocument) -> Result<(), Error> {
        let contents = serde_json::to_string(document)?;

        // Replace the document atomically: write a sibling file, rename it over
        let tmp_path = self.tmp_path();
        std::fs::write(&tmp_path, contents)?;
        if let Err(e) = std::fs::rename(&tmp_path, &self.path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        log::debug!("Saved credentials to {}", self.path.display());
        Ok(())
    }
}

/// Credential store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<CredentialDocument>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: CredentialDocument) -> Self {
        Self {
            document: Mutex::new(document),
        }
    }

    /// Copy of the current document.
    pub fn document(&self) -> CredentialDocument {
        self.document
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self) -> Result<CredentialDocument, Error> {
        Ok(self.document())
    }

    fn save(&self, document: &CredentialDocument) -> Result<(), Error> {
        *self
            .document
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = document.clone();
        Ok(())
    }
}

impl<S: CredentialStore + ?Sized> CredentialStore for std::sync::Arc<S> {
    fn load(&self) -> Result<CredentialDocument, Error> {
        (**self).load()
    }

    fn save(&self, document: &CredentialDocument) -> Result<(), Error> {
        (**self).save(document)
    }
}
