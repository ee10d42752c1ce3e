use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use leadly_engine::{AtomicFileWriter, PersistError, DEFAULT_API_KEY};
use leadly_logging::{leadly_info, leadly_warn, mask_secret};

/// Storage key of the bearer credential.
pub const API_KEY_STORAGE_KEY: &str = "leadly-api-key";

const CREDENTIALS_FILENAME: &str = "credentials.ron";
const CONFIG_DIR_ENV: &str = "LEADLY_CONFIG_DIR";

/// Directory for the credential file and the log file.
pub fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return PathBuf::from(dir);
    }
    ProjectDirs::from("", "", "leadly")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Explicit,
    Stored,
    Placeholder,
}

/// Durable client-side storage for the API key.
pub struct CredentialStore {
    writer: AtomicFileWriter,
}

impl CredentialStore {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir.join(CREDENTIALS_FILENAME)),
        }
    }

    pub fn path(&self) -> &Path {
        self.writer.target()
    }

    pub fn load(&self) -> Option<String> {
        let path = self.path();
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                leadly_warn!("Failed to read credentials from {:?}: {}", path, err);
                return None;
            }
        };

        let entries: BTreeMap<String, String> = match ron::from_str(&content) {
            Ok(entries) => entries,
            Err(err) => {
                leadly_warn!("Failed to parse credentials from {:?}: {}", path, err);
                return None;
            }
        };

        entries
            .get(API_KEY_STORAGE_KEY)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }

    pub fn save(&self, api_key: &str) -> Result<(), PersistError> {
        let mut entries = BTreeMap::new();
        entries.insert(API_KEY_STORAGE_KEY.to_string(), api_key.trim().to_string());

        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(&entries, pretty)
            .map_err(|err| PersistError::Io(std::io::Error::other(err.to_string())))?;
        self.writer.write(&content)?;
        leadly_info!("Stored API key {} in {:?}", mask_secret(api_key), self.path());
        Ok(())
    }

    pub fn clear(&self) -> Result<(), PersistError> {
        self.writer.remove()
    }

    /// Explicit key first, then the stored one, then the placeholder.
    pub fn resolve(&self, explicit: Option<&str>) -> (String, KeySource) {
        if let Some(key) = explicit.map(str::trim).filter(|key| !key.is_empty()) {
            return (key.to_string(), KeySource::Explicit);
        }
        match self.load() {
            Some(key) => (key, KeySource::Stored),
            None => (DEFAULT_API_KEY.to_string(), KeySource::Placeholder),
        }
    }
}
