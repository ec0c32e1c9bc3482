use std::path::{Path, PathBuf};

use libris_catalog::ListMode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SdkError, SdkResult};

/// File read from the working directory when no config path is given.
pub const DEFAULT_CONFIG_FILE: &str = "libris.toml";

/// Directory holding the table files unless configured otherwise.
pub const DEFAULT_STORAGE_DIR: &str = "database";

const ENV_STORAGE_DIR: &str = "LIBRIS_STORAGE_DIR";
const ENV_DEDUP_LISTINGS: &str = "LIBRIS_DEDUP_LISTINGS";
const ENV_AUTOSAVE: &str = "LIBRIS_AUTOSAVE";

/// Settings for a [`Library`](crate::Library).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LibraryConfig {
    /// Directory holding `books.csv` and `users.csv`.
    pub storage_dir: PathBuf,
    /// List one entry per key instead of the raw union of memory and
    /// storage.
    pub dedup_listings: bool,
    /// Merge-save after every successful add.
    pub autosave: bool,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            dedup_listings: true,
            autosave: true,
        }
    }
}

impl LibraryConfig {
    /// Build the effective configuration.
    ///
    /// Starts from the defaults, then reads `path` (or `libris.toml` in the
    /// working directory, if present), then applies `LIBRIS_*` environment
    /// overrides.
    pub fn load(path: Option<&Path>) -> SdkResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env(std::env::vars())?;
        Ok(config)
    }

    /// Read a TOML config file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> SdkResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SdkError::Config(format!("cannot read {}: {e}", path.display())))?;
        debug!(path = %path.display(), "loaded config file");
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> SdkResult<Self> {
        toml::from_str(raw).map_err(|e| SdkError::Config(e.to_string()))
    }

    /// Apply `LIBRIS_*` overrides from `vars`. Unrelated variables are
    /// ignored.
    pub fn apply_env<I, K, V>(&mut self, vars: I) -> SdkResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let value = value.as_ref();
            match key.as_ref() {
                ENV_STORAGE_DIR => self.storage_dir = PathBuf::from(value),
                ENV_DEDUP_LISTINGS => self.dedup_listings = parse_flag(ENV_DEDUP_LISTINGS, value)?,
                ENV_AUTOSAVE => self.autosave = parse_flag(ENV_AUTOSAVE, value)?,
                _ => continue,
            }
            debug!(key = key.as_ref(), value, "config override from environment");
        }
        Ok(())
    }

    /// Replace the storage directory.
    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = dir.into();
        self
    }

    /// The listing mode implied by `dedup_listings`.
    pub fn listing_mode(&self) -> ListMode {
        if self.dedup_listings {
            ListMode::Deduplicated
        } else {
            ListMode::Union
        }
    }
}

fn parse_flag(name: &str, raw: &str) -> SdkResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SdkError::Config(format!(
            "{name} must be a boolean (true/false), got {raw:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = LibraryConfig::default();
        assert_eq!(config.storage_dir, PathBuf::from("database"));
        assert!(config.dedup_listings);
        assert!(config.autosave);
        assert_eq!(config.listing_mode(), ListMode::Deduplicated);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = LibraryConfig::from_toml_str("dedup_listings = false\n").unwrap();
        assert!(!config.dedup_listings);
        assert!(config.autosave);
        assert_eq!(config.listing_mode(), ListMode::Union);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = LibraryConfig::from_toml_str("storage = \"x\"\n").unwrap_err();
        assert!(matches!(err, SdkError::Config(_)));
    }

    #[test]
    fn env_overrides() {
        let mut config = LibraryConfig::default();
        config
            .apply_env([
                ("LIBRIS_STORAGE_DIR", "/tmp/lib"),
                ("LIBRIS_AUTOSAVE", "off"),
                ("PATH", "/usr/bin"),
            ])
            .unwrap();
        assert_eq!(config.storage_dir, PathBuf::from("/tmp/lib"));
        assert!(!config.autosave);
        assert!(config.dedup_listings);
    }

    #[test]
    fn bad_env_flag_is_config_error() {
        let mut config = LibraryConfig::default();
        let err = config
            .apply_env([("LIBRIS_DEDUP_LISTINGS", "sometimes")])
            .unwrap_err();
        assert!(err.to_string().contains("LIBRIS_DEDUP_LISTINGS"));
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("libris.toml");
        std::fs::write(&path, "storage_dir = \"data\"\nautosave = false\n").unwrap();

        let config = LibraryConfig::from_file(&path).unwrap();
        assert_eq!(config.storage_dir, PathBuf::from("data"));
        assert!(!config.autosave);
    }

    #[test]
    fn missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LibraryConfig::from_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, SdkError::Config(_)));
    }
}
