//! Engine settings, read from TOML.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SyncError;
use crate::resilient_fetcher::ResilienceConfig;

const APP_DIR: &str = "listsync";
const CONFIG_FILE: &str = "config.toml";
const DEFAULT_PAGE_SIZE: u32 = 20;
const DEFAULT_FETCH_TIMEOUT_MS: u64 = 30_000;

/// Settings shared by every list screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Items requested per page, before per-kind clamping.
    pub page_size: u32,
    /// Upper bound for one fetch, retries included.
    pub fetch_timeout_ms: u64,
    /// Whether reaching the last item loads the next page.
    pub load_more_automatically: bool,
    pub retry: ResilienceConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            load_more_automatically: false,
            retry: ResilienceConfig::defaults(),
        }
    }
}

impl SyncConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// `<config dir>/listsync/config.toml`, when the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Reads the file at `path`, or the default location when `None`.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, SyncError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) => path,
                None => {
                    log::debug!("No config directory, using defaults");
                    return Ok(Self::default());
                }
            },
        };
        match fs::read_to_string(&path) {
            Ok(contents) => {
                log::debug!("Loading config from {}", path.display());
                Self::from_toml(&contents)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("{} not found, using defaults", path.display());
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self, SyncError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), SyncError> {
        if self.page_size == 0 {
            return Err(SyncError::Config("page_size must be positive".to_string()));
        }
        if self.fetch_timeout_ms == 0 {
            return Err(SyncError::Config(
                "fetch_timeout_ms must be positive".to_string(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(SyncError::Config(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = SyncConfig::load(Some(&dir.path().join("absent.toml"))).expect("config");
        assert_eq!(config, SyncConfig::default());
        assert_eq!(config.fetch_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "page_size = 50\nload_more_automatically = true\n\n[retry]\nmax_attempts = 5"
        )
        .expect("write");

        let config = SyncConfig::load(Some(file.path())).expect("config");
        assert_eq!(config.page_size, 50);
        assert!(config.load_more_automatically);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay_ms, ResilienceConfig::defaults().base_delay_ms);
        assert_eq!(config.fetch_timeout_ms, 30_000);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = SyncConfig::from_toml("page_size = 0").expect_err("must fail");
        assert!(matches!(err, SyncError::Config(_)));

        let err = SyncConfig::from_toml("page_size = \"many\"").expect_err("must fail");
        assert!(matches!(err, SyncError::Config(_)));
    }
}
