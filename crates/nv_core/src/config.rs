use std::path::PathBuf;
use url::Url;

use crate::{Error, Result};

pub const STORE_URL_VAR: &str = "NEWSVOICE_STORE_URL";
pub const STORE_KEY_VAR: &str = "NEWSVOICE_STORE_KEY";
pub const DATA_DIR_VAR: &str = "NEWSVOICE_DATA_DIR";

const DEFAULT_DATA_DIR: &str = ".newsvoice";

/// Runtime configuration shared by the binaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub store_url: Option<String>,
    pub store_key: Option<String>,
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_url: None,
            store_key: None,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            store_url: non_empty(STORE_URL_VAR),
            store_key: non_empty(STORE_KEY_VAR),
            data_dir: non_empty(DATA_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
        }
    }

    pub fn with_store_url(mut self, url: impl Into<String>) -> Self {
        self.store_url = Some(url.into());
        self
    }

    pub fn with_store_key(mut self, key: impl Into<String>) -> Self {
        self.store_key = Some(key.into());
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Validated base URL and API key of the hosted store.
    pub fn store_credentials(&self) -> Result<(Url, String)> {
        let (url, key) = match (&self.store_url, &self.store_key) {
            (Some(url), Some(key)) => (url, key),
            _ => return Err(Error::Config("Missing store credentials".to_string())),
        };
        let url = Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))?;
        Ok((url, key.clone()))
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join("settings.json")
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("articles.db")
    }
}
