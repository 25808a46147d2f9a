use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Environment variable that overrides the stored TMDB API key.
pub const API_KEY_ENV: &str = "MOVIE_CACHE_TMDB_API_KEY";

const TMDB_API_KEY: &str = "tmdb_api_key";
const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY";

#[derive(Debug, Serialize, Deserialize, Default)]
struct CredentialsData {
    #[serde(flatten)]
    data: HashMap<String, String>,
}

/// Secrets kept apart from `config.toml` so the config can be shared.
pub struct CredentialStore {
    path: PathBuf,
    credentials: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            credentials: HashMap::new(),
        }
    }

    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            let creds_data: CredentialsData = toml::from_str(&content)?;
            self.credentials = creds_data.data;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let creds_data = CredentialsData {
            data: self.credentials.clone(),
        };
        let content = toml::to_string_pretty(&creds_data)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.credentials.get(key)
    }

    pub fn set(&mut self, key: String, value: String) {
        self.credentials.insert(key, value);
    }

    pub fn get_tmdb_api_key(&self) -> Option<&String> {
        self.get(TMDB_API_KEY)
    }

    pub fn set_tmdb_api_key(&mut self, key: String) {
        self.set(TMDB_API_KEY.to_string(), key);
    }

    /// Resolve the API key: environment first, then the stored value.
    /// Empty and placeholder values count as missing at either level.
    pub fn resolve_tmdb_api_key(&self) -> Result<String> {
        let from_env = std::env::var(API_KEY_ENV).ok();
        let stored = self.get_tmdb_api_key().map(String::as_str);

        pick_api_key(from_env.as_deref(), stored).ok_or_else(|| {
            anyhow::anyhow!(
                "TMDB API key is not configured (set {} or store it in {})",
                API_KEY_ENV,
                self.path.display()
            )
        })
    }
}

fn usable_key(key: &str) -> Option<String> {
    let key = key.trim();
    (!key.is_empty() && key != PLACEHOLDER_API_KEY).then(|| key.to_string())
}

fn pick_api_key(from_env: Option<&str>, stored: Option<&str>) -> Option<String> {
    from_env.and_then(usable_key).or_else(|| stored.and_then(usable_key))
}
