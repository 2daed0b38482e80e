use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use crate::config::{Config, ConfigError};

pub const USERNAME_ENV: &str = "FLIIP_USERNAME";
pub const PASSWORD_ENV: &str = "FLIIP_PASSWORD";

#[derive(Debug, Serialize, Deserialize, Default)]
struct CredentialsData {
    #[serde(flatten)]
    data: HashMap<String, String>,
}

/// Secrets kept next to the config in `credentials.toml`
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

    pub fn remove(&mut self, key: &str) {
        self.credentials.remove(key);
    }

    pub fn get_fliip_password(&self) -> Option<&String> {
        self.get("fliip_password")
    }

    pub fn set_fliip_password(&mut self, password: String) {
        self.set("fliip_password".to_string(), password);
    }
}

/// Login for the gym portal
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

impl Credentials {
    /// Environment variables win over config and the credential store
    pub fn resolve(config: &Config, store: &CredentialStore) -> Result<Self, ConfigError> {
        Self::resolve_with(
            std::env::var(USERNAME_ENV).ok(),
            std::env::var(PASSWORD_ENV).ok(),
            config,
            store,
        )
    }

    pub fn resolve_with(
        env_username: Option<String>,
        env_password: Option<String>,
        config: &Config,
        store: &CredentialStore,
    ) -> Result<Self, ConfigError> {
        let username = non_empty(env_username)
            .or_else(|| non_empty(config.portal.username.clone()))
            .ok_or(ConfigError::MissingCredential("username", "USERNAME"))?;
        let password = non_empty(env_password)
            .or_else(|| non_empty(store.get_fliip_password().cloned()))
            .ok_or(ConfigError::MissingCredential("password", "PASSWORD"))?;
        Ok(Self { username, password })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
