use serde::{Deserialize, Serialize};

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::{error::ConfigError, router, scheduler::DEFAULT_NOTIFICATION_TITLE};

const APP_DIR_NAME: &str = "notes-reminder";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the database; the platform data dir when unset
    pub data_dir: Option<PathBuf>,
    pub database_file: String,
    pub http_addr: String,
    pub notification_title: String,
    /// Show OS notifications; reminders are only logged when disabled
    pub desktop_notifications: bool,
    pub rearm_on_startup: bool,
    pub router_buffer: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            database_file: "notes.db".to_string(),
            http_addr: "127.0.0.1:8000".to_string(),
            notification_title: DEFAULT_NOTIFICATION_TITLE.to_string(),
            desktop_notifications: true,
            rearm_on_startup: true,
            router_buffer: router::DEFAULT_BUFFER,
        }
    }
}

impl Config {
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        let data_dir = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_local_dir()
                .ok_or(ConfigError::NoDataDir)?
                .join(APP_DIR_NAME),
        };

        Ok(data_dir.join(&self.database_file))
    }

    /// Applies `NOTES_*` overrides read through `lookup`.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(dir) = lookup("NOTES_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(dir));
        }

        if let Some(addr) = lookup("NOTES_HTTP_ADDR") {
            self.http_addr = addr;
        }

        if let Some(value) = lookup("NOTES_DESKTOP_NOTIFICATIONS") {
            self.desktop_notifications = parse_bool("NOTES_DESKTOP_NOTIFICATIONS", &value)?;
        }

        if let Some(value) = lookup("NOTES_REARM_ON_STARTUP") {
            self.rearm_on_startup = parse_bool("NOTES_REARM_ON_STARTUP", &value)?;
        }

        Ok(self)
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Env {
            name: name.to_string(),
            reason: format!("expected a boolean, got '{value}'"),
        }),
    }
}

pub fn parse_config(contents: &str) -> Result<Config, ConfigError> {
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }

    serde_yaml::from_str(contents).map_err(Into::into)
}

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;

    parse_config(&contents)
}

pub fn load_config() -> Result<Config, ConfigError> {
    // Retrieve env variable
    let config_path = env::var("NOTES_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());

    let config = if Path::new(&config_path).exists() {
        // Try env path
        read_config(Path::new(&config_path))?
    } else if Path::new("config.yaml").exists() {
        // Fallback to config.yaml
        tracing::warn!(
            "Config file '{}' not found, falling back to 'config.yaml'",
            config_path
        );
        read_config(Path::new("config.yaml"))?
    } else {
        // Fallback to defaults and environment variables
        tracing::info!("No config file found, using defaults and environment variables");
        Config::default()
    };

    config.with_overrides(|name| env::var(name).ok())
}
