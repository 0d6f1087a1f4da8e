use std::{env, fs, path::PathBuf};

use serde::Deserialize;
use thiserror::Error;

const SETTINGS_FILENAME: &str = "settings.json";
const SETTINGS_PATH_VAR: &str = "TASKPILOT_SETTINGS";
const AI_API_KEY_VAR: &str = "GEMINI_API_KEY";
const JWT_SECRET_VAR: &str = "JWT_SECRET";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse JSON content from settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tcp_socket_binding: String,
    pub tcp_socket_port: u16,
    pub database_path: String,
    /// Directory holding the built SPA bundle, served as the fallback route.
    pub static_files_dir: Option<String>,
    /// Allowed CORS origin. Any origin is allowed when unset.
    pub cors_allowed_origin: Option<String>,
    /// Default tracing filter; `RUST_LOG` takes precedence.
    pub log_level: String,
    pub jwt_secret: String,
    pub jwt_expiration_in_minutes: i64,
    pub refresh_expiration_in_days: i64,
    pub default_user: Option<DefaultUserSettings>,
    pub ai: AiSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DefaultUserSettings {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Generative-language endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tcp_socket_binding: "0.0.0.0".to_string(),
            tcp_socket_port: 5000,
            database_path: "taskpilot.redb".to_string(),
            static_files_dir: None,
            cors_allowed_origin: None,
            log_level: "info".to_string(),
            jwt_secret: "change-this-secret-before-deploying".to_string(),
            jwt_expiration_in_minutes: 60,
            refresh_expiration_in_days: 30,
            default_user: None,
            ai: AiSettings::default(),
        }
    }
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1".to_string(),
            model: "gemini-pro".to_string(),
            timeout_secs: 30,
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 1024,
        }
    }
}

impl Settings {
    /// Load from `TASKPILOT_SETTINGS`, or `settings.json` in the working
    /// directory, then apply secret overrides from the environment.
    pub fn load() -> Result<Settings, SettingsError> {
        let path = env::var_os(SETTINGS_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(SETTINGS_FILENAME));

        let content = fs::read_to_string(&path).map_err(|source| SettingsError::Read {
            path: path.clone(),
            source,
        })?;
        let mut settings = Settings::parse(&content)
            .map_err(|source| SettingsError::Parse { path, source })?;
        settings.apply_env_overrides();
        Ok(settings)
    }

    pub fn parse(content: &str) -> Result<Settings, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.tcp_socket_binding, self.tcp_socket_port)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(key) = env::var(AI_API_KEY_VAR).ok().filter(|v| !v.is_empty()) {
            self.ai.api_key = Some(key);
        }
        if let Some(secret) = env::var(JWT_SECRET_VAR).ok().filter(|v| !v.is_empty()) {
            self.jwt_secret = secret;
        }
    }
}
