//! TOML-based application configuration.
//!
//! Stores:
//! - User context (id, timezone, work hours, meeting preference)
//! - Event source selection (demo data or Google Calendar)
//! - Insight generator endpoint
//! - Cache sizing
//!
//! Configuration is stored at `~/.config/workhealth/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::cache::{CACHE_TTL_HOURS, DEFAULT_CAPACITY_PER_USER};
use crate::context::{MeetingPreference, UserContext};
use crate::error::ConfigError;

const GOOGLE_TOKEN_ENV: &str = "WORKHEALTH_GOOGLE_TOKEN";
const INSIGHTS_KEY_ENV: &str = "WORKHEALTH_INSIGHTS_API_KEY";

/// Which [`EventSource`](crate::source::EventSource) to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Mock,
    Google,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default = "default_user_id")]
    pub id: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_work_start")]
    pub work_start_hour: u32,
    #[serde(default = "default_work_end")]
    pub work_end_hour: u32,
    #[serde(default)]
    pub meeting_preference: MeetingPreference,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    /// Bearer token for the live source. `WORKHEALTH_GOOGLE_TOKEN` wins if set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsConfig {
    /// Chat-completions URL. Without one, rule-based insights are used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    /// `WORKHEALTH_INSIGHTS_API_KEY` wins if set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: i64,
    #[serde(default = "default_capacity")]
    pub capacity_per_user: usize,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/workhealth/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub user: UserConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub insights: InsightsConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

// Default functions
fn default_user_id() -> String {
    "local".into()
}
fn default_timezone() -> String {
    "UTC".into()
}
fn default_work_start() -> u32 {
    9
}
fn default_work_end() -> u32 {
    17
}
fn default_calendar_id() -> String {
    "primary".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_timeout_secs() -> u64 {
    20
}
fn default_ttl_hours() -> i64 {
    CACHE_TTL_HOURS
}
fn default_capacity() -> usize {
    DEFAULT_CAPACITY_PER_USER
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            id: default_user_id(),
            timezone: default_timezone(),
            work_start_hour: default_work_start(),
            work_end_hour: default_work_end(),
            meeting_preference: MeetingPreference::default(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Mock,
            calendar_id: default_calendar_id(),
            access_token: None,
        }
    }
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            model: default_model(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_ttl_hours(),
            capacity_per_user: default_capacity(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let unknown = || ConfigError::UnknownKey(key.to_string());

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let new_value = match obj.get(part) {
                    Some(serde_json::Value::Bool(_)) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    Some(serde_json::Value::Number(_)) => {
                        let n = value
                            .parse::<i64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as integer")))?;
                        serde_json::Value::Number(n.into())
                    }
                    Some(serde_json::Value::Object(_)) | Some(serde_json::Value::Array(_)) => {
                        return Err(unknown());
                    }
                    Some(_) => serde_json::Value::String(value.into()),
                    // Optional keys are absent from the serialized form when unset.
                    None if Self::is_optional_key(key) => serde_json::Value::String(value.into()),
                    None => return Err(unknown()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn is_optional_key(key: &str) -> bool {
        matches!(
            key,
            "source.access_token" | "insights.endpoint" | "insights.api_key"
        )
    }

    /// Location of the config file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or create and save the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key and validate, without saving.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        if self.user.work_start_hour >= self.user.work_end_hour || self.user.work_end_hour > 24 {
            return Err(invalid(
                "user.work_end_hour",
                format!(
                    "work hours {}-{} must satisfy start < end <= 24",
                    self.user.work_start_hour, self.user.work_end_hour
                ),
            ));
        }
        if self.user.timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(invalid(
                "user.timezone",
                format!("'{}' is not an IANA timezone", self.user.timezone),
            ));
        }
        if self.user.id.trim().is_empty() {
            return Err(invalid("user.id", "must not be empty".to_string()));
        }
        if self.cache.ttl_hours != CACHE_TTL_HOURS {
            return Err(invalid(
                "cache.ttl_hours",
                format!("cached insights are valid for exactly {CACHE_TTL_HOURS} hours"),
            ));
        }
        if self.cache.capacity_per_user == 0 {
            return Err(invalid("cache.capacity_per_user", "must be at least 1".to_string()));
        }
        if self.insights.timeout_secs == 0 {
            return Err(invalid("insights.timeout_secs", "must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    pub fn user_context(&self) -> UserContext {
        UserContext {
            work_start_hour: self.user.work_start_hour,
            work_end_hour: self.user.work_end_hour,
            meeting_preference: self.user.meeting_preference,
            timezone: self.user.timezone.clone(),
        }
    }

    /// Access token for the live calendar source.
    pub fn source_token(&self) -> Option<String> {
        std::env::var(GOOGLE_TOKEN_ENV)
            .ok()
            .filter(|t| !t.is_empty())
            .or_else(|| self.source.access_token.clone())
    }

    /// API key for the insight generator.
    pub fn insights_api_key(&self) -> Option<String> {
        std::env::var(INSIGHTS_KEY_ENV)
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| self.insights.api_key.clone())
    }
}
