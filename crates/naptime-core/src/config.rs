//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Alarm notification content and sound file
//! - Countdown tick interval
//! - Silent-mode reminders
//! - The list of preset delays
//!
//! Configuration is stored at `~/.config/naptime/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::platform::{NotificationRequest, ALARM_NOTIFICATION_ID};
use crate::presets::{default_presets, Preset};

/// Alarm notification and sound settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlarmConfig {
    #[serde(default = "default_notification_id")]
    pub notification_id: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_body")]
    pub body: String,
    /// Sound file used both by the OS notification and the looping alarm.
    #[serde(default = "default_sound_file")]
    pub sound_file: String,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

/// Reminders shown around scheduling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemindersConfig {
    /// Warn that Silent Mode / Do Not Disturb mutes the alarm.
    #[serde(default = "default_true")]
    pub silent_mode_warning: bool,
    /// After dismissing, remind that Silent Mode can be re-enabled.
    #[serde(default = "default_true")]
    pub restore_reminder: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/naptime/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub alarm: AlarmConfig,
    #[serde(default)]
    pub reminders: RemindersConfig,
    #[serde(default = "default_presets")]
    pub presets: Vec<Preset>,
}

fn default_notification_id() -> String {
    ALARM_NOTIFICATION_ID.into()
}
fn default_title() -> String {
    "⏰ Alarm".into()
}
fn default_body() -> String {
    "Time to wake up!".into()
}
fn default_sound_file() -> String {
    "alarm.wav".into()
}
fn default_tick_interval_ms() -> u64 {
    1000
}
fn default_true() -> bool {
    true
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            notification_id: default_notification_id(),
            title: default_title(),
            body: default_body(),
            sound_file: default_sound_file(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            silent_mode_warning: true,
            restore_reminder: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            alarm: AlarmConfig::default(),
            reminders: RemindersConfig::default(),
            presets: default_presets(),
        }
    }
}

/// Returns `~/.config/naptime[-dev]/` based on NAPTIME_ENV.
///
/// Set NAPTIME_ENV=dev to use development data directory.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("NAPTIME_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("naptime-dev")
    } else {
        base_dir.join("naptime")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DirUnavailable(format!("{}: {e}", dir.display())))?;
    Ok(dir)
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
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => serde_json::Value::Number(
                    value
                        .parse::<u64>()
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?
                        .into(),
                ),
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                _ => serde_json::Value::String(value.into()),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing defaults if the file does not exist yet.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
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

    /// Set a value by dot-separated key in memory. Unknown keys and values
    /// of the wrong type are rejected and leave `self` untouched.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.alarm.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "alarm.tick_interval_ms".into(),
                message: "must be greater than zero".into(),
            });
        }
        if self.alarm.notification_id.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "alarm.notification_id".into(),
                message: "must not be empty".into(),
            });
        }
        if let Some(p) = self.presets.iter().find(|p| p.seconds == 0) {
            return Err(ConfigError::InvalidValue {
                key: "presets".into(),
                message: format!("preset '{}' has zero duration", p.label),
            });
        }
        Ok(())
    }

    /// Alarm notification content for a given delay.
    pub fn notification_request(&self, after_secs: u64) -> NotificationRequest {
        NotificationRequest {
            id: self.alarm.notification_id.clone(),
            after_secs,
            title: self.alarm.title.clone(),
            body: self.alarm.body.clone(),
            sound: Some(self.alarm.sound_file.clone()).filter(|s| !s.is_empty()),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.alarm.tick_interval_ms.max(1))
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.alarm.notification_id, ALARM_NOTIFICATION_ID);
        assert_eq!(parsed.presets, default_presets());
        assert!(parsed.reminders.silent_mode_warning);
    }

    #[test]
    fn missing_sections_take_defaults() {
        let parsed: Config = toml::from_str("[alarm]\ntick_interval_ms = 250\n").unwrap();
        assert_eq!(parsed.alarm.tick_interval_ms, 250);
        assert_eq!(parsed.alarm.sound_file, "alarm.wav");
        assert_eq!(parsed.presets.len(), 8);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("alarm.tick_interval_ms").as_deref(), Some("1000"));
        assert_eq!(cfg.get("alarm.body").as_deref(), Some("Time to wake up!"));
        assert_eq!(cfg.get("reminders.restore_reminder").as_deref(), Some("true"));
        assert!(cfg.get("alarm.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.set("reminders.silent_mode_warning", "false").unwrap();
        cfg.set("alarm.tick_interval_ms", "500").unwrap();
        cfg.set("alarm.sound_file", "chime.wav").unwrap();
        assert!(!cfg.reminders.silent_mode_warning);
        assert_eq!(cfg.tick_interval(), Duration::from_millis(500));
        assert_eq!(cfg.alarm.sound_file, "chime.wav");
    }

    #[test]
    fn set_replaces_presets_from_json() {
        let mut cfg = Config::default();
        cfg.set("presets", r#"[{"label":"power nap","seconds":1200}]"#)
            .unwrap();
        assert_eq!(cfg.presets.len(), 1);
        assert_eq!(cfg.presets[0].label, "power nap");
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("alarm.volume", "80"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(cfg.set("", "1"), Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn set_rejects_invalid_type_and_values() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("reminders.restore_reminder", "sometimes"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.set("alarm.tick_interval_ms", "0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(cfg.alarm.tick_interval_ms, 1000);
    }

    #[test]
    fn notification_request_uses_configured_content() {
        let mut cfg = Config::default();
        cfg.set("alarm.sound_file", "").unwrap();
        let req = cfg.notification_request(900);
        assert_eq!(req.after_secs, 900);
        assert_eq!(req.title, "⏰ Alarm");
        assert_eq!(req.sound, None);
    }

    #[test]
    fn load_from_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.presets.len(), 8);

        let mut edited = cfg.clone();
        edited.set("alarm.title", "Nap over").unwrap();
        edited.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().alarm.title, "Nap over");
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "alarm = 3").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
