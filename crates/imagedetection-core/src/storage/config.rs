//! TOML-based application configuration.
//!
//! Stores:
//! - Status message timing (display duration, escalation delay, fade)
//! - Session timing (restart cooldown, content hint delay)
//! - The detection image group and its reference images
//!
//! Configuration is stored at `~/.config/imagedetection/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::error::ConfigError;
use crate::session::{ControllerConfig, ReferenceImage};
use crate::status::SchedulerConfig;
use crate::timer::FAR_FUTURE;

/// Status panel timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusConfig {
    #[serde(default = "default_display_duration")]
    pub display_duration_secs: f64,
    #[serde(default = "default_escalation_delay")]
    pub escalation_delay_secs: f64,
    #[serde(default = "default_fade_duration")]
    pub fade_duration_secs: f64,
}

/// Tracking session behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_restart_cooldown")]
    pub restart_cooldown_secs: f64,
    #[serde(default = "default_content_hint_delay")]
    pub content_hint_delay_secs: f64,
    #[serde(default = "default_detection_group")]
    pub detection_group: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/imagedetection/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub status: StatusConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub reference_images: Vec<ReferenceImage>,
}

// Default functions
fn default_display_duration() -> f64 {
    6.0
}
fn default_escalation_delay() -> f64 {
    3.0
}
fn default_fade_duration() -> f64 {
    0.2
}
fn default_restart_cooldown() -> f64 {
    5.0
}
fn default_content_hint_delay() -> f64 {
    7.5
}
fn default_detection_group() -> String {
    "AR Resources".into()
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            display_duration_secs: default_display_duration(),
            escalation_delay_secs: default_escalation_delay(),
            fade_duration_secs: default_fade_duration(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            restart_cooldown_secs: default_restart_cooldown(),
            content_hint_delay_secs: default_content_hint_delay(),
            detection_group: default_detection_group(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            status: StatusConfig::default(),
            session: SessionConfig::default(),
            reference_images: Vec::new(),
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
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<f64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                        serde_json::Number::from_f64(n)
                            .map(serde_json::Value::Number)
                            .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default location of the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// fails validation, or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            Ok(cfg)
        }
    }

    /// Load and validate a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let cfg: Config = toml::from_str(&content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
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

    /// Set a config value by dot-separated key, in memory only.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// or fails validation. On error `self` is unchanged.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self)
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check every duration is a finite, non-negative number of seconds no
    /// longer than [`FAR_FUTURE`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first bad key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("status.display_duration_secs", self.status.display_duration_secs),
            ("status.escalation_delay_secs", self.status.escalation_delay_secs),
            ("status.fade_duration_secs", self.status.fade_duration_secs),
            ("session.restart_cooldown_secs", self.session.restart_cooldown_secs),
            ("session.content_hint_delay_secs", self.session.content_hint_delay_secs),
        ];
        for (key, secs) in durations {
            let in_range = Duration::try_from_secs_f64(secs).is_ok_and(|d| d <= FAR_FUTURE);
            if !in_range {
                return Err(ConfigError::InvalidValue {
                    key: key.into(),
                    message: format!("{secs} is not a valid duration in seconds"),
                });
            }
        }
        for image in &self.reference_images {
            if !(image.physical_width > 0.0 && image.physical_height > 0.0) {
                return Err(ConfigError::InvalidValue {
                    key: format!("reference_images.{}", image.name),
                    message: "physical size must be positive".into(),
                });
            }
        }
        Ok(())
    }

    pub fn fade_duration(&self) -> Duration {
        secs(self.status.fade_duration_secs)
    }

    /// Timing and group for the session controller.
    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            scheduler: SchedulerConfig {
                display_duration: secs(self.status.display_duration_secs),
            },
            escalation_delay: secs(self.status.escalation_delay_secs),
            restart_cooldown: secs(self.session.restart_cooldown_secs),
            content_hint_delay: secs(self.session.content_hint_delay_secs),
            detection_group: self.session.detection_group.clone(),
        }
    }
}

/// Validated configs never hit the fallback.
fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn config_default_values() {
        let cfg = Config::default();
        assert_eq!(cfg.status.display_duration_secs, 6.0);
        assert_eq!(cfg.status.escalation_delay_secs, 3.0);
        assert_eq!(cfg.session.restart_cooldown_secs, 5.0);
        assert_eq!(cfg.session.content_hint_delay_secs, 7.5);
        assert_eq!(cfg.session.detection_group, "AR Resources");
        assert!(cfg.reference_images.is_empty());
    }

    #[test]
    fn controller_config_matches_defaults() {
        assert_eq!(Config::default().controller_config(), ControllerConfig::default());
        assert_eq!(Config::default().fade_duration(), Duration::from_millis(200));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [status]
            escalation_delay_secs = 1.5

            [[reference_images]]
            name = "poster"
            physical_width = 0.3
            physical_height = 0.4
            "#,
        )
        .unwrap();
        assert_eq!(cfg.status.escalation_delay_secs, 1.5);
        assert_eq!(cfg.status.display_duration_secs, 6.0);
        assert_eq!(cfg.reference_images[0].group, "AR Resources");
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("status.display_duration_secs").as_deref(), Some("6.0"));
        assert_eq!(cfg.get("session.detection_group").as_deref(), Some("AR Resources"));
        assert!(cfg.get("status.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_number_and_string() {
        let mut cfg = Config::default();
        cfg.set("status.escalation_delay_secs", "4").unwrap();
        cfg.set("session.detection_group", "Posters").unwrap();
        assert_eq!(cfg.status.escalation_delay_secs, 4.0);
        assert_eq!(cfg.session.detection_group, "Posters");
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        let err = cfg.set("status.nonexistent", "1").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(_)));
    }

    #[test]
    fn set_rejects_invalid_number() {
        let mut cfg = Config::default();
        assert!(cfg.set("status.display_duration_secs", "soon").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn set_rejects_negative_duration() {
        let mut cfg = Config::default();
        let err = cfg.set("session.restart_cooldown_secs", "-1").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "session.restart_cooldown_secs"));
        assert_eq!(cfg.session.restart_cooldown_secs, 5.0);
    }

    #[test]
    fn set_rejects_unschedulable_duration() {
        let mut cfg = Config::default();
        for key in ["status.display_duration_secs", "status.escalation_delay_secs"] {
            let err = cfg.set(key, "1e19").unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { .. }), "{key}: {err}");
        }
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn validate_rejects_flat_image() {
        let mut cfg = Config::default();
        cfg.reference_images.push(ReferenceImage {
            name: "flat".into(),
            group: "AR Resources".into(),
            physical_width: 0.0,
            physical_height: 0.2,
        });
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn save_and_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = Config::default();
        cfg.set("status.display_duration_secs", "2.5").unwrap();
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.status.display_duration_secs, 2.5);
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "status = 3").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::ParseFailed(_))));
    }
}
