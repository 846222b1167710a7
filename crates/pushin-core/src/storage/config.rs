//! TOML-based application configuration.
//!
//! Stores:
//! - The grace period between session expiry and re-locking
//! - The list of block targets
//! - Per-exercise targets and rewards
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::access::BlockTarget;
use crate::error::{ConfigError, CoreError, ValidationError};
use crate::workout::{Workout, WorkoutKind};

pub const DEFAULT_GRACE_PERIOD_SECS: u64 = 5;

/// Target and reward for one exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutPreset {
    pub target: u32,
    pub reward_secs: u64,
}

impl WorkoutPreset {
    fn for_kind(kind: WorkoutKind) -> Self {
        Self {
            target: kind.default_target(),
            reward_secs: kind.default_reward_secs(),
        }
    }
}

fn push_ups() -> WorkoutPreset {
    WorkoutPreset::for_kind(WorkoutKind::PushUps)
}
fn squats() -> WorkoutPreset {
    WorkoutPreset::for_kind(WorkoutKind::Squats)
}
fn jumping_jacks() -> WorkoutPreset {
    WorkoutPreset::for_kind(WorkoutKind::JumpingJacks)
}
fn sit_ups() -> WorkoutPreset {
    WorkoutPreset::for_kind(WorkoutKind::SitUps)
}
fn plank() -> WorkoutPreset {
    WorkoutPreset::for_kind(WorkoutKind::Plank)
}

/// Per-exercise presets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutsConfig {
    #[serde(default = "push_ups")]
    pub push_ups: WorkoutPreset,
    #[serde(default = "squats")]
    pub squats: WorkoutPreset,
    #[serde(default = "jumping_jacks")]
    pub jumping_jacks: WorkoutPreset,
    #[serde(default = "sit_ups")]
    pub sit_ups: WorkoutPreset,
    #[serde(default = "plank")]
    pub plank: WorkoutPreset,
}

impl Default for WorkoutsConfig {
    fn default() -> Self {
        Self {
            push_ups: push_ups(),
            squats: squats(),
            jumping_jacks: jumping_jacks(),
            sit_ups: sit_ups(),
            plank: plank(),
        }
    }
}

impl WorkoutsConfig {
    pub fn preset(&self, kind: WorkoutKind) -> WorkoutPreset {
        match kind {
            WorkoutKind::PushUps => self.push_ups,
            WorkoutKind::Squats => self.squats,
            WorkoutKind::JumpingJacks => self.jumping_jacks,
            WorkoutKind::SitUps => self.sit_ups,
            WorkoutKind::Plank => self.plank,
        }
    }
}

fn default_grace_period() -> u64 {
    DEFAULT_GRACE_PERIOD_SECS
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_grace_period")]
    pub grace_period_secs: u64,
    #[serde(default)]
    pub workouts: WorkoutsConfig,
    /// Kept last so the TOML output puts the `[[targets]]` tables at the end.
    #[serde(default)]
    pub targets: Vec<BlockTarget>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grace_period_secs: DEFAULT_GRACE_PERIOD_SECS,
            workouts: WorkoutsConfig::default(),
            targets: Vec::new(),
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
        if key.is_empty() {
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
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    let n = value
                        .parse::<u64>()
                        .map_err(|_| invalid(format!("cannot parse '{value}' as a whole number")))?;
                    serde_json::Value::Number(n.into())
                }
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

    fn path() -> Result<PathBuf, std::io::Error> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, CoreError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file does not exist.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn load_from(path: &Path) -> Result<Self, CoreError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist to the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), CoreError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), CoreError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
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

    /// Set a value by dot-separated key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the
    /// existing type.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a value by key and save to the data directory.
    ///
    /// # Errors
    ///
    /// See [`Config::apply`] and [`Config::save`].
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Reject presets that could never unlock anything.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for kind in WorkoutKind::ALL {
            let preset = self.workouts.preset(kind);
            Workout::new(kind, preset.target, preset.reward_secs)?;
        }
        Ok(())
    }

    /// Workout for `kind` using the configured preset.
    pub fn workout(&self, kind: WorkoutKind) -> Result<Workout, ValidationError> {
        let preset = self.workouts.preset(kind);
        Workout::new(kind, preset.target, preset.reward_secs)
    }

    /// Add a target, replacing any existing entry with the same id.
    pub fn upsert_target(&mut self, target: BlockTarget) {
        match self.targets.iter_mut().find(|t| t.id == target.id) {
            Some(existing) => *existing = target,
            None => self.targets.push(target),
        }
    }

    /// Remove a target by id. Returns whether anything was removed.
    pub fn remove_target(&mut self, id: &str) -> bool {
        let before = self.targets.len();
        self.targets.retain(|t| t.id != id);
        self.targets.len() != before
    }
}
