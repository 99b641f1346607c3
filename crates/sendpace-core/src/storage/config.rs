//! TOML-based pool and pacing configuration.
//!
//! Stores the operator-tunable admission settings:
//! - Mailbox pool (addresses in first-fit priority order, per-mailbox caps)
//! - Global daily cap across the whole pool
//! - Pacing gap range in minutes
//!
//! Configuration is stored at `~/.config/sendpace/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::{ConfigError, ValidationError};
use crate::pacing::GapRange;
use crate::pool::{Mailbox, MailboxPool};

/// Pacing-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    #[serde(default = "default_min_gap_minutes")]
    pub min_gap_minutes: i64,
    #[serde(default = "default_max_gap_minutes")]
    pub max_gap_minutes: i64,
}

/// Pool configuration.
///
/// Serialized to/from TOML at `~/.config/sendpace/config.toml`.
/// Values are not validated on load; [`PoolConfig::to_pool`] validates
/// when the runtime pool is built, so a hand-edited file with a bad
/// range fails at use, not at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    #[serde(default = "default_global_daily_cap")]
    pub global_daily_cap: u32,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default = "default_mailboxes")]
    pub mailboxes: Vec<Mailbox>,
}

// Default functions
fn default_min_gap_minutes() -> i64 {
    70
}
fn default_max_gap_minutes() -> i64 {
    100
}
fn default_global_daily_cap() -> u32 {
    30
}
fn default_mailboxes() -> Vec<Mailbox> {
    (1..=3)
        .map(|n| Mailbox {
            address: format!("outreach{n}@example.com"),
            daily_cap: 10,
        })
        .collect()
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_gap_minutes: default_min_gap_minutes(),
            max_gap_minutes: default_max_gap_minutes(),
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            global_daily_cap: default_global_daily_cap(),
            pacing: PacingConfig::default(),
            mailboxes: default_mailboxes(),
        }
    }
}

impl PoolConfig {
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
    ) -> Result<(), ValidationError> {
        let unknown_key = || ValidationError::InvalidValue {
            field: key.to_string(),
            message: "unknown config key".to_string(),
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(ValidationError::InvalidValue {
                field: key.to_string(),
                message: "config key is empty".to_string(),
            });
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown_key)?;
                let existing = obj.get(part).ok_or_else(unknown_key)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|_| ValidationError::InvalidValue {
                            field: key.to_string(),
                            message: format!("cannot parse '{value}' as bool"),
                        })?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<i64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| ValidationError::InvalidValue {
                                    field: key.to_string(),
                                    message: format!("cannot parse '{value}' as number"),
                                })?
                        } else {
                            return Err(ValidationError::InvalidValue {
                                field: key.to_string(),
                                message: format!("cannot parse '{value}' as number"),
                            });
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| {
                            ValidationError::InvalidValue {
                                field: key.to_string(),
                                message: e.to_string(),
                            }
                        })?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown_key)?;
        }

        Err(unknown_key())
    }

    fn path() -> crate::error::Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or write and return the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> crate::error::Result<Self> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: PoolConfig =
                    toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                        path: path.clone(),
                        message: e.to_string(),
                    })?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> crate::error::Result<()> {
        let path = Self::path()?;
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
                path: path.clone(),
                message: e.to_string(),
            })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
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

    /// Set a config value by key and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed
    /// into the field's type, or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> crate::error::Result<()> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ValidationError::InvalidValue {
                field: key.to_string(),
                message: e.to_string(),
            })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ValidationError::InvalidValue {
            field: key.to_string(),
            message: e.to_string(),
        })?;
        self.save()?;
        Ok(())
    }

    /// Build the validated runtime pool from this configuration.
    ///
    /// # Errors
    ///
    /// Fails on a bad gap range or an invalid mailbox list, the same
    /// checks [`MailboxPool::new`] applies.
    pub fn to_pool(&self) -> Result<MailboxPool, ValidationError> {
        let range = GapRange::new(self.pacing.min_gap_minutes, self.pacing.max_gap_minutes)?;
        MailboxPool::new(self.mailboxes.clone(), self.global_daily_cap, range)
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}
