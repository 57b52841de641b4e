use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::{CronError, Result};

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Timezones offered when the user has not picked one.
pub const TIMEZONES: &[&str] = &[
    "UTC",
    "America/New_York",
    "America/Chicago",
    "America/Denver",
    "America/Los_Angeles",
    "Europe/London",
    "Europe/Paris",
    "Europe/Berlin",
    "Asia/Dubai",
    "Asia/Shanghai",
    "Asia/Tokyo",
    "Australia/Sydney",
    "Pacific/Auckland",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub timeout_secs: u64,
    pub default_timezone: String,
    pub default_time: String,
    pub strict_emails: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            timeout_secs: 30,
            default_timezone: "UTC".into(),
            default_time: "09:00".into(),
            strict_emails: true,
        }
    }
}

impl Config {
    /// Read a TOML config file. Missing keys fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| CronError::Config(e.to_string()))?;
        toml::from_str(&raw).map_err(|e| CronError::Config(format!("{}: {e}", path.display())))
    }

    /// Defaults, overlaid by the config file when one is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let cfg = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        tracing::debug!(api_url = %cfg.api_url, timeout_secs = cfg.timeout_secs, "config loaded");
        Ok(cfg)
    }

    /// `{api_url}/schedules`, tolerating a trailing slash on the base.
    pub fn schedules_url(&self) -> String {
        format!("{}/schedules", self.api_url.trim_end_matches('/'))
    }
}
