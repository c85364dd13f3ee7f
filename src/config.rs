//! rc-file configuration
//!
//! `$HOME/.xbito/rc` holds `key=value` lines; `#` starts a comment.

use crate::filter::DEFAULT_COMPLETED_WINDOW_DAYS;
use anyhow::{anyhow, Context, Result};
use chrono::Duration;
use chrono_tz::Tz;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

pub const APP_DIR: &str = ".xbito";
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::New_York;
pub const DEFAULT_TIMER_MINUTES: i64 = 30;
pub const TIMEZONE_ENV: &str = "XBITO_TIMEZONE";

/// Accepted `completed.window_days` values (up to a century)
pub const COMPLETED_WINDOW_DAYS_RANGE: RangeInclusive<i64> = 1..=36_500;
/// Accepted `timer.minutes` values
pub const TIMER_MINUTES_RANGE: RangeInclusive<i64> = 1..=120;

#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite file holding the feedback log
    pub data_location: PathBuf,
    /// JSON task snapshot read by the snapshot service
    pub snapshot_location: PathBuf,
    pub timezone: Tz,
    pub completed_window_days: i64,
    pub timer_minutes: i64,
}

impl Config {
    /// Defaults rooted at `app_dir`
    pub fn defaults(app_dir: &Path) -> Self {
        Self {
            data_location: app_dir.join("feedback.db"),
            snapshot_location: app_dir.join("tasks.json"),
            timezone: DEFAULT_TIMEZONE,
            completed_window_days: DEFAULT_COMPLETED_WINDOW_DAYS,
            timer_minutes: DEFAULT_TIMER_MINUTES,
        }
    }

    /// Application directory (`$HOME/.xbito`)
    pub fn app_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(APP_DIR))
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::app_dir()?.join("rc"))
    }

    /// Load the rc file (if any), then apply environment overrides
    pub fn load() -> Result<Self> {
        let app_dir = Self::app_dir()?;
        let config_path = app_dir.join("rc");

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
            Self::parse(&content, &app_dir)?
        } else {
            Self::defaults(&app_dir)
        };

        if let Ok(tz) = std::env::var(TIMEZONE_ENV) {
            if !tz.trim().is_empty() {
                config.timezone = parse_timezone(&tz)?;
            }
        }
        Ok(config)
    }

    /// Parse rc content. Relative paths resolve against `base_dir`.
    pub fn parse(content: &str, base_dir: &Path) -> Result<Self> {
        let mut config = Self::defaults(base_dir);

        for (number, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(anyhow!("Invalid config line {}: '{}' (expected key=value)", number + 1, line));
            };
            let value = value.trim();

            match key.trim() {
                "data.location" => config.data_location = resolve_path(base_dir, value),
                "snapshot.location" => config.snapshot_location = resolve_path(base_dir, value),
                "timezone" => config.timezone = parse_timezone(value)?,
                "completed.window_days" => {
                    config.completed_window_days = parse_in_range(key, value, COMPLETED_WINDOW_DAYS_RANGE)?;
                }
                "timer.minutes" => config.timer_minutes = parse_in_range(key, value, TIMER_MINUTES_RANGE)?,
                other => log::warn!("Ignoring unknown config key '{}'", other),
            }
        }

        Ok(config)
    }

    pub fn completed_window(&self) -> Duration {
        Duration::days(self.completed_window_days)
    }
}

fn resolve_path(base_dir: &Path, value: &str) -> PathBuf {
    let path = PathBuf::from(value);
    if path.is_relative() {
        base_dir.join(path)
    } else {
        path
    }
}

pub fn parse_timezone(value: &str) -> Result<Tz> {
    value
        .trim()
        .parse::<Tz>()
        .map_err(|_| anyhow!("Unknown timezone: '{}'", value.trim()))
}

fn parse_in_range(key: &str, value: &str, range: RangeInclusive<i64>) -> Result<i64> {
    match value.parse::<i64>() {
        Ok(n) if range.contains(&n) => Ok(n),
        _ => Err(anyhow!(
            "Invalid value for {}: '{}'. Expected a number from {} to {}.",
            key.trim(),
            value,
            range.start(),
            range.end()
        )),
    }
}
