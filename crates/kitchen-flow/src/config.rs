//! Runtime configuration, read from environment variables with defaults.

use crate::model::{CapacityConfig, PrepTimeModel};
use chrono::NaiveTime;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("Inconsistent configuration: {0}")]
    Inconsistent(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    /// JSON menu document, re-read on `/api/menu/reload`.
    pub menu_path: PathBuf,
    /// Directory holding `orders.log` and `audit.log`.
    pub event_log_dir: PathBuf,
    pub capacity: CapacityConfig,
    /// Reject orders whose ingredients exceed branch stock.
    pub inventory_check: bool,
    pub actor_buffer: usize,
    pub actor_shards: usize,
    /// Budget for the whole post-acknowledgement fan-out of one order.
    pub fanout_timeout: Duration,
    /// Attempts after the first for log appends and queue delivery.
    pub retry_max: u32,
    pub sweep_interval: Duration,
    /// Branch used when a request names none.
    pub default_branch: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 8080,
            menu_path: PathBuf::from("menu.json"),
            event_log_dir: PathBuf::from("data"),
            capacity: CapacityConfig::default(),
            inventory_check: false,
            actor_buffer: 256,
            actor_shards: 4,
            fanout_timeout: Duration::from_millis(5_000),
            retry_max: 3,
            sweep_interval: Duration::from_millis(1_000),
            default_branch: "main".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source; unset or empty values fall
    /// back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        let capacity = CapacityConfig::default();
        let prep = PrepTimeModel::default();

        let config = Self {
            http_port: parse(&var, "HTTP_PORT", defaults.http_port)?,
            menu_path: var("MENU_PATH").map(PathBuf::from).unwrap_or(defaults.menu_path),
            event_log_dir: var("EVENT_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.event_log_dir),
            capacity: CapacityConfig {
                opening: time(&var, "OPENING_TIME", capacity.opening)?,
                closing: time(&var, "CLOSING_TIME", capacity.closing)?,
                slot_minutes: parse(&var, "SLOT_MINUTES", capacity.slot_minutes)?,
                max_orders_per_slot: parse(&var, "SLOT_MAX_ORDERS", capacity.max_orders_per_slot)?,
                max_items_per_slot: parse(&var, "SLOT_MAX_ITEMS", capacity.max_items_per_slot)?,
                utc_offset_minutes: parse(&var, "UTC_OFFSET_MINUTES", capacity.utc_offset_minutes)?,
                prep: PrepTimeModel {
                    base_minutes: parse(&var, "PREP_BASE_MINUTES", prep.base_minutes)?,
                    per_item_minutes: parse(&var, "PREP_PER_ITEM_MINUTES", prep.per_item_minutes)?,
                    value_step: parse(&var, "PREP_VALUE_STEP", prep.value_step)?,
                    per_value_step_minutes: parse(
                        &var,
                        "PREP_PER_VALUE_STEP_MINUTES",
                        prep.per_value_step_minutes,
                    )?,
                },
            },
            inventory_check: flag(&var, "INVENTORY_CHECK", defaults.inventory_check)?,
            actor_buffer: parse(&var, "ACTOR_BUFFER", defaults.actor_buffer)?,
            actor_shards: parse(&var, "ACTOR_SHARDS", defaults.actor_shards)?,
            fanout_timeout: millis(&var, "FANOUT_TIMEOUT_MS", defaults.fanout_timeout)?,
            retry_max: parse(&var, "RETRY_MAX", defaults.retry_max)?,
            sweep_interval: millis(&var, "SWEEP_INTERVAL_MS", defaults.sweep_interval)?,
            default_branch: var("DEFAULT_BRANCH").unwrap_or(defaults.default_branch),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.capacity.validate()?;
        if self.capacity.prep.value_step.is_sign_negative() {
            return Err(ConfigError::Inconsistent("PREP_VALUE_STEP must not be negative".into()));
        }
        if self.actor_buffer == 0 || self.actor_shards == 0 {
            return Err(ConfigError::Inconsistent(
                "actor buffer and shard count must be positive".into(),
            ));
        }
        if self.sweep_interval.is_zero() {
            return Err(ConfigError::Inconsistent("SWEEP_INTERVAL_MS must be positive".into()));
        }
        Ok(())
    }

    pub fn order_log_path(&self) -> PathBuf {
        self.event_log_dir.join("orders.log")
    }

    pub fn audit_log_path(&self) -> PathBuf {
        self.event_log_dir.join("audit.log")
    }
}

fn parse<T: FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match var(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

fn time(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: NaiveTime,
) -> Result<NaiveTime, ConfigError> {
    match var(name) {
        Some(value) => NaiveTime::parse_from_str(value.trim(), "%H:%M")
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

fn millis(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    parse(var, name, default.as_millis() as u64).map(Duration::from_millis)
}

fn flag(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: bool,
) -> Result<bool, ConfigError> {
    match var(name) {
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid { name, value }),
        },
        None => Ok(default),
    }
}
