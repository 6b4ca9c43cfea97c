//! Publishing subsystem settings.

use std::time::Duration;

use publish_core::Account;
use serde::{Deserialize, Serialize};

use crate::error::{PublishError, PublishResult};

/// What a publish run does once it notices it was forced to finish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelBehavior {
    /// Abort the run with an error so no completion bookkeeping happens.
    #[default]
    HardStop,
    /// Stop processing items and let the run complete normally.
    Soft,
}

impl std::str::FromStr for CancelBehavior {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hard_stop" | "hard" => Ok(CancelBehavior::HardStop),
            "soft" => Ok(CancelBehavior::Soft),
            other => Err(format!("unknown cancel behavior '{}'", other)),
        }
    }
}

/// Settings for the publishing subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishSettings {
    /// Log a trace of every processed item.
    pub trace_to_log: bool,
    /// How a canceled run stops.
    pub cancel_behavior: CancelBehavior,
    /// Job list refresh interval (milliseconds).
    pub refresh_interval_ms: u64,
    /// Allow non-administrators to cancel jobs.
    pub cancel_button_enabled: bool,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            trace_to_log: false,
            cancel_behavior: CancelBehavior::HardStop,
            refresh_interval_ms: 3000,
            cancel_button_enabled: false,
        }
    }
}

fn parse_bool(name: &str, value: &str) -> PublishResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(PublishError::InvalidSettings {
            name: name.to_string(),
            reason: format!("expected a boolean, got '{}'", value),
        }),
    }
}

impl PublishSettings {
    /// Load settings from `PUBLISH_*` environment variables.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> PublishResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings from a JSON document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> PublishResult<Self> {
        serde_json::from_str(json).map_err(|e| PublishError::InvalidSettings {
            name: "json".to_string(),
            reason: e.to_string(),
        })
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> PublishResult<Self> {
        let mut settings = Self::default();

        if let Some(value) = lookup("PUBLISH_TRACE_TO_LOG") {
            settings.trace_to_log = parse_bool("PUBLISH_TRACE_TO_LOG", &value)?;
        }
        if let Some(value) = lookup("PUBLISH_CANCEL_BEHAVIOR") {
            settings.cancel_behavior =
                value
                    .parse()
                    .map_err(|reason| PublishError::InvalidSettings {
                        name: "PUBLISH_CANCEL_BEHAVIOR".to_string(),
                        reason,
                    })?;
        }
        if let Some(value) = lookup("PUBLISH_REFRESH_MS") {
            settings.refresh_interval_ms =
                value
                    .trim()
                    .parse()
                    .map_err(|e: std::num::ParseIntError| PublishError::InvalidSettings {
                        name: "PUBLISH_REFRESH_MS".to_string(),
                        reason: e.to_string(),
                    })?;
        }
        if let Some(value) = lookup("PUBLISH_CANCEL_BUTTON") {
            settings.cancel_button_enabled = parse_bool("PUBLISH_CANCEL_BUTTON", &value)?;
        }

        Ok(settings)
    }

    /// Enable or disable per-item tracing.
    pub fn with_trace_to_log(mut self, trace_to_log: bool) -> Self {
        self.trace_to_log = trace_to_log;
        self
    }

    /// Set the cancel behavior.
    pub fn with_cancel_behavior(mut self, cancel_behavior: CancelBehavior) -> Self {
        self.cancel_behavior = cancel_behavior;
        self
    }

    /// Set the job list refresh interval.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Enable or disable cancelling for non-administrators.
    pub fn with_cancel_button(mut self, enabled: bool) -> Self {
        self.cancel_button_enabled = enabled;
        self
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms.max(1))
    }

    /// Check whether `account` may cancel publishing jobs.
    pub fn can_cancel(&self, account: &Account) -> bool {
        self.cancel_button_enabled || account.is_administrator
    }
}
