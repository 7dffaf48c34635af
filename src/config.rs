//! Runtime configuration for the dispatch pipeline.
//!
//! Every field has a default matching the stock front end, so a partial JSON
//! override (or none at all) yields a working configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::theme::Theme;
use crate::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawcastConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u32,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u32,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default = "default_canvas_size")]
    pub canvas_size: u32,
    #[serde(default = "default_brush_width")]
    pub brush_width: f64,
    #[serde(default)]
    pub theme: Theme,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_debounce_ms() -> u32 {
    500
}

fn default_poll_interval_ms() -> u32 {
    5_000
}

fn default_history_limit() -> usize {
    50
}

fn default_canvas_size() -> u32 {
    280
}

fn default_brush_width() -> f64 {
    15.0
}

impl Default for DrawcastConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            debounce_ms: default_debounce_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            history_limit: default_history_limit(),
            canvas_size: default_canvas_size(),
            brush_width: default_brush_width(),
            theme: Theme::default(),
        }
    }
}

impl DrawcastConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let cfg: DrawcastConfig = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("base_url must not be empty".into()));
        }
        if self.debounce_ms == 0 {
            return Err(ConfigError::Invalid("debounce_ms must be > 0".into()));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll_interval_ms must be > 0".into()));
        }
        if self.history_limit == 0 {
            return Err(ConfigError::Invalid("history_limit must be > 0".into()));
        }
        if self.canvas_size == 0 {
            return Err(ConfigError::Invalid("canvas_size must be > 0".into()));
        }
        if !(self.brush_width.is_finite() && self.brush_width > 0.0) {
            return Err(ConfigError::Invalid("brush_width must be > 0".into()));
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms as u64)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms as u64)
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints::new(&self.base_url)
    }
}

/// Absolute URLs of the backend routes the front end talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: String,
}

impl Endpoints {
    pub fn new(base_url: &str) -> Self {
        Self {
            base: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn predict_url(&self) -> String {
        format!("{}/predict", self.base)
    }

    pub fn predict_batch_url(&self) -> String {
        format!("{}/predict_batch", self.base)
    }

    pub fn history_url(&self) -> String {
        format!("{}/history", self.base)
    }

    /// CSV download of the caller's prediction history.
    pub fn export_url(&self) -> String {
        format!("{}/export", self.base)
    }
}
