//! Instance-scoped logger that keeps credentials out of log output

use log::Level;
use serde_json::{Map, Value};
use std::fmt::Display;

const MASK: &str = "********";

/// Default log target for the bridge
pub const DEFAULT_TARGET: &str = "onedrive_fs_bridge";

/// Keys masked by default: the access token and the connection blob carrying it
pub const DEFAULT_FORBIDDEN_KEYS: &[&str] = &["access_token", "onedrive_credentials"];

/// Logger handed to the provider and the drive client at construction.
///
/// Routes through the `log` facade under its own target, so the host decides the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeLogger {
    target: String,
    forbidden_keys: Vec<String>,
}

impl Default for SafeLogger {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET, DEFAULT_FORBIDDEN_KEYS)
    }
}

impl SafeLogger {
    /// Logger masking `forbidden_keys` on top of `DEFAULT_FORBIDDEN_KEYS`
    pub fn new(target: &str, forbidden_keys: &[&str]) -> Self {
        let mut keys: Vec<String> = DEFAULT_FORBIDDEN_KEYS
            .iter()
            .map(|k| k.to_string())
            .collect();
        for &key in forbidden_keys {
            if !keys.iter().any(|k| k == key) {
                keys.push(key.to_string());
            }
        }
        Self {
            target: target.to_string(),
            forbidden_keys: keys,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    fn log(&self, level: Level, message: impl Display) {
        log::log!(target: self.target.as_str(), level, "{}", message);
    }

    pub fn debug(&self, message: impl Display) {
        self.log(Level::Debug, message);
    }

    pub fn info(&self, message: impl Display) {
        self.log(Level::Info, message);
    }

    pub fn warn(&self, message: impl Display) {
        self.log(Level::Warn, message);
    }

    pub fn error(&self, message: impl Display) {
        self.log(Level::Error, message);
    }

    /// Copy of `value` with every forbidden key masked, at any depth
    pub fn filter_secrets(&self, value: &Value) -> Value {
        match value {
            Value::Object(map) => {
                let filtered: Map<String, Value> = map
                    .iter()
                    .map(|(key, inner)| {
                        if self.forbidden_keys.iter().any(|k| k == key) {
                            (key.clone(), Value::String(MASK.to_string()))
                        } else {
                            (key.clone(), self.filter_secrets(inner))
                        }
                    })
                    .collect();
                Value::Object(filtered)
            }
            Value::Array(items) => {
                Value::Array(items.iter().map(|v| self.filter_secrets(v)).collect())
            }
            other => other.clone(),
        }
    }
}
