use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScenarioError};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Largest scenario (in blocks) accepted for resolution.
    #[serde(default = "default_max_blocks")]
    pub max_blocks: usize,
    /// Largest number of edges accepted for resolution.
    #[serde(default = "default_max_edges")]
    pub max_edges: usize,
    /// Deadline for one resolution pass.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Broadcast buffer for resolution events.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_blocks: default_max_blocks(),
            max_edges: default_max_edges(),
            timeout_ms: default_timeout_ms(),
            event_capacity: default_event_capacity(),
        }
    }
}

fn default_max_blocks() -> usize { 1000 }
fn default_max_edges() -> usize { 5000 }
fn default_timeout_ms() -> u64 { 5000 }
fn default_event_capacity() -> usize { 256 }

/// Severity choices for structural validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Blocks with no edges at all fail validation (otherwise a warning).
    #[serde(default = "default_isolated_blocks_are_errors")]
    pub isolated_blocks_are_errors: bool,
    /// More than one entry block fails validation (otherwise a warning).
    #[serde(default)]
    pub multiple_starts_are_errors: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            isolated_blocks_are_errors: default_isolated_blocks_are_errors(),
            multiple_starts_are_errors: false,
        }
    }
}

fn default_isolated_blocks_are_errors() -> bool { true }

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Fallback `EnvFilter` directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String { "scenario=info,warn".to_string() }

impl AppConfig {
    /// Load config from a TOML file, with env var expansion.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| ScenarioError::ConfigNotFound(path.display().to_string()))?;

        // Expand ${ENV_VAR} references
        let expanded = expand_env_vars(&content);

        toml::from_str(&expanded).map_err(|e| ScenarioError::Config(e.to_string()))
    }

    /// Load config if the file exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }
}

/// Expand `${ENV_VAR}` patterns in a string.
fn expand_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            let mut var_name = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                var_name.push(c);
            }
            match std::env::var(&var_name) {
                Ok(val) => result.push_str(&val),
                // Keep original if env var not set
                Err(_) => result.push_str(&format!("${{{}}}", var_name)),
            }
        } else {
            result.push(c);
        }
    }
    result
}
