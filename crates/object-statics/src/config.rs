//! Demonstration run configuration.
//!
//! Defaults reproduce the zero-argument run: every block, text output, no
//! event stream. A JSON file may override any subset of fields.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_TRACE_ID: &str = "object-statics-demo";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemoConfig {
    pub trace_id: String,
    pub format: OutputFormat,
    /// Append structured log events as JSON lines after the transcript.
    pub emit_events: bool,
    /// Blocks to run, by name; empty runs all of them.
    pub blocks: Vec<String>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            trace_id: DEFAULT_TRACE_ID.to_string(),
            format: OutputFormat::Text,
            emit_events: false,
            blocks: Vec::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("trace_id must not be empty")]
    EmptyTraceId,
    #[error("unknown demo block `{name}` (known: {known})")]
    UnknownBlock { name: String, known: String },
}

impl DemoConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Check the trace id and that every selected block exists.
    pub fn validate(&self, known_blocks: &[&str]) -> Result<(), ConfigError> {
        if self.trace_id.trim().is_empty() {
            return Err(ConfigError::EmptyTraceId);
        }
        if let Some(name) = self
            .blocks
            .iter()
            .find(|name| !known_blocks.contains(&name.as_str()))
        {
            return Err(ConfigError::UnknownBlock {
                name: name.clone(),
                known: known_blocks.join(", "),
            });
        }
        Ok(())
    }

    pub fn selects(&self, block: &str) -> bool {
        self.blocks.is_empty() || self.blocks.iter().any(|b| b == block)
    }
}
