use anyhow::Context;
use bon::Builder;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

#[derive(Builder, Serialize, Deserialize, Debug, Clone, Eq, PartialEq)]
pub struct EngineConfig {
    /// How long an asynchronous leave-before answer may stay pending before
    /// it counts as a veto. Unbounded when absent.
    #[serde(default)]
    pub leave_check_timeout_ms: Option<u64>,
    /// Whether the adapter's global input gate is toggled around operations.
    #[serde(default = "default_gate_input")]
    #[builder(default = true)]
    pub gate_input: bool,
}

fn default_gate_input() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig::builder().build()
    }
}

impl EngineConfig {
    pub fn leave_check_timeout(&self) -> Option<Duration> {
        self.leave_check_timeout_ms.map(Duration::from_millis)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(EngineConfig::default());
        }
        let mut file = OpenOptions::new()
            .read(true)
            .open(path)
            .context("Failed to open config file")?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context("Failed to read config file")?;
        if content.trim().is_empty() {
            Ok(EngineConfig::default())
        } else {
            serde_json::from_str(&content).context("Failed to parse config json")
        }
    }
}
