//! Log configuration from TOML (`[log]` section)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLogConfig {
    /// Write logs to this file instead of stderr
    pub file: Option<String>,
}
