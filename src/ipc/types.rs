use std::path::PathBuf;

use serde::Deserialize;

use crate::config::Config;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub config: Config,
    pub workspace: Option<PathBuf>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            workspace: None,
        }
    }

    /// Selected workspace, else the configured output directory.
    pub fn output_root(&self) -> PathBuf {
        self.workspace
            .clone()
            .unwrap_or_else(|| self.config.output_dir.clone())
    }
}
