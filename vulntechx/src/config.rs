use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Per sub-command overrides.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct ModeConfig {
    pub parallel: Option<i64>,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct Config {
    pub parallel: Option<i64>,
    /// Shell command that turns a host list into JSON records.
    pub detector: Option<String>,
    pub wordlist_dir: Option<PathBuf>,
    pub nuclei: Option<ModeConfig>,
    pub httpx: Option<ModeConfig>,
    pub run: Option<ModeConfig>,
}

impl Config {
    pub fn mode(&self, name: &str) -> Option<&ModeConfig> {
        match name {
            "nuclei" => self.nuclei.as_ref(),
            "httpx" => self.httpx.as_ref(),
            "run" => self.run.as_ref(),
            _ => None,
        }
    }
}

/// Load an explicit config file, or `./vulntechx.yaml` when present.
///
/// Problems with the implicit file are ignored; problems with an explicit
/// one are errors.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        let p = Path::new("vulntechx.yaml");
        if !p.exists() {
            return Ok(Config::default());
        }
        return Ok(fs::read_to_string(p)
            .ok()
            .and_then(|s| serde_yaml::from_str(&s).ok())
            .unwrap_or_default());
    };
    let s = fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    serde_yaml::from_str(&s).with_context(|| format!("parsing config {}", path.display()))
}
