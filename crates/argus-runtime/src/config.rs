use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_listen_port() -> u16 {
    4242
}
fn default_full_reconcile_interval_secs() -> u64 {
    5
}
fn default_fast_activity_interval_secs() -> u64 {
    3
}
fn default_claude_active_threshold_secs() -> u64 {
    5 * 60
}
fn default_openclaw_active_threshold_secs() -> u64 {
    30 * 60
}
fn default_idle_timeout_secs() -> u64 {
    2 * 60
}
fn default_stale_project_ttl_secs() -> u64 {
    30 * 60
}
fn default_stale_blocked_main_ttl_secs() -> u64 {
    5 * 60
}
fn default_completed_work_capacity() -> usize {
    20
}
fn default_completed_work_ttl_secs() -> u64 {
    5 * 60
}

/// Recognized configuration options, layered CLI flag > TOML file > built-in
/// defaults. A missing config file is not an error; a malformed one is fatal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
    #[serde(default)]
    pub claude_projects_root: Option<PathBuf>,
    #[serde(default)]
    pub openclaw_agents_root: Option<PathBuf>,
    #[serde(default = "default_full_reconcile_interval_secs")]
    pub full_reconcile_interval_secs: u64,
    #[serde(default = "default_fast_activity_interval_secs")]
    pub fast_activity_interval_secs: u64,
    #[serde(default = "default_claude_active_threshold_secs")]
    pub claude_active_threshold_secs: u64,
    #[serde(default = "default_openclaw_active_threshold_secs")]
    pub openclaw_active_threshold_secs: u64,
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_stale_project_ttl_secs")]
    pub stale_project_ttl_secs: u64,
    #[serde(default = "default_stale_blocked_main_ttl_secs")]
    pub stale_blocked_main_ttl_secs: u64,
    #[serde(default = "default_completed_work_capacity")]
    pub completed_work_capacity: usize,
    #[serde(default = "default_completed_work_ttl_secs")]
    pub completed_work_ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_port: default_listen_port(),
            claude_projects_root: None,
            openclaw_agents_root: None,
            full_reconcile_interval_secs: default_full_reconcile_interval_secs(),
            fast_activity_interval_secs: default_fast_activity_interval_secs(),
            claude_active_threshold_secs: default_claude_active_threshold_secs(),
            openclaw_active_threshold_secs: default_openclaw_active_threshold_secs(),
            idle_timeout_secs: default_idle_timeout_secs(),
            stale_project_ttl_secs: default_stale_project_ttl_secs(),
            stale_blocked_main_ttl_secs: default_stale_blocked_main_ttl_secs(),
            completed_work_capacity: default_completed_work_capacity(),
            completed_work_ttl_secs: default_completed_work_ttl_secs(),
        }
    }
}

impl Config {
    /// Load with the documented layering: an explicit `--config` path wins outright;
    /// failing that, `$ARGUS_HOME/config.toml` (default `~/.argus/config.toml`); a missing
    /// file falls back to built-in defaults, a malformed one is a fatal `Error::Toml`.
    pub fn load(explicit_path: Option<&str>) -> Result<Self> {
        let path = match explicit_path {
            Some(p) => argus_core::path::expand_tilde(p),
            None => Self::default_path()?,
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn default_path() -> Result<PathBuf> {
        let home = argus_core::resolve_argus_home(None)
            .map_err(|e| Error::Config(format!("could not resolve argus home: {e}")))?;
        Ok(home.join("config.toml"))
    }

    pub fn claude_root(&self) -> Result<PathBuf> {
        match &self.claude_projects_root {
            Some(path) => Ok(path.clone()),
            None => argus_core::default_claude_root()
                .map_err(|e| Error::Config(format!("could not resolve claude root: {e}"))),
        }
    }

    pub fn openclaw_root(&self) -> Result<PathBuf> {
        match &self.openclaw_agents_root {
            Some(path) => Ok(path.clone()),
            None => argus_core::default_openclaw_root()
                .map_err(|e| Error::Config(format!("could not resolve openclaw root: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_matches_documented_defaults() {
        let config = Config::default();
        assert_eq!(config.listen_port, 4242);
        assert_eq!(config.full_reconcile_interval_secs, 5);
        assert_eq!(config.fast_activity_interval_secs, 3);
        assert_eq!(config.idle_timeout_secs, 120);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nonexistent.toml");
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.listen_port, 4242);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not valid toml {{{").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn partial_toml_fills_in_remaining_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "listen_port = 9000\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.listen_port, 9000);
        assert_eq!(config.idle_timeout_secs, 120);
    }
}
