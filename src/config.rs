//! Configuration for the board client.
//!
//! Settings are layered file → environment → CLI. The file is TOML:
//!
//! ```toml
//! [api]
//! base_url = "https://crm.example.com/api"
//! token = "..."
//! timeout_secs = 30
//!
//! [board]
//! module = "leads"
//! rollback = "refetch"
//! ```
//!
//! Lookup order for the file: an explicit `--config` path, `./crm-board.toml`,
//! then `<config dir>/crm-board/config.toml`. A missing file is not an error.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crm_common::Module;

use crate::client::RequestContext;
use crate::session::RollbackPolicy;

pub const LOCAL_CONFIG_FILE: &str = "crm-board.toml";

pub const ENV_API_URL: &str = "CRM_API_URL";
pub const ENV_API_TOKEN: &str = "CRM_API_TOKEN";
pub const ENV_MODULE: &str = "CRM_BOARD_MODULE";

/// `[api]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSection {
    /// Backend base URL; endpoint paths are appended to it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Bearer token. Requests are sent unauthenticated without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: None,
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// `[board]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardSection {
    #[serde(default)]
    pub module: Module,
    #[serde(default)]
    pub rollback: RollbackPolicy,
}

/// The complete crm-board.toml structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardToml {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub board: BoardSection,
}

impl BoardToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse crm-board.toml")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize crm-board.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Overlay values from the environment. `lookup` is `std::env::var` in
    /// production and a map in tests.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api.base_url = Some(url);
        }
        if let Some(token) = lookup(ENV_API_TOKEN) {
            self.api.token = Some(token);
        }
        if let Some(module) = lookup(ENV_MODULE) {
            self.board.module = module.parse().map_err(anyhow::Error::msg)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        match self.api.base_url.as_deref() {
            None => warnings.push(format!(
                "No API base URL configured: set [api].base_url, {} or --api-url",
                ENV_API_URL
            )),
            Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                warnings.push(format!("API base URL '{}' is not an http(s) URL", url))
            }
            Some(_) => {}
        }
        if self.api.timeout_secs == 0 {
            warnings.push("timeout_secs is 0; every request will time out".to_string());
        }
        warnings
    }
}

/// Flags that override file and environment settings.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub api_url: Option<String>,
    pub token: Option<String>,
    pub module: Option<Module>,
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// File the settings were read from, if any.
    pub source: Option<PathBuf>,
    pub toml: BoardToml,
}

impl BoardConfig {
    /// Resolve configuration from the default file locations, the process
    /// environment and `overrides`.
    pub fn resolve(overrides: &CliOverrides) -> Result<Self> {
        let source = find_config_file(overrides.config_path.as_deref(), Path::new("."))?;
        let mut toml = match &source {
            Some(path) => BoardToml::load(path)?,
            None => BoardToml::default(),
        };
        toml.apply_env(|key| std::env::var(key).ok())?;
        let mut config = Self { source, toml };
        config.apply_overrides(overrides);
        Ok(config)
    }

    pub fn apply_overrides(&mut self, overrides: &CliOverrides) {
        if let Some(url) = &overrides.api_url {
            self.toml.api.base_url = Some(url.clone());
        }
        if let Some(token) = &overrides.token {
            self.toml.api.token = Some(token.clone());
        }
        if let Some(module) = overrides.module {
            self.toml.board.module = module;
        }
    }

    pub fn base_url(&self) -> Result<&str> {
        match self.toml.api.base_url.as_deref() {
            Some(url) if !url.trim().is_empty() => Ok(url),
            _ => bail!(
                "No API base URL configured. Set [api].base_url in {}, {} or pass --api-url",
                LOCAL_CONFIG_FILE,
                ENV_API_URL
            ),
        }
    }

    pub fn module(&self) -> Module {
        self.toml.board.module
    }

    pub fn rollback(&self) -> RollbackPolicy {
        self.toml.board.rollback
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.toml.api.timeout_secs)
    }

    pub fn request_context(&self) -> RequestContext {
        match &self.toml.api.token {
            Some(token) => RequestContext::with_token(token.clone()),
            None => RequestContext::anonymous(),
        }
    }
}

/// Pick the config file: `explicit` (must exist), then `cwd/crm-board.toml`,
/// then the per-user config directory.
pub fn find_config_file(explicit: Option<&Path>, cwd: &Path) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.exists() {
            bail!("Config file not found: {}", path.display());
        }
        return Ok(Some(path.to_path_buf()));
    }
    let local = cwd.join(LOCAL_CONFIG_FILE);
    if local.exists() {
        return Ok(Some(local));
    }
    Ok(user_config_file().filter(|p| p.exists()))
}

pub fn user_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("crm-board").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let toml = BoardToml::default();
        assert!(toml.api.base_url.is_none());
        assert_eq!(toml.api.timeout_secs, 30);
        assert_eq!(toml.board.module, Module::Leads);
        assert_eq!(toml.board.rollback, RollbackPolicy::Refetch);
    }

    #[test]
    fn test_parse_full_file() {
        let content = r#"
[api]
base_url = "https://crm.example.com/api"
token = "abc"
timeout_secs = 5

[board]
module = "opportunities"
rollback = "inverse"
"#;
        let toml = BoardToml::parse(content).unwrap();
        assert_eq!(toml.api.base_url.as_deref(), Some("https://crm.example.com/api"));
        assert_eq!(toml.api.token.as_deref(), Some("abc"));
        assert_eq!(toml.api.timeout_secs, 5);
        assert_eq!(toml.board.module, Module::Opportunities);
        assert_eq!(toml.board.rollback, RollbackPolicy::Inverse);
    }

    #[test]
    fn test_parse_partial_file_keeps_defaults() {
        let toml = BoardToml::parse("[board]\nmodule = \"leads\"\n").unwrap();
        assert_eq!(toml.api.timeout_secs, 30);
        assert_eq!(toml.board.rollback, RollbackPolicy::Refetch);
    }

    #[test]
    fn test_parse_rejects_unknown_module() {
        assert!(BoardToml::parse("[board]\nmodule = \"contacts\"\n").is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut toml = BoardToml::parse("[api]\nbase_url = \"http://file\"\n").unwrap();
        toml.apply_env(env(&[
            (ENV_API_URL, "http://env"),
            (ENV_API_TOKEN, "t0k"),
            (ENV_MODULE, "opportunities"),
        ]))
        .unwrap();
        assert_eq!(toml.api.base_url.as_deref(), Some("http://env"));
        assert_eq!(toml.api.token.as_deref(), Some("t0k"));
        assert_eq!(toml.board.module, Module::Opportunities);
    }

    #[test]
    fn test_env_blank_url_is_ignored_and_bad_module_errors() {
        let mut toml = BoardToml::parse("[api]\nbase_url = \"http://file\"\n").unwrap();
        toml.apply_env(env(&[(ENV_API_URL, "  ")])).unwrap();
        assert_eq!(toml.api.base_url.as_deref(), Some("http://file"));

        let err = toml.apply_env(env(&[(ENV_MODULE, "tickets")])).unwrap_err();
        assert!(err.to_string().contains("Invalid module"));
    }

    #[test]
    fn test_cli_overrides_win() {
        let mut config = BoardConfig {
            source: None,
            toml: BoardToml::parse("[api]\nbase_url = \"http://file\"\ntoken = \"file\"\n").unwrap(),
        };
        config.apply_overrides(&CliOverrides {
            api_url: Some("http://cli".into()),
            token: Some("cli".into()),
            module: Some(Module::Opportunities),
            ..Default::default()
        });
        assert_eq!(config.base_url().unwrap(), "http://cli");
        assert_eq!(config.module(), Module::Opportunities);
        assert!(config.request_context().is_authenticated());
    }

    #[test]
    fn test_missing_base_url_is_an_error() {
        let config = BoardConfig {
            source: None,
            toml: BoardToml::default(),
        };
        let err = config.base_url().unwrap_err();
        assert!(err.to_string().contains("No API base URL"));
        assert!(!config.request_context().is_authenticated());
    }

    #[test]
    fn test_validate_warnings() {
        assert_eq!(BoardToml::default().validate().len(), 1);
        let toml = BoardToml::parse("[api]\nbase_url = \"ftp://x\"\ntimeout_secs = 0\n").unwrap();
        assert_eq!(toml.validate().len(), 2);
        let ok = BoardToml::parse("[api]\nbase_url = \"https://x\"\n").unwrap();
        assert!(ok.validate().is_empty());
    }

    #[test]
    fn test_find_config_file_prefers_explicit_then_local() {
        let dir = tempdir().unwrap();
        assert!(find_config_file(Some(&dir.path().join("nope.toml")), dir.path()).is_err());

        let local = dir.path().join(LOCAL_CONFIG_FILE);
        std::fs::write(&local, "").unwrap();
        assert_eq!(find_config_file(None, dir.path()).unwrap(), Some(local.clone()));

        let explicit = dir.path().join("other.toml");
        std::fs::write(&explicit, "").unwrap();
        assert_eq!(
            find_config_file(Some(&explicit), dir.path()).unwrap(),
            Some(explicit)
        );
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(LOCAL_CONFIG_FILE);
        let mut toml = BoardToml::default();
        toml.api.base_url = Some("https://crm.example.com".into());
        toml.board.rollback = RollbackPolicy::Inverse;
        toml.save(&path).unwrap();

        let loaded = BoardToml::load(&path).unwrap();
        assert_eq!(loaded.api.base_url.as_deref(), Some("https://crm.example.com"));
        assert_eq!(loaded.board.rollback, RollbackPolicy::Inverse);
        assert!(loaded.api.token.is_none());
    }
}
