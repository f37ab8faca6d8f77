use anyhow::{bail, Context, Result};
use log::warn;
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_API_BASE: &str = "https://api.vercel.com";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub vercel: VercelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub key: Option<String>, // 访问密钥，用于鉴权（可选）
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            key: None,
        }
    }
}

/// Settings for talking to the Vercel API.
///
/// Loaded once at startup and handed to [`crate::provider::vercel::VercelClient`];
/// nothing reads the environment after that.
#[derive(Debug, Clone, Deserialize)]
pub struct VercelConfig {
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub api_token: String,
    #[serde(default)]
    pub git_branch: Option<String>,
    #[serde(default)]
    pub deployment_url: Option<String>,
    #[serde(default)]
    pub site_domains: Vec<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for VercelConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            team_id: None,
            api_token: String::new(),
            git_branch: None,
            deployment_url: None,
            site_domains: Vec::new(),
            api_base: default_api_base(),
        }
    }
}

impl VercelConfig {
    /// Overrides fields with the `VERCEL_*` / `SITE_DOMAINS` process environment.
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    /// Overrides fields from an arbitrary variable lookup. Unset variables leave the
    /// current value alone.
    pub fn apply_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("VERCEL_PROJECT_ID") {
            self.project_id = v;
        }
        if let Some(v) = lookup("VERCEL_TEAM_ID") {
            self.team_id = non_empty(v);
        }
        if let Some(v) = lookup("VERCEL_API_TOKEN") {
            self.api_token = v;
        }
        if let Some(v) = lookup("VERCEL_GIT_BRANCH") {
            self.git_branch = non_empty(v);
        }
        if let Some(v) = lookup("VERCEL_DEPLOYMENT_URL") {
            self.deployment_url = non_empty(v);
        }
        if let Some(v) = lookup("SITE_DOMAINS") {
            self.site_domains = parse_domain_list(&v);
        }
        if let Some(v) = lookup("VERCEL_API_BASE") {
            if !v.trim().is_empty() {
                self.api_base = v;
            }
        }
    }

    /// Returns true if `domain` is on the protected list.
    pub fn is_protected(&self, domain: &str) -> bool {
        self.site_domains
            .iter()
            .any(|d| d.eq_ignore_ascii_case(domain))
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Splits a comma separated domain list, dropping blanks.
pub fn parse_domain_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Loads `path` if given (it must exist), otherwise `config.toml` when present,
    /// otherwise defaults. The environment is applied on top.
    pub fn load_with_env(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::load_file(path)?;
        config.vercel.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn load_file(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::load(DEFAULT_CONFIG_PATH),
            None => {
                warn!(
                    "No {} found, using defaults and environment variables",
                    DEFAULT_CONFIG_PATH
                );
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.vercel.project_id.trim().is_empty() {
            bail!("Vercel project id is not configured (set VERCEL_PROJECT_ID)");
        }
        if self.vercel.api_token.trim().is_empty() {
            bail!("Vercel API token is not configured (set VERCEL_API_TOKEN)");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn parses_toml_with_defaults() {
        let config: Config = toml::from_str(
            r#"
            [vercel]
            project_id = "prj_123"
            api_token = "secret"
            site_domains = ["example.com"]
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.vercel.api_base, DEFAULT_API_BASE);
        assert!(config.vercel.team_id.is_none());
        assert!(config.vercel.is_protected("example.com"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn env_overrides_file_values() {
        let mut vercel = VercelConfig {
            project_id: "from-file".to_string(),
            api_token: "file-token".to_string(),
            ..Default::default()
        };

        vercel.apply_vars(lookup(&[
            ("VERCEL_PROJECT_ID", "prj_env"),
            ("VERCEL_TEAM_ID", "team_1"),
            ("VERCEL_GIT_BRANCH", "staging"),
            ("SITE_DOMAINS", "a.com, b.com,,"),
        ]));

        assert_eq!(vercel.project_id, "prj_env");
        assert_eq!(vercel.api_token, "file-token");
        assert_eq!(vercel.team_id.as_deref(), Some("team_1"));
        assert_eq!(vercel.git_branch.as_deref(), Some("staging"));
        assert_eq!(vercel.site_domains, vec!["a.com", "b.com"]);
    }

    #[test]
    fn empty_git_branch_clears_override() {
        let mut vercel = VercelConfig {
            git_branch: Some("main".to_string()),
            ..Default::default()
        };
        vercel.apply_vars(lookup(&[("VERCEL_GIT_BRANCH", "")]));
        assert!(vercel.git_branch.is_none());
    }

    #[test]
    fn empty_site_domains_protects_nothing() {
        let mut vercel = VercelConfig::default();
        vercel.apply_vars(lookup(&[("SITE_DOMAINS", "")]));
        assert!(vercel.site_domains.is_empty());
        assert!(!vercel.is_protected(""));
    }

    #[test]
    fn explicit_missing_config_file_is_an_error() {
        let err = Config::load_file(Some(Path::new("/nonexistent/vercel-domains.toml")))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn validate_requires_project_and_token() {
        let config = Config::default();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.vercel.project_id = "prj".to_string();
        assert!(config.validate().is_err());

        config.vercel.api_token = "token".to_string();
        assert!(config.validate().is_ok());
    }
}
