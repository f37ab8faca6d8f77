pub mod dns;
pub mod error;
pub mod vercel;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use dns::DnsRecommendation;
pub use error::VercelError;

/// A domain name that is safe to interpolate into an API path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainName(String);

impl DomainName {
    pub fn parse(raw: &str) -> Result<Self, VercelError> {
        let name = raw.trim().trim_end_matches('.').to_ascii_lowercase();
        let bad_char = |c: char| c.is_whitespace() || matches!(c, '/' | '?' | '#' | '%');
        if name.is_empty() || name.chars().any(bad_char) {
            return Err(VercelError::InvalidDomain(raw.to_string()));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Serialize)]
pub struct AddDomainRequest {
    pub name: String,
    #[serde(rename = "gitBranch", skip_serializing_if = "Option::is_none")]
    pub git_branch: Option<String>,
}

/// A domain attached to a project, as returned by the `/projects/{id}/domains` endpoints.
///
/// Only `name` is modelled; every other field, `null`s included, stays in `extra`
/// so the body passes through unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDomain {
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectDomain {
    pub fn verified(&self) -> Option<bool> {
        self.extra.get("verified").and_then(Value::as_bool)
    }
}

/// Body of `/v6/domains/{domain}/config`, kept as received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainConfig {
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DomainConfig {
    pub fn misconfigured(&self) -> Option<bool> {
        self.extra.get("misconfigured").and_then(Value::as_bool)
    }
}

/// DNS configuration of a domain together with the records we recommend for it.
#[derive(Debug, Clone, Serialize)]
pub struct DnsVerification {
    #[serde(flatten)]
    pub config: DomainConfig,
    #[serde(flatten)]
    pub recommendation: DnsRecommendation,
    pub subdomain: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoveOutcome {
    Removed,
    /// The domain is on the protected list; nothing was sent.
    Protected,
}
