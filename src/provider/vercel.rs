use log::{debug, info, warn};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use super::{
    AddDomainRequest, DnsRecommendation, DnsVerification, DomainConfig, DomainName,
    ProjectDomain, RemoveOutcome, VercelError,
};
use crate::config::VercelConfig;

pub type Result<T> = std::result::Result<T, VercelError>;

/// Client for the Vercel domain endpoints of a single project.
#[derive(Debug, Clone)]
pub struct VercelClient {
    client: Client,
    config: VercelConfig,
}

impl VercelClient {
    pub fn new(config: VercelConfig) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self { client, config })
    }

    /// Attaches `domain` to the project, on the configured git branch if there is one.
    pub async fn add_domain(&self, domain: &DomainName) -> Result<ProjectDomain> {
        let path = format!("/v10/projects/{}/domains", self.config.project_id);
        let body = AddDomainRequest {
            name: domain.to_string(),
            git_branch: self
                .config
                .git_branch
                .clone()
                .filter(|branch| !branch.is_empty()),
        };

        info!("Adding domain {} to project {}", domain, self.config.project_id);
        let response = self.send(self.request(Method::POST, &path).json(&body)).await?;
        decode(response).await
    }

    /// Fetches the domain's DNS configuration and adds the records it should point at.
    pub async fn dns_verification(&self, domain: &DomainName) -> Result<DnsVerification> {
        let path = format!("/v6/domains/{}/config", domain);
        let response = self.send(self.request(Method::GET, &path)).await?;
        let mut config: DomainConfig = decode(response).await?;

        // Only our recommendation goes back out.
        for key in ["cnames", "aValues", "subdomain"] {
            config.extra.remove(key);
        }

        let (recommendation, subdomain) = DnsRecommendation::for_domain(domain.as_str());
        debug!(
            "Domain {} misconfigured: {:?}, subdomain: {:?}",
            domain,
            config.misconfigured(),
            subdomain
        );
        Ok(DnsVerification {
            config,
            recommendation,
            subdomain,
        })
    }

    /// Calls the deploy hook. The hook's response body is ignored.
    pub async fn redeploy(&self) -> Result<()> {
        let url = self
            .config
            .deployment_url
            .as_deref()
            .ok_or(VercelError::NotConfigured("VERCEL_DEPLOYMENT_URL"))?;

        info!("Triggering redeploy");
        self.send(self.client.get(url)).await?;
        Ok(())
    }

    /// Asks Vercel to re-check the domain's verification challenge.
    ///
    /// A domain that still fails verification comes back as [`VercelError::Api`].
    pub async fn verify_domain(&self, domain: &DomainName) -> Result<ProjectDomain> {
        let path = format!(
            "/v9/projects/{}/domains/{}/verify",
            self.config.project_id, domain
        );
        let response = self
            .send(self.request(Method::POST, &path).json(&serde_json::json!({})))
            .await?;
        decode(response).await
    }

    /// Triggers a verification attempt, then returns the domain as the project sees it.
    ///
    /// The verification outcome is not used; the lookup runs either way.
    pub async fn link_status(&self, domain: &DomainName) -> Result<ProjectDomain> {
        if let Err(e) = self.verify_domain(domain).await {
            warn!("Verification of {} failed, fetching status anyway: {}", domain, e);
        }

        let path = format!("/v9/projects/{}/domains/{}", self.config.project_id, domain);
        let response = self.send(self.request(Method::GET, &path)).await?;
        let status: ProjectDomain = decode(response).await?;
        debug!("Domain {} verified: {:?}", status.name, status.verified());
        Ok(status)
    }

    /// Detaches `domain` from the project unless it is one of the site's own domains.
    pub async fn remove_domain(&self, domain: &DomainName) -> Result<RemoveOutcome> {
        if self.config.is_protected(domain.as_str()) {
            info!("Domain {} is protected, not removing", domain);
            return Ok(RemoveOutcome::Protected);
        }

        let path = format!("/v9/projects/{}/domains/{}", self.config.project_id, domain);
        info!("Removing domain {} from project {}", domain, self.config.project_id);
        self.send(self.request(Method::DELETE, &path)).await?;
        Ok(RemoveOutcome::Removed)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.config.api_base.trim_end_matches('/'), path);
        debug!("{} {}", method, url);

        let mut builder = self
            .client
            .request(method, &url)
            .header("Authorization", format!("Bearer {}", self.config.api_token));
        if let Some(team_id) = &self.config.team_id {
            builder = builder.query(&[("teamId", team_id)]);
        }
        builder
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        debug!("Response Status: {}", status);

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(VercelError::from_response(status.as_u16(), &body))
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| VercelError::Decode(e.to_string()))
}
