//! Compute metadata server client.

use jiff::Timestamp;
use reqwest::header::HeaderValue;

use super::token::{AccessToken, TokenResponse};
use super::{SCOPES, TRACING_TARGET_AUTH};
use crate::{Error, ReqwestClient, Result};

const METADATA_FLAVOR: &str = "Metadata-Flavor";
const METADATA_FLAVOR_VALUE: &str = "Google";

/// Client of the metadata server available on Google Cloud runtimes.
#[derive(Debug, Clone)]
pub struct MetadataServer {
    client: ReqwestClient,
    base_url: String,
}

impl MetadataServer {
    /// Creates a client of the metadata server at `host`.
    ///
    /// `host` is a `host[:port]`; an explicit `http://` base is kept as is.
    pub fn new(client: ReqwestClient, host: &str) -> Self {
        let host = host.trim_end_matches('/');
        let base_url = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_owned()
        } else {
            format!("http://{host}")
        };

        Self { client, base_url }
    }

    /// Returns the URL of a metadata path.
    pub fn url(&self, path: &str) -> String {
        format!("{}/computeMetadata/v1/{path}", self.base_url)
    }

    /// Returns whether a metadata server answers at the configured host.
    pub async fn is_available(&self) -> bool {
        let response = self
            .client
            .http()
            .get(&self.base_url)
            .header(METADATA_FLAVOR, METADATA_FLAVOR_VALUE)
            .send()
            .await;

        match response {
            Ok(response) => {
                response.headers().get(METADATA_FLAVOR)
                    == Some(&HeaderValue::from_static(METADATA_FLAVOR_VALUE))
            }
            Err(error) => {
                tracing::debug!(
                    target: TRACING_TARGET_AUTH,
                    error = %error,
                    base_url = %self.base_url,
                    "Metadata server is not reachable"
                );
                false
            }
        }
    }

    /// Fetches an access token of the default service account.
    pub async fn token(&self) -> Result<AccessToken> {
        let issued_at = Timestamp::now();
        let response = self
            .client
            .http()
            .get(self.url("instance/service-accounts/default/token"))
            .query(&[("scopes", SCOPES.join(","))])
            .header(METADATA_FLAVOR, METADATA_FLAVOR_VALUE)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::TokenEndpoint {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.into_token(issued_at))
    }

    /// Fetches the id of the project the runtime belongs to.
    pub async fn project_id(&self) -> Result<String> {
        let response = self
            .client
            .http()
            .get(self.url("project/project-id"))
            .header(METADATA_FLAVOR, METADATA_FLAVOR_VALUE)
            .send()
            .await?
            .error_for_status()?;

        let project = response.text().await?;
        let project = project.trim();
        if project.is_empty() {
            return Err(Error::MissingProject);
        }

        Ok(project.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReqwestConfig;

    fn server(host: &str) -> MetadataServer {
        MetadataServer::new(ReqwestClient::new(ReqwestConfig::default()).unwrap(), host)
    }

    #[test]
    fn builds_urls_from_bare_host() {
        let server = server("metadata.google.internal");
        assert_eq!(
            server.url("project/project-id"),
            "http://metadata.google.internal/computeMetadata/v1/project/project-id"
        );
    }

    #[test]
    fn keeps_explicit_scheme() {
        let server = server("http://127.0.0.1:8080/");
        assert_eq!(
            server.url("instance/service-accounts/default/token"),
            "http://127.0.0.1:8080/computeMetadata/v1/instance/service-accounts/default/token"
        );
    }
}
