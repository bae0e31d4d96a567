//! Authenticated Earth Engine REST client.

use geomean_core::ProjectId;
use geomean_reqwest::{AccessToken, ReqwestClient};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::wire::ErrorBody;
use crate::{EarthEngineConfig, Error, Result, TRACING_TARGET_CLIENT};

/// Earth Engine client bound to one project and one access token.
///
/// A client is created per session and never refreshes its token; sessions
/// are expected to be shorter than the token lifetime.
#[derive(Debug, Clone)]
pub struct EarthEngineClient {
    http: ReqwestClient,
    config: EarthEngineConfig,
    project: ProjectId,
    token: AccessToken,
}

impl EarthEngineClient {
    /// Creates a client for `project` authenticating with `token`.
    pub fn new(
        http: ReqwestClient,
        config: EarthEngineConfig,
        project: ProjectId,
        token: AccessToken,
    ) -> Result<Self> {
        config.validate()?;

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            base_url = %config.base_url,
            project = %project,
            "Creating Earth Engine client"
        );

        Ok(Self {
            http,
            config,
            project,
            token,
        })
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &EarthEngineConfig {
        &self.config
    }

    /// Returns the project the client acts on.
    pub fn project(&self) -> &ProjectId {
        &self.project
    }

    /// Calls a project-scoped method with a JSON body.
    pub(crate) async fn post<B, R>(&self, method: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.config.method_url(self.project.as_str(), method);

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            url = %url,
            "Calling Earth Engine"
        );

        let response = self
            .http
            .http()
            .post(&url)
            .bearer_auth(self.token.bearer())
            .header("x-goog-user-project", self.project.as_str())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error.message)
            .unwrap_or(text);

        tracing::error!(
            target: TRACING_TARGET_CLIENT,
            status = status.as_u16(),
            url = %url,
            message = %message,
            "Earth Engine request failed"
        );

        Err(Error::Api {
            status: status.as_u16(),
            message,
        })
    }
}
