//! Session provider backed by Google Cloud.

use anyhow::Context;
use geomean_core::{Session, SessionProvider};
use geomean_earthengine::{EarthEngineClient, EarthEngineConfig};
use geomean_object::{GcsLister, ObjectConfig};
use geomean_reqwest::{GoogleAuth, ReqwestClient};

use super::Cli;
use crate::TRACING_TARGET_SESSION;

/// Opens sessions with ambient Google credentials.
///
/// Credentials are resolved again for every session; the HTTP connection
/// pool is shared.
#[derive(Debug, Clone)]
pub struct GoogleSessionProvider {
    http: ReqwestClient,
    auth: GoogleAuth,
    earthengine: EarthEngineConfig,
    object: ObjectConfig,
}

impl GoogleSessionProvider {
    /// Creates a provider from CLI configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(cli: &Cli) -> anyhow::Result<Self> {
        let http = ReqwestClient::new(cli.reqwest.clone()).context("failed to create HTTP client")?;
        let auth = GoogleAuth::new(http.clone(), cli.credentials.clone());

        Ok(Self {
            http,
            auth,
            earthengine: cli.earthengine.clone(),
            object: cli.object.clone(),
        })
    }
}

#[async_trait::async_trait]
impl SessionProvider for GoogleSessionProvider {
    async fn open_session(&self) -> geomean_core::Result<Session> {
        let credentials = self.auth.authenticate().await?;
        let project = credentials.project;

        let storage = GcsLister::new(self.object.clone(), credentials.token.bearer());
        let platform = EarthEngineClient::new(
            self.http.clone(),
            self.earthengine.clone(),
            project.clone(),
            credentials.token,
        )?;

        tracing::info!(
            target: TRACING_TARGET_SESSION,
            project = %project,
            "Session opened"
        );

        Ok(Session::new(project, storage, platform))
    }
}
