//! OAuth 2.0 access tokens and token endpoint exchanges.

use std::fmt;

use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use super::file::{AuthorizedUser, ServiceAccountKey};
use super::{SCOPES, TRACING_TARGET_AUTH};
use crate::{Error, ReqwestClient, Result};

/// Lifetime requested for service account assertions.
const ASSERTION_LIFETIME: SignedDuration = SignedDuration::from_hours(1);

/// Grant type of the JWT bearer token exchange.
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// A bearer token for Google APIs.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    secret: String,
    expires_at: Option<Timestamp>,
}

impl AccessToken {
    /// Creates a token from its secret and expiry.
    pub fn new(secret: impl Into<String>, expires_at: Option<Timestamp>) -> Self {
        Self {
            secret: secret.into(),
            expires_at,
        }
    }

    /// Returns the token value for an `Authorization: Bearer` header.
    pub fn bearer(&self) -> &str {
        &self.secret
    }

    /// Returns when the token expires, when known.
    pub fn expires_at(&self) -> Option<Timestamp> {
        self.expires_at
    }

    /// Returns whether the token has expired at `now`.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Successful token endpoint response.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl TokenResponse {
    pub(crate) fn into_token(self, issued_at: Timestamp) -> AccessToken {
        let expires_at = self
            .expires_in
            .and_then(|secs| issued_at.checked_add(SignedDuration::from_secs(secs)).ok());
        AccessToken::new(self.access_token, expires_at)
    }
}

/// Claims of a service account JWT bearer assertion.
#[derive(Debug, Serialize)]
pub(crate) struct AssertionClaims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

impl<'a> AssertionClaims<'a> {
    pub(crate) fn new(key: &'a ServiceAccountKey, now: Timestamp) -> Self {
        let iat = now.as_second();
        Self {
            iss: &key.client_email,
            scope: SCOPES.join(" "),
            aud: &key.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME.as_secs(),
        }
    }
}

/// Signs the RS256 assertion a service account exchanges for a token.
pub(crate) fn sign_assertion(key: &ServiceAccountKey, now: Timestamp) -> Result<String> {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();

    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
    let claims = AssertionClaims::new(key, now);
    Ok(jsonwebtoken::encode(&header, &claims, &encoding_key)?)
}

/// Exchanges a service account key for an access token.
pub(crate) async fn service_account_token(
    client: &ReqwestClient,
    key: &ServiceAccountKey,
) -> Result<AccessToken> {
    let now = Timestamp::now();
    let assertion = sign_assertion(key, now)?;

    tracing::debug!(
        target: TRACING_TARGET_AUTH,
        client_email = %key.client_email,
        token_uri = %key.token_uri,
        "Exchanging service account assertion"
    );

    let form = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];
    exchange(client, &key.token_uri, &form, now).await
}

/// Exchanges a user refresh token for an access token.
pub(crate) async fn authorized_user_token(
    client: &ReqwestClient,
    user: &AuthorizedUser,
) -> Result<AccessToken> {
    tracing::debug!(
        target: TRACING_TARGET_AUTH,
        client_id = %user.client_id,
        "Refreshing authorized user token"
    );

    let form = [
        ("grant_type", "refresh_token"),
        ("client_id", user.client_id.as_str()),
        ("client_secret", user.client_secret.as_str()),
        ("refresh_token", user.refresh_token.as_str()),
    ];
    exchange(client, super::file::DEFAULT_TOKEN_URI, &form, Timestamp::now()).await
}

async fn exchange(
    client: &ReqwestClient,
    token_uri: &str,
    form: &[(&str, &str)],
    issued_at: Timestamp,
) -> Result<AccessToken> {
    let response = client.http().post(token_uri).form(form).send().await?;

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
