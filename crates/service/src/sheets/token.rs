//! OAuth2 access tokens for the Sheets API.
//!
//! A service-account key is turned into a short-lived bearer token through the
//! JWT bearer grant: sign an RS256 assertion with the account's private key and
//! exchange it at the key's `token_uri`.

use std::path::Path;

use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::errors::ServiceError;

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Refresh this long before the token actually expires.
const EXPIRY_SKEW_SECS: i64 = 60;

/// Produces bearer tokens for outgoing Sheets API requests.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, ServiceError>;
}

/// A fixed token, for stub servers and pre-authorized environments.
pub struct StaticToken(pub String);

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<String, ServiceError> {
        Ok(self.0.clone())
    }
}

/// The fields of a Google service-account key file this crate uses.
#[derive(Clone, Debug, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type", default)]
    pub key_type: String,
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String { DEFAULT_TOKEN_URI.into() }

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self, ServiceError> {
        let key: ServiceAccountKey = serde_json::from_str(json)
            .map_err(|e| ServiceError::Configuration(format!("invalid service account key: {e}")))?;
        if !key.key_type.is_empty() && key.key_type != "service_account" {
            return Err(ServiceError::Configuration(format!(
                "credential type {:?} is not a service account",
                key.key_type
            )));
        }
        Ok(key)
    }

    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ServiceError::Configuration(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json(&json)
    }
}

/// JWT claim set of the assertion sent to the token endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

pub fn build_claims(key: &ServiceAccountKey, scopes: &[String], now: i64) -> Claims {
    Claims {
        iss: key.client_email.clone(),
        scope: scopes.join(" "),
        aud: key.token_uri.clone(),
        iat: now,
        exp: now + ASSERTION_LIFETIME_SECS,
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 { ASSERTION_LIFETIME_SECS }

struct CachedToken {
    token: String,
    expires_at: i64,
}

/// Token source backed by a service-account key; caches the token until shortly before expiry.
pub struct ServiceAccountTokens {
    key: ServiceAccountKey,
    scopes: Vec<String>,
    http: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokens {
    pub fn new(key: ServiceAccountKey, scopes: Vec<String>, http: reqwest::Client) -> Self {
        Self { key, scopes, http, cached: Mutex::new(None) }
    }

    fn assertion(&self, now: i64) -> Result<String, ServiceError> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();
        let signing_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| ServiceError::Configuration(format!("invalid service account private key: {e}")))?;
        let claims = build_claims(&self.key, &self.scopes, now);
        encode(&header, &claims, &signing_key).map_err(|e| ServiceError::Sheet(format!("sign assertion: {e}")))
    }

    #[instrument(skip(self), fields(client_email = %self.key.client_email))]
    async fn exchange(&self, now: i64) -> Result<CachedToken, ServiceError> {
        let assertion = self.assertion(now)?;
        let resp = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Sheet(format!("token exchange failed: {status}: {body}")));
        }
        let token: TokenResponse = resp.json().await?;
        debug!(expires_in = token.expires_in, "access_token_refreshed");
        Ok(CachedToken { token: token.access_token, expires_at: now + token.expires_in })
    }
}

#[async_trait]
impl TokenSource for ServiceAccountTokens {
    async fn access_token(&self) -> Result<String, ServiceError> {
        let now = chrono::Utc::now().timestamp();
        let mut cached = self.cached.lock().await;
        if let Some(c) = cached.as_ref() {
            if c.expires_at - EXPIRY_SKEW_SECS > now {
                return Ok(c.token.clone());
            }
        }
        let fresh = self.exchange(now).await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}
