//! OAuth2 client-credentials authentication.
//!
//! Token endpoint: `https://www.pathofexile.com/oauth/token`
//! Scopes: `service:leagues service:leagues:ladder`
//! Docs: https://www.pathofexile.com/developer/docs/authorization
//!
//! The token is acquired once at startup and never refreshed; polling
//! without a token has no degraded mode, so any failure here is fatal.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

const TOKEN_URL: &str = "https://www.pathofexile.com/oauth/token";
const SCOPES: &str = "service:leagues service:leagues:ladder";

/// User agent required by the PoE API guidelines, shared by every request
/// this program makes.
pub const USER_AGENT: &str =
    "OAuth poe2-rank-tracker/0.1.0 (contact: your-email@example.com)";

/// OAuth client credentials, read once from the command line or
/// environment and held for the process lifetime.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

/// An acquired bearer token plus its expiry hint.
#[derive(Debug, Clone)]
pub struct AccessToken {
    secret: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn new(secret: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self { secret, expires_at }
    }

    /// The `Authorization` header value for authenticated requests.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.secret)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
}

/// Exchange client credentials for a bearer token.
///
/// Performed exactly once at startup; every failure mode (network error,
/// rejected credentials, unparsable body) aborts the program with a
/// diagnostic rather than entering the poll loop unauthenticated.
pub async fn acquire(creds: &Credentials) -> Result<AccessToken> {
    let http = Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client for the token request")?;

    let form = [
        ("client_id", creds.client_id.as_str()),
        ("client_secret", creds.client_secret.as_str()),
        ("grant_type", "client_credentials"),
        ("scope", SCOPES),
    ];

    debug!(url = TOKEN_URL, "Requesting OAuth token");

    let resp = http
        .post(TOKEN_URL)
        .form(&form)
        .send()
        .await
        .context("OAuth token request failed")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("OAuth token request rejected ({status}): {body}");
    }

    let token: TokenResponse = resp
        .json()
        .await
        .context("Failed to parse OAuth token response")?;

    let expires_at = expires_at(token.expires_in);
    info!(
        token_type = token.token_type.as_deref().unwrap_or("bearer"),
        scope = token.scope.as_deref().unwrap_or(SCOPES),
        expires_at = ?expires_at,
        "OAuth token acquired"
    );

    Ok(AccessToken::new(token.access_token, expires_at))
}

/// Convert the token endpoint's `expires_in` (seconds) to an absolute
/// expiry hint.
fn expires_at(expires_in: Option<i64>) -> Option<DateTime<Utc>> {
    expires_in.map(|secs| Utc::now() + Duration::seconds(secs))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
