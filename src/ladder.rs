//! Path of Exile 2 ladder API client.
//!
//! Base URL: `https://api.pathofexile.com`
//! Auth: OAuth2 bearer token on every request.
//! Rate limit: surfaced via HTTP 429 + `Retry-After`; the caller treats it
//! as a soft per-cycle failure and keeps the existing schedule.
//!
//! The client sits behind the [`LadderSource`] trait so the poll cycle can
//! be driven against an in-memory ladder in tests.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, AUTHORIZATION, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use anyhow::Context;

use crate::auth::{AccessToken, USER_AGENT};
use crate::types::{CharacterStatus, LadderEntry, League, TrackerError};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const BASE_URL: &str = "https://api.pathofexile.com";
const REALM: &str = "poe2";

/// Entries requested per ladder page (API maximum is 200).
pub const PAGE_LIMIT: u32 = 200;

/// Fallback when a 429 response carries no usable `Retry-After` header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Fixed path the raw last ladder response is dumped to under `--debug`.
pub const DEBUG_DUMP_FILE: &str = "ladder_debug.json";

// ---------------------------------------------------------------------------
// API response types (PoE JSON → Rust)
// ---------------------------------------------------------------------------

/// Response from `/league?realm=poe2`. Only the fields we need.
#[derive(Debug, Deserialize)]
struct LeagueListResponse {
    #[serde(default)]
    leagues: Vec<LeagueInfo>,
}

#[derive(Debug, Deserialize)]
struct LeagueInfo {
    id: String,
    #[serde(default)]
    name: Option<String>,
}

/// Response from `/league/{id}/ladder`.
#[derive(Debug, Deserialize)]
struct LadderResponse {
    #[serde(default)]
    ladder: Option<LadderBody>,
}

#[derive(Debug, Deserialize)]
struct LadderBody {
    #[serde(default)]
    total: Option<u32>,
    #[serde(default)]
    entries: Vec<ApiLadderEntry>,
}

#[derive(Debug, Deserialize)]
struct ApiLadderEntry {
    #[serde(default)]
    rank: u32,
    #[serde(default)]
    character: Option<ApiCharacter>,
}

#[derive(Debug, Deserialize)]
struct ApiCharacter {
    #[serde(default)]
    name: String,
    #[serde(default)]
    level: u32,
    #[serde(default)]
    dead: bool,
    #[serde(default)]
    retired: bool,
}

impl ApiLadderEntry {
    fn into_entry(self) -> Option<LadderEntry> {
        let character = self.character?;
        let status = if character.dead {
            Some(CharacterStatus::Dead)
        } else if character.retired {
            Some(CharacterStatus::Retired)
        } else {
            None
        };
        Some(LadderEntry {
            rank: self.rank,
            name: character.name,
            level: character.level,
            status,
        })
    }
}

// ---------------------------------------------------------------------------
// LadderSource trait
// ---------------------------------------------------------------------------

/// One page of ladder entries plus the upstream total, when reported.
#[derive(Debug, Clone, Default)]
pub struct LadderPage {
    pub entries: Vec<LadderEntry>,
    pub total: Option<u32>,
}

/// Abstraction over the ranking data source.
///
/// The production implementation is [`LadderClient`]; integration tests
/// substitute a deterministic in-memory ladder.
#[async_trait]
pub trait LadderSource: Send + Sync {
    /// Resolve the configured league to the upstream ladder identifier.
    async fn resolve_league_id(&self, league: &League) -> Result<String, TrackerError>;

    /// Fetch one page of the ladder for a resolved league id.
    async fn fetch_page(
        &self,
        league_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<LadderPage, TrackerError>;
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Authenticated client for the PoE2 ladder endpoints.
pub struct LadderClient {
    http: Client,
    token: AccessToken,
    /// Dump raw ladder responses to [`DEBUG_DUMP_FILE`] when set.
    debug_dump: bool,
}

impl LadderClient {
    pub fn new(token: AccessToken, debug_dump: bool) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client for the ladder API")?;
        Ok(Self {
            http,
            token,
            debug_dump,
        })
    }

    fn to_page(resp: LadderResponse) -> LadderPage {
        let Some(body) = resp.ladder else {
            return LadderPage::default();
        };
        LadderPage {
            total: body.total,
            entries: body
                .entries
                .into_iter()
                .filter_map(ApiLadderEntry::into_entry)
                .collect(),
        }
    }
}

/// Map a transport error to the domain taxonomy, keeping timeouts
/// distinguishable from other network failures.
fn request_error(err: reqwest::Error) -> TrackerError {
    if err.is_timeout() {
        TrackerError::Timeout(err.to_string())
    } else {
        TrackerError::Network(err.to_string())
    }
}

/// Map a non-success HTTP status to the domain taxonomy.
/// Returns `None` for success statuses.
fn classify_status(
    status: StatusCode,
    retry_after: Option<u64>,
    league_id: &str,
) -> Option<TrackerError> {
    if status.is_success() {
        return None;
    }
    Some(match status {
        StatusCode::TOO_MANY_REQUESTS => TrackerError::RateLimited {
            retry_after: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => TrackerError::TokenRejected {
            status: status.as_u16(),
        },
        StatusCode::NOT_FOUND => TrackerError::LeagueNotFound(league_id.to_string()),
        _ => TrackerError::Upstream {
            status: status.as_u16(),
            message: String::new(),
        },
    })
}

/// Parse the `Retry-After` header as a second count.
fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// First 200 characters of a response body, for error messages.
fn snippet(body: &str) -> String {
    body.chars().take(200).collect()
}

#[async_trait]
impl LadderSource for LadderClient {
    /// Resolve the league display name against the live league list.
    ///
    /// If the listing request fails at the transport level, the display
    /// name is used as the id directly; the upstream accepts name-as-id
    /// for current leagues.
    async fn resolve_league_id(&self, league: &League) -> Result<String, TrackerError> {
        let url = format!("{BASE_URL}/league?realm={REALM}");
        debug!(url = %url, "Fetching league list");

        let resp = match self
            .http
            .get(&url)
            .header(AUTHORIZATION, self.token.bearer())
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(err) => {
                warn!(error = %err, "League listing unreachable, using league name as id");
                return Ok(league.name().to_string());
            }
        };

        let status = resp.status();
        if let Some(err) = classify_status(status, retry_after_secs(resp.headers()), league.name())
        {
            if let TrackerError::Upstream { status, .. } = err {
                let body = resp.text().await.unwrap_or_default();
                return Err(TrackerError::Upstream {
                    status,
                    message: snippet(&body),
                });
            }
            return Err(err);
        }

        let listing: LeagueListResponse = resp
            .json()
            .await
            .map_err(|e| TrackerError::Malformed(format!("league listing: {e}")))?;

        listing
            .leagues
            .into_iter()
            .find(|l| l.name.as_deref() == Some(league.name()) || l.id == league.name())
            .map(|l| l.id)
            .ok_or_else(|| TrackerError::LeagueNotFound(league.name().to_string()))
    }

    async fn fetch_page(
        &self,
        league_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<LadderPage, TrackerError> {
        let url = format!(
            "{BASE_URL}/league/{}/ladder?realm={REALM}&limit={limit}&offset={offset}",
            urlencoding::encode(league_id),
        );
        debug!(url = %url, "Fetching ladder page");

        let resp = self
            .http
            .get(&url)
            .header(AUTHORIZATION, self.token.bearer())
            .send()
            .await
            .map_err(request_error)?;

        if let Some(state) = resp
            .headers()
            .get("x-rate-limit-client-state")
            .and_then(|v| v.to_str().ok())
        {
            debug!(state, "Rate limit state");
        }

        let status = resp.status();
        if let Some(err) = classify_status(status, retry_after_secs(resp.headers()), league_id) {
            if let TrackerError::Upstream { status, .. } = err {
                let body = resp.text().await.unwrap_or_default();
                return Err(TrackerError::Upstream {
                    status,
                    message: snippet(&body),
                });
            }
            return Err(err);
        }

        let body = resp.text().await.map_err(request_error)?;

        if self.debug_dump {
            match std::fs::write(DEBUG_DUMP_FILE, &body) {
                Ok(()) => debug!(path = DEBUG_DUMP_FILE, "Saved raw ladder response"),
                Err(err) => warn!(error = %err, "Failed to write debug dump"),
            }
        }

        let parsed: LadderResponse =
            serde_json::from_str(&body).map_err(|e| TrackerError::Malformed(e.to_string()))?;

        Ok(Self::to_page(parsed))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
