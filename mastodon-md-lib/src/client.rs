//! Mastodon REST client and the wire types it returns.

use std::sync::OnceLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use tracing::debug;

/// Largest page the statuses and favourites endpoints hand out.
pub const PAGE_SIZE: usize = 40;

// ============================================================================
// Wire Types
// ============================================================================

/// Post audience. Values outside the four documented scopes are kept
/// verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Unlisted,
    Private,
    Direct,
    Other(String),
}

impl Visibility {
    pub fn as_str(&self) -> &str {
        match self {
            Visibility::Public => "public",
            Visibility::Unlisted => "unlisted",
            Visibility::Private => "private",
            Visibility::Direct => "direct",
            Visibility::Other(value) => value,
        }
    }
}

impl From<String> for Visibility {
    fn from(value: String) -> Self {
        match value.as_str() {
            "public" => Visibility::Public,
            "unlisted" => Visibility::Unlisted,
            "private" => Visibility::Private,
            "direct" => Visibility::Direct,
            _ => Visibility::Other(value),
        }
    }
}

impl Serialize for Visibility {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Visibility {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Visibility::from)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Account {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub acct: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub url: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub statuses_count: u64,
    #[serde(default)]
    pub following_count: u64,
    #[serde(default)]
    pub followers_count: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Attachment {
    pub id: String,
    #[serde(rename = "type")]
    pub media_type: String,
    #[serde(default)]
    pub url: String,
    pub preview_url: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Status {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub account: Account,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub spoiler_text: String,
    pub visibility: Visibility,
    pub in_reply_to_id: Option<String>,
    pub reblog: Option<Box<Status>>,
    #[serde(default)]
    pub media_attachments: Vec<Attachment>,
    #[serde(default)]
    pub replies_count: u64,
    #[serde(default)]
    pub reblogs_count: u64,
    #[serde(default)]
    pub favourites_count: u64,
}

impl Status {
    pub fn is_reply(&self) -> bool {
        self.in_reply_to_id.is_some()
    }

    pub fn is_boost(&self) -> bool {
        self.reblog.is_some()
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
}

// ============================================================================
// Client Interface
// ============================================================================

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("mastodon server URL is required")]
    MissingServer,

    #[error("mastodon access token is required")]
    MissingToken,

    #[error("request failed")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Api {
        status: reqwest::StatusCode,
        message: String,
    },
}

/// One page request against a reverse-chronological feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Only return items older than this id. `None` asks for the newest page.
    pub max_id: Option<String>,
    pub limit: usize,
}

impl PageRequest {
    pub fn first() -> Self {
        Self {
            max_id: None,
            limit: PAGE_SIZE,
        }
    }

    pub fn older_than(max_id: impl Into<String>) -> Self {
        Self {
            max_id: Some(max_id.into()),
            limit: PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Page {
    pub statuses: Vec<Status>,
    /// Cursor for the next older page, taken from the `Link` header.
    pub next_max_id: Option<String>,
}

/// The slice of the Mastodon API the exporter needs.
#[async_trait]
pub trait FeedClient: Send + Sync {
    async fn verify_credentials(&self) -> Result<Account, ClientError>;

    async fn list_account_statuses(
        &self,
        account_id: &str,
        page: &PageRequest,
    ) -> Result<Page, ClientError>;

    async fn list_favourites(&self, page: &PageRequest) -> Result<Page, ClientError>;
}

// ============================================================================
// HTTP Implementation
// ============================================================================

pub struct MastodonClient {
    http: reqwest::Client,
    server: String,
    access_token: String,
}

impl MastodonClient {
    pub fn new(server: &str, access_token: &str) -> Result<Self, ClientError> {
        let server = server.trim().trim_end_matches('/');
        if server.is_empty() {
            return Err(ClientError::MissingServer);
        }
        if access_token.trim().is_empty() {
            return Err(ClientError::MissingToken);
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("mastodon-to-markdown/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            server: server.to_string(),
            access_token: access_token.trim().to_string(),
        })
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, ClientError> {
        debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or(body);
        Err(ClientError::Api { status, message })
    }

    async fn get_page(&self, url: String) -> Result<Page, ClientError> {
        let response = self.get(&url).await?;

        let next_max_id = response
            .headers()
            .get(reqwest::header::LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(next_max_id_from_link);

        let statuses: Vec<Status> = response.json().await?;

        Ok(Page {
            statuses,
            next_max_id,
        })
    }
}

fn page_query(page: &PageRequest) -> String {
    let mut query = format!("limit={}", page.limit);
    if let Some(max_id) = &page.max_id {
        query.push_str("&max_id=");
        query.push_str(&urlencoding::encode(max_id));
    }
    query
}

#[async_trait]
impl FeedClient for MastodonClient {
    async fn verify_credentials(&self) -> Result<Account, ClientError> {
        let url = format!("{}/api/v1/accounts/verify_credentials", self.server);
        let account = self.get(&url).await?.json().await?;
        Ok(account)
    }

    async fn list_account_statuses(
        &self,
        account_id: &str,
        page: &PageRequest,
    ) -> Result<Page, ClientError> {
        let url = format!(
            "{}/api/v1/accounts/{}/statuses?{}",
            self.server,
            urlencoding::encode(account_id),
            page_query(page)
        );
        self.get_page(url).await
    }

    async fn list_favourites(&self, page: &PageRequest) -> Result<Page, ClientError> {
        let url = format!("{}/api/v1/favourites?{}", self.server, page_query(page));
        self.get_page(url).await
    }
}

fn link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"<([^>]*)>\s*;\s*rel="next""#).expect("link pattern is valid")
    })
}

/// Pull `max_id` out of the `rel="next"` entry of a `Link` header.
pub fn next_max_id_from_link(header: &str) -> Option<String> {
    let target = link_pattern()
        .captures_iter(header)
        .next()
        .map(|c| c[1].to_string())?;
    let (_, query) = target.split_once('?')?;

    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key != "max_id" {
            return None;
        }
        urlencoding::decode(value).ok().map(|v| v.into_owned())
    })
}
