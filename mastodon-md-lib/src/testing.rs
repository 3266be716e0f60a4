//! Builders and an in-memory feed shared by the unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::client::{
    Account, Attachment, ClientError, FeedClient, Page, PageRequest, Status, Visibility,
};
use crate::convert::normalize;
use crate::model::Post;

pub fn at(timestamp: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(timestamp)
        .expect("test timestamp is RFC 3339")
        .with_timezone(&Utc)
}

pub fn account(id: &str, username: &str) -> Account {
    Account {
        id: id.to_string(),
        username: username.to_string(),
        acct: username.to_string(),
        display_name: username.to_string(),
        url: format!("https://mastodon.example/@{username}"),
        created_at: at("2020-01-01T00:00:00Z"),
        statuses_count: 0,
        following_count: 0,
        followers_count: 0,
    }
}

pub fn attachment(id: &str) -> Attachment {
    Attachment {
        id: id.to_string(),
        media_type: "image".to_string(),
        url: format!("https://files.example/{id}.png"),
        preview_url: Some(format!("https://files.example/{id}_small.png")),
        description: Some(format!("picture {id}")),
    }
}

pub fn status(id: &str, created_at: &str) -> Status {
    Status {
        id: id.to_string(),
        created_at: at(created_at),
        account: account("1", "alice"),
        url: Some(format!("https://mastodon.example/@alice/{id}")),
        content: format!("<p>post {id}</p>"),
        spoiler_text: String::new(),
        visibility: Visibility::Public,
        in_reply_to_id: None,
        reblog: None,
        media_attachments: Vec::new(),
        replies_count: 0,
        reblogs_count: 0,
        favourites_count: 0,
    }
}

pub fn post_at(id: &str, created_at: &str) -> Post {
    normalize(&status(id, created_at))
}

/// A feed served from memory. Account statuses are paged by status id,
/// favourites by the explicit `next_max_id` of each stored page.
#[derive(Default)]
pub struct FakeFeed {
    pub account: Option<Account>,
    pub pages: HashMap<Option<String>, Vec<Status>>,
    pub favourite_pages: HashMap<Option<String>, Page>,
    pub fail_on: Option<Option<String>>,
    pub requests: Mutex<Vec<Option<String>>>,
}

impl FakeFeed {
    /// Lay `pages` out so each page is reached through the id of the
    /// previous page's last status.
    pub fn with_pages(pages: Vec<Vec<Status>>) -> Self {
        let mut map = HashMap::new();
        let mut cursor: Option<String> = None;
        for page in pages {
            let next = page.last().map(|s| s.id.clone());
            map.insert(cursor.clone(), page);
            cursor = next;
        }
        Self {
            account: Some(account("1", "alice")),
            pages: map,
            ..Self::default()
        }
    }

    pub fn requested(&self) -> Vec<Option<String>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedClient for FakeFeed {
    async fn verify_credentials(&self) -> Result<Account, ClientError> {
        self.account.clone().ok_or(ClientError::MissingToken)
    }

    async fn list_account_statuses(
        &self,
        _account_id: &str,
        page: &PageRequest,
    ) -> Result<Page, ClientError> {
        self.requests.lock().unwrap().push(page.max_id.clone());
        if self.fail_on.as_ref() == Some(&page.max_id) {
            return Err(ClientError::Api {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                message: "boom".to_string(),
            });
        }
        Ok(Page {
            statuses: self.pages.get(&page.max_id).cloned().unwrap_or_default(),
            next_max_id: None,
        })
    }

    async fn list_favourites(&self, page: &PageRequest) -> Result<Page, ClientError> {
        self.requests.lock().unwrap().push(page.max_id.clone());
        Ok(self
            .favourite_pages
            .get(&page.max_id)
            .cloned()
            .unwrap_or_default())
    }
}
