//! Presentation model handed to templates.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A media file attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaAttachment {
    /// `image`, `video`, `gifv`, `audio` or `unknown`.
    pub media_type: String,
    pub url: String,
    pub preview_url: String,
    pub description: String,
}

/// Read-only snapshot of a boosted or favourited post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OriginalPost {
    pub author_name: String,
    pub author_username: String,
    pub author_url: String,
    pub content: String,
    pub content_warning: String,
    pub url: String,
    pub media_attachments: Vec<MediaAttachment>,
}

/// A status normalized for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub id: String,
    pub created_at: DateTime<Utc>,
    /// e.g. `2025-11-11 14:30`
    pub formatted_time: String,
    /// e.g. `2025-11-11`
    pub formatted_date: String,
    /// e.g. `14:30`
    pub formatted_time_only: String,
    pub url: String,
    pub content: String,
    pub content_warning: String,
    pub visibility: String,
    pub is_reply: bool,
    pub is_boost: bool,
    /// Came from the favourites endpoint rather than the account's own feed.
    pub is_favorited: bool,
    pub media_attachments: Vec<MediaAttachment>,
    pub replies_count: u64,
    pub reblogs_count: u64,
    pub favourites_count: u64,
    /// Text the account added when boosting, if any.
    pub boost_commentary: String,
    pub original_post: Option<OriginalPost>,
}

/// Posts of one calendar day split by how they relate to the account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DayGroup {
    pub date: String,
    pub own_posts: Vec<Post>,
    pub boosted_posts: Vec<Post>,
    pub favorited_posts: Vec<Post>,
}

/// Everything a template can reference.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TemplateData {
    pub start_date: String,
    pub end_date: String,
    pub posts: Vec<Post>,
    /// Empty unless day grouping is turned on.
    pub days: Vec<DayGroup>,
}

/// Group posts by `formatted_date`, keeping first-seen date order and the
/// input order inside each bucket.
pub fn group_by_day(posts: &[Post]) -> Vec<DayGroup> {
    let mut days: Vec<DayGroup> = Vec::new();

    for post in posts {
        let index = match days.iter().position(|d| d.date == post.formatted_date) {
            Some(index) => index,
            None => {
                days.push(DayGroup {
                    date: post.formatted_date.clone(),
                    ..DayGroup::default()
                });
                days.len() - 1
            }
        };

        let day = &mut days[index];
        if post.is_favorited {
            day.favorited_posts.push(post.clone());
        } else if post.is_boost {
            day.boosted_posts.push(post.clone());
        } else {
            day.own_posts.push(post.clone());
        }
    }

    days
}
