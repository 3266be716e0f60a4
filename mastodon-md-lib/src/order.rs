use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::model::Post;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Oldest first.
    #[default]
    Asc,
    /// Newest first.
    Desc,
}

impl FromStr for SortOrder {
    type Err = std::convert::Infallible;

    /// Anything other than `desc` reads as ascending.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s == "desc" {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        })
    }
}

impl<'de> Deserialize<'de> for SortOrder {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(value.parse().unwrap_or_default())
    }
}

/// Stable sort by creation time; posts with equal timestamps keep their
/// input order in both directions.
pub fn sort_posts(posts: &mut [Post], order: SortOrder) {
    match order {
        SortOrder::Asc => posts.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortOrder::Desc => posts.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
}
