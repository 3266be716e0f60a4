//! Export a Mastodon account's posts from a time window to markdown.
//!
//! This library handles:
//! - Resolving `--since` / `--start` / `--end` into a time window
//! - Paging through the account's statuses until the window is passed
//! - Filtering replies, boosts and visibilities
//! - Normalizing statuses into template-ready posts
//! - Rendering the posts through a minijinja template
//!
//! ```no_run
//! use mastodon_md_lib::{export, resolve, write_document, ExportOptions, MastodonClient, Renderer};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = MastodonClient::new("https://mastodon.social", "token")?;
//! let range = resolve("7d", "", "", chrono::Utc::now())?;
//! let renderer = Renderer::new("")?;
//! let document = export(&client, &renderer, &ExportOptions::new(range)).await?;
//! write_document("-", &document)?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod convert;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod model;
pub mod order;
pub mod output;
pub mod pipeline;
pub mod templates;
pub mod timerange;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{Account, ClientError, FeedClient, MastodonClient, Page, PageRequest, Status};
pub use config::{Config, ConfigError};
pub use convert::{normalize, normalize_favourite, sanitize};
pub use error::{Error, FetchStage, Result};
pub use filter::FilterOptions;
pub use model::{DayGroup, MediaAttachment, OriginalPost, Post, TemplateData};
pub use order::SortOrder;
pub use output::write_document;
pub use pipeline::{authenticate, collect_posts, export, ExportOptions};
pub use templates::{Renderer, DEFAULT_TEMPLATE};
pub use timerange::{resolve, TimeRange};
