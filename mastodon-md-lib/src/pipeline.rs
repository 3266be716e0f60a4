//! The fetch → filter → normalize → order → render pipeline.

use tracing::info;

use crate::client::{Account, FeedClient};
use crate::convert::{normalize_all, normalize_favourites};
use crate::error::{Error, FetchStage, Result};
use crate::fetch::{fetch_favourites, fetch_statuses};
use crate::filter::{filter_statuses, FilterOptions};
use crate::model::{group_by_day, Post, TemplateData};
use crate::order::{sort_posts, SortOrder};
use crate::templates::Renderer;
use crate::timerange::{format_date, TimeRange};

/// Settings for one export run.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub range: TimeRange,
    pub filter: FilterOptions,
    pub sort_order: SortOrder,
    /// Merge in posts the account favourited inside the window.
    pub include_favourites: bool,
    /// Fill [`TemplateData::days`].
    pub group_by_day: bool,
}

impl ExportOptions {
    pub fn new(range: TimeRange) -> Self {
        Self {
            range,
            filter: FilterOptions::default(),
            sort_order: SortOrder::default(),
            include_favourites: false,
            group_by_day: false,
        }
    }
}

pub async fn authenticate<C>(client: &C) -> Result<Account>
where
    C: FeedClient + ?Sized,
{
    let account = client
        .verify_credentials()
        .await
        .map_err(Error::fetch(FetchStage::Credentials))?;
    info!("Authenticated as @{}", account.username);
    Ok(account)
}

/// Fetch, filter, normalize and order the posts for `account`.
pub async fn collect_posts<C>(client: &C, account: &Account, options: &ExportOptions) -> Result<Vec<Post>>
where
    C: FeedClient + ?Sized,
{
    let statuses = fetch_statuses(client, &account.id, &options.range).await?;
    let fetched = statuses.len();

    let statuses = filter_statuses(statuses, &options.filter);
    info!("After filtering: {} of {} statuses", statuses.len(), fetched);

    let mut posts = normalize_all(&statuses);

    if options.include_favourites {
        let favourites = fetch_favourites(client, &options.range).await?;
        posts.extend(normalize_favourites(&favourites));
    }

    sort_posts(&mut posts, options.sort_order);
    Ok(posts)
}

pub fn build_template_data(range: &TimeRange, posts: Vec<Post>, group: bool) -> TemplateData {
    let days = if group { group_by_day(&posts) } else { Vec::new() };
    TemplateData {
        start_date: format_date(range.start),
        end_date: format_date(range.end),
        posts,
        days,
    }
}

/// Run the whole pipeline and return the rendered document. Nothing is
/// produced unless every stage succeeds.
pub async fn export<C>(client: &C, renderer: &Renderer, options: &ExportOptions) -> Result<String>
where
    C: FeedClient + ?Sized,
{
    info!(
        "Fetching posts from {} to {}",
        format_date(options.range.start),
        format_date(options.range.end)
    );

    let account = authenticate(client).await?;
    let posts = collect_posts(client, &account, options).await?;
    let data = build_template_data(&options.range, posts, options.group_by_day);
    renderer.render(&data)
}
