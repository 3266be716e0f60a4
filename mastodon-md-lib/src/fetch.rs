//! Walk reverse-chronological feeds page by page until the window is passed.

use tracing::{debug, info};

use crate::client::{FeedClient, PageRequest, Status};
use crate::error::{Error, FetchStage, Result};
use crate::timerange::TimeRange;

/// Result of scanning one page against the window.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PageScan {
    /// Statuses on the page that fell inside the window.
    pub in_range: usize,
    /// Scanning hit a status older than the window start.
    pub reached_start: bool,
}

/// Why the paginator stopped asking for more pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EmptyPage,
    PassedStart,
    NoNextPage,
}

/// Append the in-range statuses of a newest-first page to `out`.
///
/// Statuses newer than the window are skipped. The first status older than
/// the window ends the scan, since everything after it is older still.
pub fn scan_page(page: Vec<Status>, range: &TimeRange, out: &mut Vec<Status>) -> PageScan {
    let mut scan = PageScan::default();

    for status in page {
        if status.created_at < range.start {
            scan.reached_start = true;
            break;
        }
        if status.created_at > range.end {
            continue;
        }
        scan.in_range += 1;
        out.push(status);
    }

    scan
}

/// Decide whether to keep paging after a page of account statuses.
///
/// A page that found nothing in range while its oldest status is still newer
/// than the window keeps going: the window simply has not been reached yet.
pub fn next_cursor(page: &[Status], range: &TimeRange) -> Result<String, StopReason> {
    let oldest = page.last().ok_or(StopReason::EmptyPage)?;
    if oldest.created_at < range.start {
        return Err(StopReason::PassedStart);
    }
    Ok(oldest.id.clone())
}

/// Fetch every status of `account_id` created inside `range`, newest first.
///
/// All-or-nothing: a failing page discards everything fetched so far.
pub async fn fetch_statuses<C>(client: &C, account_id: &str, range: &TimeRange) -> Result<Vec<Status>>
where
    C: FeedClient + ?Sized,
{
    let mut collected = Vec::new();
    let mut request = PageRequest::first();
    let mut pages = 0usize;

    let reason = loop {
        let page = client
            .list_account_statuses(account_id, &request)
            .await
            .map_err(Error::fetch(FetchStage::Statuses))?;
        pages += 1;

        let page_len = page.statuses.len();
        let cursor = next_cursor(&page.statuses, range);
        let scan = scan_page(page.statuses, range, &mut collected);

        debug!(
            "page {} (max_id {:?}): {} statuses, {} in range, reached start: {}",
            pages,
            request.max_id,
            page_len,
            scan.in_range,
            scan.reached_start
        );

        match cursor {
            Ok(max_id) => request = PageRequest::older_than(max_id),
            Err(reason) => break reason,
        }
    };

    info!(
        "Fetched {} statuses in range over {} pages ({:?})",
        collected.len(),
        pages,
        reason
    );

    Ok(collected)
}

/// Fetch favourites created inside `range`.
///
/// Favourites come back in the order they were favourited, not created, so
/// a single old status does not end the walk; only a page made entirely of
/// statuses older than the window does.
pub async fn fetch_favourites<C>(client: &C, range: &TimeRange) -> Result<Vec<Status>>
where
    C: FeedClient + ?Sized,
{
    let mut collected = Vec::new();
    let mut request = PageRequest::first();
    let mut pages = 0usize;

    let reason = loop {
        let page = client
            .list_favourites(&request)
            .await
            .map_err(Error::fetch(FetchStage::Favourites))?;
        pages += 1;

        if page.statuses.is_empty() {
            break StopReason::EmptyPage;
        }

        let all_before_start = page.statuses.iter().all(|s| s.created_at < range.start);
        collected.extend(
            page.statuses
                .into_iter()
                .filter(|s| range.contains(s.created_at)),
        );

        debug!("favourites page {}: {} kept so far", pages, collected.len());

        if all_before_start {
            break StopReason::PassedStart;
        }
        match page.next_max_id {
            Some(max_id) => request = PageRequest::older_than(max_id),
            None => break StopReason::NoNextPage,
        }
    };

    info!(
        "Fetched {} favourites in range over {} pages ({:?})",
        collected.len(),
        pages,
        reason
    );

    Ok(collected)
}
