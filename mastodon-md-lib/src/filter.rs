use crate::client::{Status, Visibility};

/// Which statuses to drop before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub exclude_replies: bool,
    pub exclude_boosts: bool,
    /// Allowed visibilities. Empty means no visibility filtering.
    pub visibilities: Vec<String>,
}

impl FilterOptions {
    /// Build the visibility set from a comma-separated flag value such as
    /// `public, unlisted`. Entries are trimmed; empty entries are ignored.
    pub fn parse_visibilities(list: &str) -> Vec<String> {
        list.split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Exact match against the value the server sent.
    fn visibility_allowed(&self, visibility: &Visibility) -> bool {
        self.visibilities.is_empty() || self.visibilities.iter().any(|v| v == visibility.as_str())
    }

    pub fn keeps(&self, status: &Status) -> bool {
        if self.exclude_replies && status.is_reply() {
            return false;
        }
        if self.exclude_boosts && status.is_boost() {
            return false;
        }
        self.visibility_allowed(&status.visibility)
    }
}

/// Drop filtered statuses, keeping the survivors in their original order.
pub fn filter_statuses(statuses: Vec<Status>, options: &FilterOptions) -> Vec<Status> {
    statuses.into_iter().filter(|s| options.keeps(s)).collect()
}
