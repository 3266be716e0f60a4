use std::path::PathBuf;

use thiserror::Error;

use crate::client::ClientError;
use crate::config::ConfigError;

/// Which remote call a fetch failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
    Credentials,
    Statuses,
    Favourites,
}

impl std::fmt::Display for FetchStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FetchStage::Credentials => "verify credentials",
            FetchStage::Statuses => "fetch statuses",
            FetchStage::Favourites => "fetch favourites",
        };
        f.write_str(name)
    }
}

/// Top-level error type for the export pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// A `--start`/`--end` value was not a `YYYY-MM-DD` date.
    #[error("invalid {field} date: expected format YYYY-MM-DD, got: {input}")]
    InvalidDate { field: &'static str, input: String },

    /// The end date precedes the start date.
    #[error("end date {end} must be after start date {start}")]
    InvertedRange { start: String, end: String },

    /// A `--since` value did not look like `24h`, `7d` or `2w`.
    #[error("invalid since duration {input:?}: expected format like '24h', '7d', or '2w'")]
    InvalidDuration { input: String },

    /// The remote service failed; nothing fetched so far is returned.
    #[error("failed to {stage}")]
    FetchFailed {
        stage: FetchStage,
        #[source]
        source: ClientError,
    },

    /// A custom template file could not be read or parsed.
    #[error("failed to load template from {origin}")]
    TemplateLoadFailed {
        origin: String,
        #[source]
        source: TemplateSourceError,
    },

    /// The template failed while executing against the post data.
    #[error("failed to render template")]
    TemplateRenderFailed(#[source] minijinja::Error),

    /// The rendered document could not be written to its destination.
    #[error("failed to write output to {}", .path.display())]
    OutputFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Cause of a [`Error::TemplateLoadFailed`].
#[derive(Debug, Error)]
pub enum TemplateSourceError {
    #[error("could not read template file")]
    Io(#[from] std::io::Error),

    #[error("could not parse template")]
    Syntax(#[from] minijinja::Error),
}

impl Error {
    pub(crate) fn fetch(stage: FetchStage) -> impl FnOnce(ClientError) -> Error {
        move |source| Error::FetchFailed { stage, source }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
