use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RutubeError {
    #[error("{0} is unavailable")]
    SourceUnavailable(String),

    #[error("cannot get the video id from url: {0}")]
    InvalidUrl(String),

    #[error("no results found")]
    NoResults,

    /// Retries or failover exhausted on a single resource. Carries the last
    /// HTTP status seen, if any response came back at all.
    #[error("resource unavailable, status code: {status:?}")]
    Unavailable { status: Option<StatusCode> },

    #[error("invalid playlist: {0}")]
    ManifestParse(String),

    #[error(transparent)]
    RequestError(#[from] reqwest::Error),

    #[error(transparent)]
    IOError(#[from] std::io::Error),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),
}

pub type RutubeResult<T> = Result<T, RutubeError>;
