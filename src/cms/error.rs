use thiserror::Error;

/// Failures talking to the headless CMS
#[derive(Debug, Error)]
pub enum CmsError {
    /// No API endpoint in `_config.yml` nor in the environment.
    #[error("CMS endpoint is not configured (set cms.endpoint or PRISMIC_API_ENDPOINT)")]
    NotConfigured,

    #[error("invalid CMS url {0:?}")]
    InvalidUrl(String),

    /// Transport failure (`reqwest`): connect, timeout, TLS.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The CMS answered with a non-success status.
    #[error("CMS answered {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    /// The body was not the JSON shape we expect.
    #[error("malformed CMS response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("CMS api root lists no master ref")]
    MissingMasterRef,

    /// A pagination cursor on a host other than the configured API.
    #[error("cursor {0:?} does not point at the configured CMS")]
    ForeignCursor(String),
}

/// Result of CMS operations
pub type CmsResult<T> = Result<T, CmsError>;
