//! Error types for the search client.

use thiserror::Error;

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors that can occur during search operations.
///
/// Page-level failures (transport errors, unparseable bodies) are
/// absorbed inside the paginated fan-out and never surface here; a call
/// fails only on a precondition: missing keywords, an unextractable
/// session token, or an unknown backend selector.
#[derive(Error, Debug)]
pub enum SearchError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// No keywords were supplied; no request is issued.
    #[error("keywords are mandatory")]
    MissingKeywords,

    /// The vqd session token could not be located in the seed response.
    #[error("could not extract vqd token (keywords={keywords})")]
    TokenNotFound {
        /// The keyword string the token request was made for.
        keywords: String,
    },

    /// Failed to extract records from a page body.
    #[error("failed to extract results: {0}")]
    Extraction(String),

    /// Unsupported backend selector.
    #[error("invalid backend '{0}', expected one of: api, html, lite")]
    InvalidBackend(String),

    /// URL parsing error.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}
