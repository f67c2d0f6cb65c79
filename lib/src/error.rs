/// Error type for the urlpad library
///
/// Fetch failures come in two flavours (`Network` and `RemoteStatus`) that are only
/// told apart for logging. Snapshot and decode failures are scoped to a single entry.
#[derive(Debug, thiserror::Error)]
pub enum UrlPadError {
    /// Connection, IO or timeout failure while fetching a page
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status
    #[error("{hint} (Status: {status}) for {url}")]
    RemoteStatus {
        url: String,
        status: u16,
        hint: &'static str,
    },

    /// Page render or video thumbnail extraction failed
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// A persisted entry is missing a field or carries a malformed value
    #[error("Decode error in entry {index}: {reason}")]
    Decode { index: usize, reason: String },

    /// I/O errors (pad document, images folder)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// YAML parsing/serialization errors
    #[error("YAML error: {0}")]
    Yaml(String),

    /// JSON errors
    #[error("JSON error: {0}")]
    Json(String),

    /// HTML parsing errors
    #[error("HTML parse error: {0}")]
    HtmlParse(String),

    /// Invalid input or arguments
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Entry not present in the pad
    #[error("Entry {0} not found")]
    EntryNotFound(String),

    /// Generic error for cases that don't fit other categories
    #[error("{0}")]
    Other(String),
}

/// Result type alias using UrlPadError
pub type Result<T> = std::result::Result<T, UrlPadError>;

impl UrlPadError {
    /// True for the failures that end the fresh-URL path without publishing
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            UrlPadError::Network(_) | UrlPadError::RemoteStatus { .. }
        )
    }

    /// Build a `RemoteStatus` error with a hint matching the status class
    pub fn remote_status(url: &str, status: u16) -> Self {
        let hint = match status {
            403 => "HTTP 403 Forbidden - often caused by user-agent blocking, try a different user_agent in config.yml",
            401 => "HTTP 401 Unauthorized - the website requires authentication",
            404 => "HTTP 404 Not Found - the URL does not exist",
            429 => "HTTP 429 Too Many Requests - you are being rate limited",
            500..=599 => "HTTP 5xx Server Error - the website is experiencing issues",
            _ => "HTTP request failed with non-success status",
        };
        UrlPadError::RemoteStatus {
            url: url.to_string(),
            status,
            hint,
        }
    }
}

impl From<reqwest::Error> for UrlPadError {
    fn from(err: reqwest::Error) -> Self {
        // Timeouts land here too; keep the cause chain so they can be told apart
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        UrlPadError::Network(message)
    }
}

impl From<String> for UrlPadError {
    fn from(s: String) -> Self {
        UrlPadError::Other(s)
    }
}

impl From<&str> for UrlPadError {
    fn from(s: &str) -> Self {
        UrlPadError::Other(s.to_string())
    }
}

impl From<serde_yaml::Error> for UrlPadError {
    fn from(err: serde_yaml::Error) -> Self {
        UrlPadError::Yaml(err.to_string())
    }
}

impl From<serde_json::Error> for UrlPadError {
    fn from(err: serde_json::Error) -> Self {
        UrlPadError::Json(err.to_string())
    }
}

impl From<tl::ParseError> for UrlPadError {
    fn from(err: tl::ParseError) -> Self {
        UrlPadError::HtmlParse(err.to_string())
    }
}

impl From<image::ImageError> for UrlPadError {
    fn from(err: image::ImageError) -> Self {
        UrlPadError::Snapshot(err.to_string())
    }
}
