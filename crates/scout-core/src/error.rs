use thiserror::Error;

/// A convenience `Result` alias using [`ScoutError`].
pub type ScoutResult<T> = Result<T, ScoutError>;

/// Top-level error type for Scout.
///
/// Each variant corresponds to a subsystem that can produce errors.
#[derive(Error, Debug)]
pub enum ScoutError {
    /// A search provider request or response mapping failed.
    #[error("Search error: {0}")]
    Search(String),

    /// An error from the completion relay or summarizer.
    #[error("Agent error: {0}")]
    Agent(String),

    /// An outbound HTTP request failed at the transport level.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The upstream provider answered with a non-success status.
    #[error("Upstream error {status}: {body}")]
    Upstream {
        /// HTTP status code returned upstream.
        status: u16,
        /// Response body, as far as it could be read.
        body: String,
    },

    /// An error related to session persistence or lookup.
    #[error("Session error: {0}")]
    Session(String),

    /// An error in configuration parsing or validation.
    #[error("Config error: {0}")]
    Config(String),

    /// An error from the HTTP gateway layer.
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScoutError {
    /// Returns true for errors caused by missing or invalid configuration.
    pub fn is_config(&self) -> bool {
        matches!(self, ScoutError::Config(_))
    }
}
