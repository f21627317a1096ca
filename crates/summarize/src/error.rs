/// The main error type for the summarize [`crate`].
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Represents errors that occur during IO operations.
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Network, TLS or timeout failure while talking to the inference endpoint.
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),

    /// The error type for operations interacting with environment variables.
    /// Possibly returned from [`std::env::var()`].
    #[error("Environment variable error: {0} {1}")]
    EnvVarError(String, std::env::VarError),

    /// No credential was configured. Carries the environment variable that was consulted.
    #[error("Missing credential: set {0}")]
    MissingCredential(String),

    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("Invalid configuration value for {key}: {value:?}")]
    InvalidConfigValue { key: String, value: String },

    #[error("Invalid header value for {0}: {1}")]
    InvalidHeaderValue(String, reqwest::header::InvalidHeaderValue),

    /// The endpoint rejected the credential (HTTP 401 or 403).
    #[error("Unauthorized ({status}): {body}")]
    Unauthorized { status: u16, body: String },

    /// Any other non-success status returned by the endpoint.
    #[error("Service returned error status {status}: {body}")]
    ServiceError { status: u16, body: String },

    #[error("Response body is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("Response body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Unexpected response shape: {0}")]
    UnexpectedResponseShape(String),

    #[error("Response contained no summaries")]
    EmptyResponse,

    #[error("Response is missing the `summary_text` field")]
    MissingSummaryText,

    #[error("Summarization was cancelled")]
    Cancelled,

    /// Represents [`crate::config::ConfigBuilder`] errors.
    #[error(transparent)]
    ConfigBuilderError(#[from] crate::config::ConfigBuilderError),

    /// Represents [`crate::summarization::SummarizationRequestBuilder`] errors.
    #[error(transparent)]
    SummarizationRequestBuilderError(
        #[from] crate::summarization::SummarizationRequestBuilderError,
    ),

    /// Represents [`crate::summarization::SummarizationParametersBuilder`] errors.
    #[error(transparent)]
    SummarizationParametersBuilderError(
        #[from] crate::summarization::SummarizationParametersBuilderError,
    ),
}

/// Coarse classification of an [`Error`], used by callers to decide how to report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or invalid setup. Fatal, reported before any call is attempted.
    Configuration,
    /// Network failure, timeout or an unhealthy endpoint. The action may be retried.
    Transport,
    /// The endpoint answered with something that does not match the response contract.
    ResponseFormat,
    /// The caller abandoned the request.
    Cancelled,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::Configuration => "configuration error",
            ErrorKind::Transport => "transport error",
            ErrorKind::ResponseFormat => "response format error",
            ErrorKind::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::EnvVarError(..)
            | Error::MissingCredential(_)
            | Error::InvalidCredential(_)
            | Error::InvalidConfigValue { .. }
            | Error::InvalidHeaderValue(..)
            | Error::Unauthorized { .. }
            | Error::ConfigBuilderError(_)
            | Error::SummarizationRequestBuilderError(_)
            | Error::SummarizationParametersBuilderError(_) => ErrorKind::Configuration,
            // reqwest reports body decode failures through the same type
            Error::ReqwestError(e) if e.is_decode() => ErrorKind::ResponseFormat,
            Error::IOError(_) | Error::ReqwestError(_) | Error::ServiceError { .. } => {
                ErrorKind::Transport
            }
            Error::InvalidUtf8(_)
            | Error::InvalidJson(_)
            | Error::UnexpectedResponseShape(_)
            | Error::EmptyResponse
            | Error::MissingSummaryText => ErrorKind::ResponseFormat,
            Error::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Whether repeating the same action could succeed. Nothing in this crate retries on its own.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }
}

/// A specialized [`Result`] type for this summarize [`crate`].
///
/// This type is broadly used across summarize [`crate`] for any operation which may
/// produce an error.
///
/// This typedef is generally used to avoid writing out [`Error`] directly and
/// is otherwise a direct mapping to [`Result`].
///
/// # Examples
///
/// A convenience function that bubbles a `summarize::Result` to its caller:
///
/// ```
/// fn summarize_document() -> summarize::Result<()> {
///     // run some code that may produce an error from the summarize code
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;
