//! Sync error types.

/// Typed errors returned by the bookmark service.
///
/// Every non-success status code maps onto exactly one variant, so callers
/// can match on the condition instead of inspecting raw status codes.
#[derive(Debug)]
pub enum ApiError {
    /// 400 - the service rejected the request body
    Validation(String),
    /// 401 - missing or invalid API token
    Auth,
    /// 403 - token is valid but not allowed to perform the operation
    Forbidden,
    /// 404 - no record under the requested identifier
    NotFound,
    /// 429 - the service is throttling us
    RateLimited,
    /// 500 - the service failed internally
    Server(String),
    /// Any status code outside the documented set
    Unexpected(u16, String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Validation(detail) => write!(f, "Validation failed: {}", detail),
            ApiError::Auth => write!(f, "Authentication failed. Check your API token."),
            ApiError::Forbidden => write!(f, "Access denied"),
            ApiError::NotFound => write!(f, "Not found"),
            ApiError::RateLimited => write!(f, "Rate limited by server"),
            ApiError::Server(detail) => write!(f, "Server error: {}", detail),
            ApiError::Unexpected(status, detail) => {
                write!(f, "Unexpected status {}: {}", status, detail)
            }
        }
    }
}

impl std::error::Error for ApiError {}

/// Failures below the HTTP layer: the request never produced a response.
#[derive(Debug)]
pub enum TransportError {
    /// Could not establish a connection (refused, reset, DNS failure,
    /// network unreachable)
    Connect(String),
    /// The connect or overall request deadline elapsed
    Timeout(String),
    /// The connection dropped before a response arrived
    Interrupted(String),
    /// The request could not be built or sent at all
    Invalid(String),
    /// All retry attempts failed; carries the last underlying cause
    RetriesExhausted {
        attempts: u32,
        last: Box<TransportError>,
    },
    /// The operation was cancelled before completing
    Cancelled,
}

impl TransportError {
    /// Classifies a reqwest failure into the transport taxonomy.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_builder() || err.is_redirect() {
            TransportError::Invalid(err.to_string())
        } else if err.is_request() {
            TransportError::Interrupted(err.to_string())
        } else {
            TransportError::Invalid(err.to_string())
        }
    }

    /// Fixed allow-list of conditions worth another attempt.
    ///
    /// Only failures that never produced a response qualify. An HTTP
    /// response, however unwelcome its status, is handled by the client.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TransportError::Connect(_)
                | TransportError::Timeout(_)
                | TransportError::Interrupted(_)
        )
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Connect(e) => write!(f, "Connection failed: {}", e),
            TransportError::Timeout(e) => write!(f, "Request timed out: {}", e),
            TransportError::Interrupted(e) => write!(f, "Connection interrupted: {}", e),
            TransportError::Invalid(e) => write!(f, "Request failed: {}", e),
            TransportError::RetriesExhausted { attempts, last } => {
                write!(f, "Giving up after {} attempts: {}", attempts, last)
            }
            TransportError::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl std::error::Error for TransportError {}

/// Umbrella error for all sync operations.
#[derive(Debug)]
pub enum SyncError {
    /// Sync is not configured
    NotConfigured,
    /// Network-level failure, already retried where appropriate
    Transport(TransportError),
    /// The service answered with a non-success status
    Api(ApiError),
    /// The response body could not be decoded
    Decode(String),
    /// Local filesystem failure (asset downloads)
    Io(std::io::Error),
}

impl SyncError {
    /// True when the failure was a cancellation rather than a real error.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SyncError::Transport(TransportError::Cancelled))
    }
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncError::NotConfigured => write!(
                f,
                "Sync not configured. Add server_url and api_token to config."
            ),
            SyncError::Transport(e) => write!(f, "Transport error: {}", e),
            SyncError::Api(e) => write!(f, "{}", e),
            SyncError::Decode(e) => write!(f, "Failed to decode response: {}", e),
            SyncError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::Transport(e) => Some(e),
            SyncError::Api(e) => Some(e),
            SyncError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TransportError> for SyncError {
    fn from(e: TransportError) -> Self {
        SyncError::Transport(e)
    }
}

impl From<ApiError> for SyncError {
    fn from(e: ApiError) -> Self {
        SyncError::Api(e)
    }
}

impl From<std::io::Error> for SyncError {
    fn from(e: std::io::Error) -> Self {
        SyncError::Io(e)
    }
}
