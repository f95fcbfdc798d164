use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectError {
    #[error("failed to {operation} at: {key}, {message}")]
    Backend {
        operation: &'static str,
        key: String,
        message: String,
    },

    #[error("failed to read body for: {key}, {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("missing configuration: {0}")]
    Config(String),
}

impl ObjectError {
    pub fn backend(operation: &'static str, key: &str, message: impl Into<String>) -> Self {
        ObjectError::Backend {
            operation,
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// One response of a paginated listing. `next_token` is `None` only on the
/// final page.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListingPage {
    pub keys: Vec<String>,
    pub next_token: Option<String>,
}

#[derive(Debug)]
pub struct KeyFailure {
    pub key: String,
    pub error: ObjectError,
}

/// Per-key result of a rename or delete that touches many objects. When the
/// listing breaks off, `listing_error` holds the cause and the keys after it
/// were never visited.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub succeeded: Vec<String>,
    pub failed: Vec<KeyFailure>,
    pub listing_error: Option<ObjectError>,
}

impl BatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.listing_error.is_none()
    }

    pub fn record(&mut self, key: String, result: Result<(), ObjectError>) {
        match result {
            Ok(()) => self.succeeded.push(key),
            Err(error) => self.failed.push(KeyFailure { key, error }),
        }
    }
}
