use bytes::Bytes;
use std::fmt;
use thiserror::Error;

/// The error type for azrest operations
#[derive(Error, Debug)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<anyhow::Error>,
    response: Option<Box<http::Response<Bytes>>>,
}

/// The kind of error that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Key material could not be used to compute a signature.
    ///
    /// This is always a configuration problem and must not be retried.
    SigningFailed,

    /// The service answered with a status code the operation did not expect.
    ///
    /// The response is attached, see [`Error::response`].
    UnexpectedStatus,

    /// Request cannot be built (invalid resource id, header value, uri...)
    RequestInvalid,

    /// Configuration error (missing fields, invalid values)
    ConfigInvalid,

    /// Reading the source or writing the sink failed while streaming.
    StreamFailed,

    /// Unexpected errors (network, I/O, decoding, etc.)
    Unexpected,
}

impl Error {
    /// Create a new error with the given kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
            response: None,
        }
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attach the response that caused this error.
    pub fn with_response(mut self, response: http::Response<Bytes>) -> Self {
        self.response = Some(Box::new(response));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the response attached to this error, if any.
    ///
    /// Errors of kind [`ErrorKind::UnexpectedStatus`] always carry one, so
    /// callers can read service specific error payloads.
    pub fn response(&self) -> Option<&http::Response<Bytes>> {
        self.response.as_deref()
    }

    /// Take the response attached to this error.
    pub fn into_response(self) -> Option<http::Response<Bytes>> {
        self.response.map(|v| *v)
    }

    /// Status code of the attached response.
    pub fn status(&self) -> Option<http::StatusCode> {
        self.response.as_ref().map(|v| v.status())
    }
}

// Convenience constructors
impl Error {
    /// Create a signing failed error
    pub fn signing_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SigningFailed, message)
    }

    /// Create an unexpected status error carrying the response.
    pub fn unexpected_status(response: http::Response<Bytes>) -> Self {
        Self::new(
            ErrorKind::UnexpectedStatus,
            format!("unexpected response status: {}", response.status()),
        )
        .with_response(response)
    }

    /// Create a request invalid error
    pub fn request_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RequestInvalid, message)
    }

    /// Create a config invalid error
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigInvalid, message)
    }

    /// Create a stream failed error
    pub fn stream_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StreamFailed, message)
    }

    /// Create an unexpected error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::SigningFailed => write!(f, "signing failed"),
            ErrorKind::UnexpectedStatus => write!(f, "unexpected status"),
            ErrorKind::RequestInvalid => write!(f, "invalid request"),
            ErrorKind::ConfigInvalid => write!(f, "invalid configuration"),
            ErrorKind::StreamFailed => write!(f, "stream failed"),
            ErrorKind::Unexpected => write!(f, "unexpected error"),
        }
    }
}

/// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, Error>;

// Common From implementations
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(err)
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderName> for Error {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::ToStrError> for Error {
    fn from(err: http::header::ToStrError) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::uri::InvalidUri> for Error {
    fn from(err: http::uri::InvalidUri) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::unexpected("serializing or deserializing JSON data failed")
            .with_source(anyhow::Error::from(err))
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<std::fmt::Error> for Error {
    fn from(err: std::fmt::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_status_keeps_response() {
        let resp = http::Response::builder()
            .status(http::StatusCode::CONFLICT)
            .header("x-ms-activity-id", "abc")
            .body(Bytes::from_static(b"{\"code\":\"Conflict\"}"))
            .unwrap();

        let err = Error::unexpected_status(resp);
        assert_eq!(err.kind(), ErrorKind::UnexpectedStatus);
        assert_eq!(err.status(), Some(http::StatusCode::CONFLICT));
        assert_eq!(err.to_string(), "unexpected response status: 409 Conflict");

        let resp = err.into_response().expect("response must be kept");
        assert_eq!(resp.body().as_ref(), b"{\"code\":\"Conflict\"}");
        assert_eq!(resp.headers()["x-ms-activity-id"], "abc");
    }

    #[test]
    fn test_error_without_response() {
        let err = Error::signing_failed("bad key");
        assert_eq!(err.kind(), ErrorKind::SigningFailed);
        assert!(err.response().is_none());
        assert!(err.status().is_none());
    }
}
