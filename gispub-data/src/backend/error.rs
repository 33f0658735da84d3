//! Errors produced while talking to the import backend.

use std::io;

use thiserror::Error;

/// Transport-level errors encountered while issuing HTTP requests.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// The server returned an HTTP error status.
    #[error("request to {url} failed with status {status}: {message}")]
    Http {
        /// Fully qualified request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Short error description supplied by the server.
        message: String,
    },
    /// The request failed due to an I/O error.
    #[error("network error contacting {url}: {source}")]
    Network {
        /// Fully qualified request URL.
        url: String,
        /// I/O error reported by the transport.
        #[source]
        source: io::Error,
    },
    /// The response body was not the expected JSON.
    #[error("unexpected response from {url}: {message}")]
    Decode {
        /// Fully qualified request URL.
        url: String,
        /// Decoder diagnostic.
        message: String,
    },
}

impl TransportError {
    /// URL of the failed request.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Http { url, .. } | Self::Network { url, .. } | Self::Decode { url, .. } => url,
        }
    }
}

/// Errors raised while constructing an [`HttpBackend`](super::HttpBackend).
#[derive(Debug, Error)]
pub enum BackendBuildError {
    /// The configured host is not an absolute URL.
    #[error("invalid backend host {host:?}: {source}")]
    InvalidHost {
        /// Rejected host.
        host: String,
        /// Parser diagnostic.
        #[source]
        source: url::ParseError,
    },
    /// The host uses a scheme other than HTTP(S).
    #[error("backend host {host:?} must use http or https")]
    UnsupportedScheme {
        /// Rejected host.
        host: String,
    },
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {source}")]
    HttpClient {
        /// Builder error.
        #[source]
        source: reqwest::Error,
    },
}

pub(crate) fn convert_reqwest_error(error: reqwest::Error, url: &str) -> TransportError {
    if let Some(status) = error.status() {
        return TransportError::Http {
            url: url.to_owned(),
            status: status.as_u16(),
            message: error.to_string(),
        };
    }
    if error.is_decode() {
        return TransportError::Decode {
            url: url.to_owned(),
            message: error.to_string(),
        };
    }

    let kind = if error.is_timeout() {
        io::ErrorKind::TimedOut
    } else {
        io::ErrorKind::Other
    };
    TransportError::Network {
        url: url.to_owned(),
        source: io::Error::new(kind, error),
    }
}
