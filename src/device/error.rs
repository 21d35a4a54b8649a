//! Error types raised while talking to the light.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`DeviceError`] failures.
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Failures that can occur while interacting with the light.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build HTTP client")]
    ClientBuilder {
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// A request could not be sent or timed out.
    #[error("failed to send request to `{url}`")]
    RequestSend {
        /// Target URL.
        url: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },
    /// The light answered with a non-success status.
    #[error("unexpected response status {status} from `{url}`")]
    RequestStatus {
        /// Target URL.
        url: String,
        /// Status returned by the light.
        status: StatusCode,
    },
    /// Response payload could not be decoded.
    #[error("failed to decode response from `{url}`")]
    DecodeResponse {
        /// Target URL.
        url: String,
        /// Underlying decoding error.
        #[source]
        source: reqwest::Error,
    },
    /// The light index is not present in the response.
    #[error("light {index} not reported by device ({count} lights available)")]
    MissingLight {
        /// Requested light index.
        index: usize,
        /// Number of lights in the response.
        count: usize,
    },
}

impl DeviceError {
    /// Transport status attached to the failure, when the light answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            DeviceError::RequestStatus { status, .. } => Some(*status),
            DeviceError::RequestSend { source, .. } | DeviceError::DecodeResponse { source, .. } => {
                source.status()
            }
            DeviceError::ClientBuilder { .. } | DeviceError::MissingLight { .. } => None,
        }
    }
}
