use thiserror::Error;

/// Errors from [`super::ParcelLocator::locate`] and
/// [`super::ParcelDetailSource::fetch_detail`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The registry answered with a functional error code.
    #[error("registry reported error {code}: {description}")]
    Service {
        /// Upstream error code.
        code: String,
        /// Upstream error description.
        description: String,
    },
    /// The request could not be sent or no response arrived.
    #[error("network error for {url}: {message}")]
    Network {
        /// Request URL.
        url: String,
        /// Error message.
        message: String,
    },
    /// The request exceeded the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Request URL.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The registry answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}: {message}")]
    Http {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse registry response: {message}")]
    Parse {
        /// Error message.
        message: String,
    },
}

impl RegistryError {
    /// Whether the failure happened below the registry's own protocol.
    ///
    /// Transport errors and functional errors are handled identically by
    /// the resolver but are reported differently.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        !matches!(self, Self::Service { .. })
    }
}
