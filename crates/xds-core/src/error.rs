//! Error types for the control plane.
//!
//! [`XdsError`] covers every failure the delivery path can surface and maps
//! onto a gRPC status code so a stream can be closed with a meaningful reason.

/// Error type for xDS delivery and server setup.
///
/// Translation itself never fails: units that cannot be rendered are left out
/// of the output. The variants here describe what can go wrong once resources
/// leave the caches.
///
/// # Example
///
/// ```rust
/// use xds_core::{TypeUrl, XdsError};
///
/// let err = XdsError::EncodingError {
///     type_url: TypeUrl::CLUSTER.to_string(),
///     message: "response of 5242880 bytes exceeds limit".to_string(),
/// };
/// let status: tonic::Status = err.into();
/// assert_eq!(status.code(), tonic::Code::ResourceExhausted);
/// ```
#[derive(Debug, thiserror::Error)]
pub enum XdsError {
    /// Request named a type URL this server does not serve.
    #[error("invalid type URL: {type_url} - {reason}")]
    InvalidTypeUrl {
        /// The offending type URL.
        type_url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A discovery response could not be encoded within the message limit.
    #[error("encoding error for {type_url}: {message}")]
    EncodingError {
        /// Type URL of the response being built.
        type_url: String,
        /// Error message.
        message: String,
    },

    /// The first request on a stream did not identify its node.
    #[error("first request on a stream must include node information")]
    MissingNode,

    /// The proxy rejected a response.
    #[error("NACK received from {node_id} for {type_url} (nonce {nonce}): {error_message}")]
    NackReceived {
        /// Node that rejected the response.
        node_id: String,
        /// Type URL of the rejected response.
        type_url: String,
        /// Nonce of the rejected response.
        nonce: String,
        /// Error detail reported by the proxy.
        error_message: String,
    },

    /// The response side of a stream went away.
    #[error("stream closed: {reason}")]
    StreamClosed {
        /// Reason for closure.
        reason: String,
    },

    /// Server is shutting down.
    #[error("server is shutting down")]
    Shutdown,

    /// gRPC transport failure.
    #[error("transport error: {message}")]
    TransportError {
        /// Error message.
        message: String,
        /// Underlying error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid server or translator configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl XdsError {
    /// Create a transport error from any error type.
    pub fn transport<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::TransportError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid type URL error.
    pub fn unknown_type(type_url: impl Into<String>) -> Self {
        Self::InvalidTypeUrl {
            type_url: type_url.into(),
            reason: "no resource cache is registered for this type".into(),
        }
    }
}

impl From<XdsError> for tonic::Status {
    fn from(err: XdsError) -> Self {
        match &err {
            XdsError::InvalidTypeUrl { .. } | XdsError::MissingNode => {
                tonic::Status::invalid_argument(err.to_string())
            }
            XdsError::EncodingError { .. } => tonic::Status::resource_exhausted(err.to_string()),
            // NACKs are reported by the proxy, they never close the stream.
            XdsError::NackReceived { .. } => tonic::Status::ok(err.to_string()),
            XdsError::StreamClosed { .. } => tonic::Status::cancelled(err.to_string()),
            XdsError::Shutdown | XdsError::TransportError { .. } => {
                tonic::Status::unavailable(err.to_string())
            }
            XdsError::Configuration(_) => tonic::Status::failed_precondition(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TypeUrl;

    #[test]
    fn test_error_display() {
        let err = XdsError::unknown_type("type.googleapis.com/envoy.Unknown");
        assert!(err.to_string().contains("envoy.Unknown"));
    }

    #[test]
    fn test_error_to_status() {
        let status: tonic::Status = XdsError::MissingNode.into();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);

        let status: tonic::Status = XdsError::Shutdown.into();
        assert_eq!(status.code(), tonic::Code::Unavailable);

        let status: tonic::Status = XdsError::EncodingError {
            type_url: TypeUrl::LISTENER.to_string(),
            message: "too large".to_string(),
        }
        .into();
        assert_eq!(status.code(), tonic::Code::ResourceExhausted);
    }

    #[test]
    fn test_transport_error_helper() {
        let io_err = std::io::Error::other("bind failed");
        let err = XdsError::transport("serve", io_err);
        assert!(matches!(err, XdsError::TransportError { source: Some(_), .. }));
    }
}
