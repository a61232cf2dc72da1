//! Error types for the FakePay gateway

use thiserror::Error;

/// Errors that can occur while admitting or resolving a payment session.
///
/// Every variant is terminal for the current request: nothing is retried
/// internally and no failure crosses request boundaries.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// No installation is registered under the supplied id
    #[error("unknown installation id: {0:?}")]
    UnknownInstallation(String),

    /// The request checksum does not match the installation's secret
    #[error("signature mismatch for installation {0}")]
    InvalidSignature(String),

    /// The authorisation deadline has passed, at admission or resolution
    #[error("authorisation window expired")]
    SessionExpired,

    /// The handle references no live session (never issued, already
    /// resolved, or evicted)
    #[error("no session for the presented handle")]
    SessionNotFound,

    /// The outbound callback could not be delivered
    #[error("callback to {url} failed: {message}")]
    CallbackTransport { url: String, message: String },

    /// The merchant callback endpoint answered with a non-200 status
    #[error("callback to {url} returned status {status}")]
    CallbackHttp {
        url: String,
        status: u16,
        body: String,
    },

    /// Startup configuration problem (unreadable or malformed registry)
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Result type for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;
