//! FakePay
//!
//! A simulator for a third-party payment gateway's hosted-payment-page
//! flow: merchants POST a signed transaction request, the user is shown a
//! mock complete-or-cancel page, and the outcome is reported back to the
//! merchant's callback URL with the gateway's parameter-transformation
//! rules applied.
//!
//! ## Modules
//!
//! - [`domain`] - Wire constants, installations, ordered payment parameters
//! - [`crypto`] - The legacy MD5 request checksum
//! - [`infra`] - Registry, expiring session cache, session manager,
//!   callback dispatcher
//! - [`api`] - HTTP endpoints and the user-facing error pages
//! - [`server`] - Configuration and bootstrap

pub mod api;
pub mod crypto;
pub mod domain;
pub mod infra;
pub mod server;

// Re-export commonly used types
pub use domain::{Decision, Installation, PaymentParams, SessionEntry};
pub use infra::{
    CallbackDispatcher, ExpiringCache, GatewayError, InstallationRegistry, Result, SessionManager,
};
