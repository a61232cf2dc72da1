//! Infrastructure layer for the FakePay gateway
//!
//! Contains the working parts behind the HTTP surface:
//! - Installation registry (read-only, loaded at startup)
//! - Expiring session cache (per-entry absolute deadlines)
//! - Transaction session manager (admission/resolution state machine)
//! - Callback dispatcher (outbound merchant notification)

mod cache;
mod callback;
mod error;
mod registry;
mod session;

pub use cache::{is_expired, now_ms, CacheStats, ExpiringCache};
pub use callback::{callback_params, CallbackDispatcher};
pub use error::*;
pub use registry::InstallationRegistry;
pub use session::SessionManager;
