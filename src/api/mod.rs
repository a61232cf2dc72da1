//! HTTP surface for the FakePay gateway
//!
//! Request handlers and the user-facing error presentation. Rendering is
//! deliberately minimal: the interesting contracts are the session
//! lifecycle and the callback relay, not the markup.

mod error;
mod rest;

pub use error::ErrorPage;
pub use rest::*;
