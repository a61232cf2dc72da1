//! Checksum utilities for the simulated gateway protocol

mod signature;

pub use signature::{signed_digest, validate_signature};
