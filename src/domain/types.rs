//! Core type definitions for the FakePay gateway
//!
//! Wire-level field names for the simulated gateway protocol, the merchant
//! installation record, and the user decision reported through the callback.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Wire Protocol Constants
// ============================================================================

/// Delimiter between the components of the signature preimage
pub const SIGNATURE_DELIMITER: char = ';';

/// Field carrying the colon-delimited list of signed field names
pub const SIGNATURE_FIELDS_KEY: &str = "signatureFields";

/// Field carrying the lowercase-hex MD5 checksum
pub const SIGNATURE_KEY: &str = "signature";

/// Field carrying the merchant installation id
pub const INST_ID_KEY: &str = "instId";

/// Field carrying the absolute authorisation deadline (epoch milliseconds)
pub const AUTH_VALID_TO_KEY: &str = "authValidTo";

/// Field carrying the transaction amount
pub const AMOUNT_KEY: &str = "amount";

/// Field carrying the transaction currency
pub const CURRENCY_KEY: &str = "currency";

/// Prefix marking merchant passthrough fields, relayed verbatim on callback
pub const MERCHANT_FIELD_PREFIX: &str = "M_";

/// Callback field carrying the installation's callback password
pub const CALLBACK_PW_KEY: &str = "callbackPW";

/// Callback field carrying the authorised amount (complete only)
pub const AUTH_AMOUNT_KEY: &str = "authAmount";

/// Callback field carrying the authorised currency (complete only)
pub const AUTH_CURRENCY_KEY: &str = "authCurrency";

/// Callback field carrying the generated transaction id (complete only)
pub const TRANS_ID_KEY: &str = "transId";

/// Callback field carrying the outcome flag: `Y` complete, `C` cancelled
pub const TRANS_STATUS_KEY: &str = "transStatus";

// ============================================================================
// Installation
// ============================================================================

/// A registered merchant configuration, keyed by the id supplied in every
/// payment request. Immutable after load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installation {
    /// Installation id as it appears in `instId`
    pub id: String,
    /// Shared secret prefixed to the signature preimage
    pub md5_key: String,
    /// Merchant endpoint receiving the outcome callback
    pub callback_url: String,
    /// Password echoed to the merchant in `callbackPW`
    pub callback_password: String,
}

// ============================================================================
// Decision
// ============================================================================

/// The user's choice on the hosted payment page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Complete the payment (`transStatus=Y`)
    Complete,
    /// Cancel the payment (`transStatus=C`)
    Cancel,
}

impl Decision {
    /// The `transStatus` value reported to the merchant.
    pub fn trans_status(&self) -> &'static str {
        match self {
            Decision::Complete => "Y",
            Decision::Cancel => "C",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Complete => write!(f, "complete"),
            Decision::Cancel => write!(f, "cancel"),
        }
    }
}

// ============================================================================
// Session Entry
// ============================================================================

/// Snapshot of an admitted payment request, owned by the session cache until
/// expiry or resolution.
#[derive(Debug, Clone)]
pub struct SessionEntry {
    /// The inbound parameters exactly as admitted
    pub params: super::PaymentParams,
    /// Id of the installation that signed the request
    pub installation_id: String,
}
