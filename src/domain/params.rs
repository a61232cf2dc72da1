//! Ordered payment request parameters
//!
//! Inbound requests are form-encoded key/value pairs with a dynamic field
//! set: a handful of fields the gateway inspects, plus arbitrary `M_`
//! merchant passthrough fields. They are kept as an order-preserving list of
//! pairs rather than a fixed struct so passthrough fields survive verbatim
//! and in order.

use serde::Deserialize;

use super::types::{AMOUNT_KEY, AUTH_VALID_TO_KEY, CURRENCY_KEY, MERCHANT_FIELD_PREFIX};

/// An ordered mapping of field name to string value.
///
/// Lookups return the first occurrence of a repeated name, matching how the
/// simulated gateway reads its form input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct PaymentParams(Vec<(String, String)>);

impl PaymentParams {
    /// Build from explicit pairs, preserving their order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Value of the first field named `name`, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether any field named `name` is present.
    pub fn has(&self, name: &str) -> bool {
        self.0.iter().any(|(k, _)| k == name)
    }

    /// All fields in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The `M_`-prefixed merchant passthrough fields, in arrival order.
    pub fn merchant_fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter()
            .filter(|(name, _)| name.starts_with(MERCHANT_FIELD_PREFIX))
    }

    /// The authorisation deadline in epoch milliseconds.
    ///
    /// A missing or non-numeric `authValidTo` coerces to 0, i.e. a deadline
    /// that has always already passed.
    pub fn auth_valid_to_ms(&self) -> i64 {
        self.get(AUTH_VALID_TO_KEY)
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(0)
    }

    /// The transaction amount, empty if absent.
    pub fn amount(&self) -> &str {
        self.get(AMOUNT_KEY).unwrap_or_default()
    }

    /// The transaction currency, empty if absent.
    pub fn currency(&self) -> &str {
        self.get(CURRENCY_KEY).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
