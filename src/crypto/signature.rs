//! Legacy MD5 request checksum
//!
//! Inbound requests carry a self-described signature: `signatureFields`
//! names the signed fields in order, and `signature` holds the lowercase-hex
//! MD5 of `md5_key ; signatureFields ; value_1 ; value_2 ; ...`. This is the
//! simulated gateway's historical scheme, reproduced for protocol
//! compatibility; it is a checksum, not an HMAC, and offers no real
//! cryptographic protection.

use md5::{Digest, Md5};

use crate::domain::{PaymentParams, SIGNATURE_DELIMITER, SIGNATURE_FIELDS_KEY, SIGNATURE_KEY};

/// Verify the checksum of an inbound request against the installation's
/// shared secret.
///
/// Pure and side-effect free. Fails (returns `false`) when
/// `signatureFields` or `signature` is absent. A listed field missing from
/// the request contributes the empty string to the preimage. Comparison is
/// exact and case-sensitive, with no normalization or trimming.
pub fn validate_signature(params: &PaymentParams, md5_key: &str) -> bool {
    let Some(signature_fields) = params.get(SIGNATURE_FIELDS_KEY) else {
        return false;
    };
    let Some(supplied) = params.get(SIGNATURE_KEY) else {
        return false;
    };

    signed_digest(params, md5_key, signature_fields) == supplied
}

/// Compute the lowercase-hex MD5 checksum for `params` over the given
/// ordered field list.
pub fn signed_digest(params: &PaymentParams, md5_key: &str, signature_fields: &str) -> String {
    let mut preimage = String::from(md5_key);
    preimage.push(SIGNATURE_DELIMITER);
    preimage.push_str(signature_fields);

    for field in signature_fields.split(':') {
        preimage.push(SIGNATURE_DELIMITER);
        preimage.push_str(params.get(field).unwrap_or_default());
    }

    hex::encode(Md5::digest(preimage.as_bytes()))
}
