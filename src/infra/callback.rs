//! Merchant callback dispatcher
//!
//! After the user decides, the gateway reports the outcome to the
//! installation's callback URL with a form-encoded POST. The parameter set
//! is rebuilt from the admitted request: `M_` passthrough fields verbatim,
//! the installation's callback password, and the decision-dependent auth
//! fields. The merchant's response body is relayed to the user byte for
//! byte, with no sanitisation, as the simulated gateway does.

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::{
    Decision, Installation, PaymentParams, AUTH_AMOUNT_KEY, AUTH_CURRENCY_KEY, CALLBACK_PW_KEY,
    TRANS_ID_KEY, TRANS_STATUS_KEY,
};
use crate::infra::{GatewayError, Result};

/// Build the outbound parameter set for a decision.
///
/// Completion reports the authorised amount and currency plus a generated
/// transaction id; cancellation reports only the status flag. The
/// transaction id is the current unix time in seconds, which matches the
/// digit count of the simulated gateway's real transaction ids.
pub fn callback_params(
    params: &PaymentParams,
    installation: &Installation,
    decision: Decision,
) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = params
        .merchant_fields()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    out.push((
        CALLBACK_PW_KEY.to_string(),
        installation.callback_password.clone(),
    ));

    if decision == Decision::Complete {
        out.push((AUTH_AMOUNT_KEY.to_string(), params.amount().to_string()));
        out.push((AUTH_CURRENCY_KEY.to_string(), params.currency().to_string()));
        out.push((TRANS_ID_KEY.to_string(), Utc::now().timestamp().to_string()));
    }
    out.push((
        TRANS_STATUS_KEY.to_string(),
        decision.trans_status().to_string(),
    ));

    out
}

/// Delivers outcome callbacks to merchant endpoints.
pub struct CallbackDispatcher {
    client: reqwest::Client,
}

impl CallbackDispatcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// POST the outcome to the installation's callback URL and return the
    /// raw response body.
    ///
    /// The call is awaited inline with no retry and no timeout beyond the
    /// client default. Transport failures and non-200 statuses both fail
    /// the resolution; a non-200 response keeps its body for diagnostics.
    pub async fn dispatch(
        &self,
        params: &PaymentParams,
        installation: &Installation,
        decision: Decision,
    ) -> Result<String> {
        let form = callback_params(params, installation, decision);
        let url = &installation.callback_url;

        let response = self
            .client
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                warn!(%url, error = %e, "callback transport failure");
                GatewayError::CallbackTransport {
                    url: url.clone(),
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::CallbackTransport {
                url: url.clone(),
                message: e.to_string(),
            })?;

        if status != reqwest::StatusCode::OK {
            warn!(%url, status = status.as_u16(), "callback rejected by merchant");
            return Err(GatewayError::CallbackHttp {
                url: url.clone(),
                status: status.as_u16(),
                body,
            });
        }

        info!(%url, %decision, "callback delivered");
        Ok(body)
    }
}

impl Default for CallbackDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
