//! HTTP endpoints for the FakePay gateway.
//!
//! - `POST /fakepay-transaction` - admit a signed transaction, show the
//!   complete-or-cancel page
//! - `GET /complete-payment` - resolve a session as completed and relay the
//!   merchant callback response
//! - `GET /cancel-payment` - resolve a session as cancelled, same relay
//! - `POST /dump-params` - debug sink for exercising callbacks locally
//! - `GET /service-status` - service indicator with cache statistics

use axum::extract::{Form, Query, State};
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::api::error::{escape_html, ErrorPage};
use crate::domain::{Decision, PaymentParams};
use crate::infra::GatewayError;
use crate::server::AppState;

/// Build the gateway router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/fakepay-transaction", post(fakepay_transaction))
        .route("/complete-payment", get(complete_payment))
        .route("/cancel-payment", get(cancel_payment))
        .route("/dump-params", post(dump_params))
        .route("/service-status", get(service_status))
}

/// Query parameters for the resolve endpoints. `rid` is the session handle
/// issued at admission, carried through the decision page links.
#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    rid: Option<u64>,
}

/// POST /fakepay-transaction - admit a new signed transaction.
pub async fn fakepay_transaction(
    State(state): State<AppState>,
    Form(params): Form<PaymentParams>,
) -> Result<Html<String>, ErrorPage> {
    let amount = params.amount().to_string();
    let currency = params.currency().to_string();

    let handle = state.sessions.admit(params).await?;

    Ok(Html(decision_page(handle, &amount, &currency)))
}

/// GET /complete-payment - resolve the session as completed.
pub async fn complete_payment(
    State(state): State<AppState>,
    Query(query): Query<ResolveQuery>,
) -> Result<Html<String>, ErrorPage> {
    resolve_session(&state, &query, Decision::Complete).await
}

/// GET /cancel-payment - resolve the session as cancelled.
pub async fn cancel_payment(
    State(state): State<AppState>,
    Query(query): Query<ResolveQuery>,
) -> Result<Html<String>, ErrorPage> {
    resolve_session(&state, &query, Decision::Cancel).await
}

/// Shared resolve path: consume the session, dispatch the callback, relay
/// the merchant's response body verbatim.
async fn resolve_session(
    state: &AppState,
    query: &ResolveQuery,
    decision: Decision,
) -> Result<Html<String>, ErrorPage> {
    let handle = query.rid.ok_or(GatewayError::SessionNotFound)?;

    // The entry leaves the cache here; the callback below runs without any
    // cache lock held, and a repeat visit observes a plain miss.
    let entry = state.sessions.resolve(handle).await?;

    let installation = state
        .registry
        .get(&entry.installation_id)
        .cloned()
        .ok_or_else(|| GatewayError::UnknownInstallation(entry.installation_id.clone()))?;

    let body = state
        .dispatcher
        .dispatch(&entry.params, &installation, decision)
        .await?;

    info!(handle, %decision, "payment session resolved");

    // Relayed byte for byte; the simulated gateway applies no sanitisation
    // here either.
    Ok(Html(body))
}

/// POST /dump-params - log every form field and answer with a fixed body.
///
/// Point an installation's callback_url here to see exactly what a merchant
/// would receive.
pub async fn dump_params(Form(params): Form<PaymentParams>) -> &'static str {
    for (name, value) in params.iter() {
        info!("{name} = {value}");
    }
    "Hello, this is a callback response page."
}

/// GET /service-status - service indicator.
pub async fn service_status(State(state): State<AppState>) -> Json<serde_json::Value> {
    let stats = state.sessions.cache_stats();
    Json(serde_json::json!({
        "status": "up",
        "service": "fakepay",
        "version": env!("CARGO_PKG_VERSION"),
        "time": Utc::now().to_rfc3339(),
        "sessions": {
            "stored": state.sessions.stored_sessions().await,
            "hits": stats.hits(),
            "misses": stats.misses(),
            "expirations": stats.expirations(),
        },
    }))
}

/// The mock complete-or-cancel page, carrying the session handle in its
/// links.
fn decision_page(handle: u64, amount: &str, currency: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>FakePay</title></head>\n<body>\n\
         <h1>Confirm your payment</h1>\n\
         <p>Amount: {amount} {currency}</p>\n\
         <p>\n\
         <a href=\"/complete-payment?rid={handle}\">Complete payment</a>\n\
         <a href=\"/cancel-payment?rid={handle}\">Cancel</a>\n\
         </p>\n\
         </body>\n</html>\n",
        amount = escape_html(amount),
        currency = escape_html(currency),
        handle = handle,
    )
}
