//! Shared helpers for FakePay integration tests.

use std::sync::Arc;

use axum::extract::Form;
use axum::http::StatusCode;
use tokio::sync::Mutex;

use fakepay::crypto::signed_digest;
use fakepay::domain::Installation;
use fakepay::server::AppState;
use fakepay::{InstallationRegistry, PaymentParams};

pub const TEST_INST_ID: &str = "211616";
pub const TEST_MD5_KEY: &str = "KEY1";
pub const TEST_CALLBACK_PW: &str = "PASSWORD1";

/// A deadline comfortably in the future (2100-01-01).
pub const FAR_FUTURE_MS: i64 = 4_102_444_800_000;

/// Callback parameter sets captured by the mock merchant, in arrival order.
pub type CapturedCallbacks = Arc<Mutex<Vec<Vec<(String, String)>>>>;

/// Application state with a single test installation pointing at
/// `callback_url`.
pub fn state_for(callback_url: &str) -> AppState {
    let registry = Arc::new(InstallationRegistry::from_installations(vec![
        Installation {
            id: TEST_INST_ID.to_string(),
            md5_key: TEST_MD5_KEY.to_string(),
            callback_url: callback_url.to_string(),
            callback_password: TEST_CALLBACK_PW.to_string(),
        },
    ]));
    AppState::new(registry)
}

/// Spawn a loopback merchant endpoint that records every callback it
/// receives and answers 200 with `body`.
pub async fn spawn_merchant_ok(body: &'static str) -> (String, CapturedCallbacks) {
    spawn_merchant(StatusCode::OK, body).await
}

/// Spawn a loopback merchant endpoint that always rejects with HTTP 500.
pub async fn spawn_merchant_failing(body: &'static str) -> (String, CapturedCallbacks) {
    spawn_merchant(StatusCode::INTERNAL_SERVER_ERROR, body).await
}

async fn spawn_merchant(status: StatusCode, body: &'static str) -> (String, CapturedCallbacks) {
    let captured: CapturedCallbacks = Arc::new(Mutex::new(Vec::new()));
    let sink = captured.clone();

    let app = axum::Router::new().route(
        "/callback",
        axum::routing::post(move |Form(params): Form<Vec<(String, String)>>| {
            let sink = sink.clone();
            async move {
                sink.lock().await.push(params);
                (status, body)
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/callback"), captured)
}

/// A loopback URL nothing is listening on.
pub async fn unreachable_callback_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/callback")
}

/// Form-encode a correctly signed transaction request for the test
/// installation, with optional extra fields signed alongside the standard
/// set.
pub fn signed_form(deadline_ms: i64, extra: &[(&str, &str)]) -> String {
    let mut pairs: Vec<(String, String)> = vec![
        ("instId".to_string(), TEST_INST_ID.to_string()),
        ("amount".to_string(), "10.00".to_string()),
        ("currency".to_string(), "GBP".to_string()),
        ("authValidTo".to_string(), deadline_ms.to_string()),
    ];
    for (k, v) in extra {
        pairs.push((k.to_string(), v.to_string()));
    }

    let fields = "instId:amount:currency:authValidTo";
    let signature = signed_digest(
        &PaymentParams::from_pairs(pairs.clone()),
        TEST_MD5_KEY,
        fields,
    );
    pairs.push(("signatureFields".to_string(), fields.to_string()));
    pairs.push(("signature".to_string(), signature));

    serde_urlencoded::to_string(&pairs).unwrap()
}

/// Pull the session handle out of a decision page.
pub fn extract_handle(page: &str) -> u64 {
    let idx = page.find("rid=").expect("decision page carries no handle");
    page[idx + 4..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .unwrap()
}

/// First value under `key` in a captured callback parameter set.
pub fn callback_value<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}
