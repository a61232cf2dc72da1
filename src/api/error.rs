//! User-facing error pages
//!
//! Every gateway failure surfaces to the end user as a small HTML error
//! page with a human-readable message and, for merchant callback rejections,
//! the raw upstream response body as diagnostic detail. Each failure is
//! isolated to its request; none is retried.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use tracing::warn;

use crate::infra::GatewayError;

/// A rendered error presentation: HTTP status, message shown to the user,
/// and optional diagnostic detail.
#[derive(Debug, Clone)]
pub struct ErrorPage {
    status: StatusCode,
    message: String,
    detail: Option<String>,
}

impl ErrorPage {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    fn render(&self) -> String {
        let mut page = String::from(
            "<!DOCTYPE html>\n<html>\n<head><title>FakePay</title></head>\n<body>\n<h1>Payment error</h1>\n",
        );
        page.push_str(&format!("<p>{}</p>\n", escape_html(&self.message)));
        if let Some(detail) = &self.detail {
            page.push_str(&format!("<pre>{}</pre>\n", escape_html(detail)));
        }
        page.push_str("</body>\n</html>\n");
        page
    }
}

impl From<GatewayError> for ErrorPage {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::UnknownInstallation(_) => ErrorPage::new(
                StatusCode::BAD_REQUEST,
                "An invalid installation id was provided on the payment request.",
            ),
            GatewayError::InvalidSignature(_) => ErrorPage::new(
                StatusCode::BAD_REQUEST,
                "The payment request was invalid. Please check the MD5 keys match.",
            ),
            GatewayError::SessionExpired => ErrorPage::new(
                StatusCode::GONE,
                "The time limit on completing your payment has expired.",
            ),
            GatewayError::SessionNotFound => ErrorPage::new(
                StatusCode::NOT_FOUND,
                "Your session has timed out, please try again.",
            ),
            GatewayError::CallbackTransport { url, message } => ErrorPage::new(
                StatusCode::BAD_GATEWAY,
                format!("Callback to {url} failed, reason: '{message}'."),
            ),
            GatewayError::CallbackHttp { url, status, body } => ErrorPage::new(
                StatusCode::BAD_GATEWAY,
                format!("Callback to {url} failed. Status code '{status}'."),
            )
            .with_detail(body),
            GatewayError::Configuration(message) => {
                ErrorPage::new(StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        }
    }
}

impl IntoResponse for ErrorPage {
    fn into_response(self) -> Response {
        warn!(status = %self.status, message = %self.message, "request failed");
        (self.status, Html(self.render())).into_response()
    }
}

/// Minimal HTML escaping for text interpolated into a served page.
pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
