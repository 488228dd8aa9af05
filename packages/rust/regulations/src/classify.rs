//! Maps HTTP statuses and transport failures onto [`NaviError`].

use navi_shared::NaviError;
use reqwest::StatusCode;

/// Classify a non-success HTTP status.
pub fn classify_status(status: StatusCode) -> NaviError {
    match status {
        StatusCode::UNAUTHORIZED => NaviError::auth("invalid credential"),
        StatusCode::FORBIDDEN => NaviError::permission("insufficient access"),
        StatusCode::TOO_MANY_REQUESTS => {
            NaviError::http_status(status.as_u16(), "rate limit exceeded")
        }
        _ => NaviError::http_status(
            status.as_u16(),
            status.canonical_reason().unwrap_or("unexpected status"),
        ),
    }
}

/// Classify a failure that happened before or while reading a response.
///
/// The request URL is stripped first: it carries the API key.
pub fn classify_transport(err: reqwest::Error) -> NaviError {
    let err = err.without_url();
    let detail = with_causes(&err);
    if err.is_timeout() {
        NaviError::transport(format!("request timed out: {detail}"))
    } else if err.is_connect() {
        NaviError::transport(format!("failed to connect to regulations.gov: {detail}"))
    } else {
        NaviError::transport(detail)
    }
}

/// `err` followed by each distinct message in its `source()` chain.
fn with_causes(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Classify a response body that is not the JSON shape we expect.
pub fn classify_malformed(what: &str, err: serde_json::Error) -> NaviError {
    NaviError::transport(format!("malformed {what} response: {err}"))
}
