use once_cell::sync::Lazy;
use regex::Regex;

use crate::DataFastApiError;

static RESOURCE_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/v1/(checkouts|payments)/[A-Za-z0-9.\-]+(/payment)?$").expect("valid regex"));

/// Checks that `path` is an opaque path inside the gateway's namespace before any credential is attached to it.
///
/// Absolute URLs, protocol-relative paths, traversal, query strings and anything outside `/v1/checkouts/` or
/// `/v1/payments/` are rejected.
pub fn validate_resource_path(path: &str) -> Result<&str, DataFastApiError> {
    let invalid = |reason: &str| Err(DataFastApiError::InvalidResourcePath(format!("{reason}: {path:?}")));
    if path.trim().is_empty() {
        return invalid("empty path");
    }
    if path.contains("://") || path.starts_with("//") {
        return invalid("absolute URLs are not allowed");
    }
    if !path.starts_with('/') {
        return invalid("path must start with '/'");
    }
    if path.contains("..") {
        return invalid("path traversal is not allowed");
    }
    if !RESOURCE_PATH.is_match(path) {
        return invalid("path is outside the gateway namespace");
    }
    Ok(path)
}

static CHECKOUT_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9.\-]+$").expect("valid regex"));

/// Checks that a gateway-issued checkout id can be embedded in a resource path and a widget URL as-is.
pub fn validate_checkout_id(checkout_id: &str) -> Result<&str, DataFastApiError> {
    if !CHECKOUT_ID.is_match(checkout_id) || checkout_id.contains("..") {
        return Err(DataFastApiError::JsonError(format!("Unexpected checkout id: {checkout_id:?}")));
    }
    Ok(checkout_id)
}

/// The resource path the payment widget reports back for a checkout.
pub fn checkout_resource_path(checkout_id: &str) -> String {
    format!("/v1/checkouts/{checkout_id}/payment")
}
