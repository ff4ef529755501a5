//! HTTP utility functions for extracting request information.

use actix_web::HttpRequest;

/// Header carrying the gateway API key; matched case-insensitively.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Extract client IP address from request headers
///
/// Prefers the first hop of `X-Forwarded-For` or `X-Real-IP`, falling back to
/// the connection peer address.
pub fn extract_client_ip(req: &HttpRequest) -> String {
    for header_name in ["X-Forwarded-For", "X-Real-IP"] {
        if let Some(value) = req.headers().get(header_name).and_then(|h| h.to_str().ok()) {
            let ip = value.split(',').next().unwrap_or(value).trim();
            if !ip.is_empty() {
                return ip.to_string();
            }
        }
    }

    req.connection_info()
        .peer_addr()
        .unwrap_or("unknown")
        .to_string()
}

/// Extract user agent from request headers
pub fn extract_user_agent(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("User-Agent")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
}

/// True when the request carries a non-empty API key header
pub fn has_api_key(req: &HttpRequest) -> bool {
    req.headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|value| !value.trim().is_empty())
}
