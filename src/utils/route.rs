//! Route pattern extraction utilities.

use actix_web::HttpRequest;

/// Label used for requests that matched no registered route
pub const UNMATCHED_ROUTE: &str = "unmatched";

/// Route pattern for metrics labels
///
/// Uses the matched resource pattern so arbitrary paths cannot grow label
/// cardinality. Only meaningful once routing has happened.
pub fn extract_route_pattern(req: &HttpRequest) -> String {
    req.match_pattern()
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_string())
}
