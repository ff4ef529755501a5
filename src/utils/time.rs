//! Timestamp formatting shared by records, queries and responses.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format as RFC 3339 with second precision and a `Z` suffix.
///
/// Every stored and compared timestamp goes through here; the fixed width keeps
/// lexicographic order identical to chronological order.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
