//! History query validation and execution.

use crate::{
    models::{HistoryParams, HistoryResponse},
    storage::{StoreError, TableStore},
    utils::format_timestamp,
};
use chrono::{DateTime, TimeDelta, Utc};
use std::{fmt, str::FromStr};
use tracing::{error, info};

pub const DEFAULT_PERIOD: &str = "6h";
pub const MAX_PERIOD_HOURS: u32 = 168;
pub const MAX_CITY_LENGTH: usize = 50;

/// Rejections produced by the history endpoint
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("API key required")]
    MissingApiKey,

    #[error("Invalid period parameter")]
    InvalidPeriod(String),

    #[error("Failed to retrieve weather history")]
    StoreUnavailable(#[source] StoreError),
}

/// A validated look-back window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    token: String,
    hours: u32,
}

impl Period {
    /// The token as supplied by the caller
    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub fn hours(&self) -> u32 {
        self.hours
    }

    pub fn duration(&self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.hours))
    }
}

impl Default for Period {
    fn default() -> Self {
        Self {
            token: DEFAULT_PERIOD.to_string(),
            hours: 6,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token)
    }
}

impl FromStr for Period {
    type Err = HistoryError;

    /// Accepts `6h`, `24h`, `1d`, or a bare hour count 1..=168 without sign or leading zeros.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hours = match s {
            "6h" => Some(6),
            "24h" | "1d" => Some(24),
            _ if s.starts_with(|c: char| matches!(c, '1'..='9'))
                && s.len() <= 3
                && s.bytes().all(|b| b.is_ascii_digit()) =>
            {
                s.parse::<u32>()
                    .ok()
                    .filter(|hours| *hours <= MAX_PERIOD_HOURS)
            }
            _ => None,
        };

        hours
            .map(|hours| Self {
                token: s.to_string(),
                hours,
            })
            .ok_or_else(|| HistoryError::InvalidPeriod(s.to_string()))
    }
}

/// Trim, drop everything but ASCII letters, whitespace and `-`, then cap at 50 chars.
pub fn sanitize_city(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || c.is_ascii_whitespace() || *c == '-')
        .take(MAX_CITY_LENGTH)
        .collect()
}

/// A fully resolved history request
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryQuery {
    pub period: Period,
    pub city: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl HistoryQuery {
    /// Apply defaults and validation to raw query parameters. Empty values count as absent.
    pub fn resolve(
        params: &HistoryParams,
        default_city: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, HistoryError> {
        let period = match params.period.as_deref().filter(|p| !p.is_empty()) {
            Some(raw) => raw.parse()?,
            None => Period::default(),
        };

        let city = sanitize_city(
            params
                .city
                .as_deref()
                .filter(|c| !c.is_empty())
                .unwrap_or(default_city),
        );

        Ok(Self {
            start: now - period.duration(),
            end: now,
            period,
            city,
        })
    }
}

/// Serves history queries against the table store
#[derive(Clone)]
pub struct HistoryService {
    table: TableStore,
    default_city: String,
    require_api_key: bool,
}

impl HistoryService {
    pub fn new(table: TableStore, default_city: impl Into<String>, require_api_key: bool) -> Self {
        Self {
            table,
            default_city: default_city.into(),
            require_api_key,
        }
    }

    pub fn requires_api_key(&self) -> bool {
        self.require_api_key
    }

    pub fn default_city(&self) -> &str {
        &self.default_city
    }

    pub fn storage_backend(&self) -> &'static str {
        self.table.backend_name()
    }

    /// Validate parameters and return matching records, oldest first.
    pub async fn query(
        &self,
        params: &HistoryParams,
        now: DateTime<Utc>,
    ) -> Result<HistoryResponse, HistoryError> {
        let query = HistoryQuery::resolve(params, &self.default_city, now)?;

        let records = self
            .table
            .query_by_city_and_window(&query.city, query.start, query.end)
            .await
            .map_err(|e| {
                error!(city = %query.city, period = %query.period, error = %e, "History query failed");
                HistoryError::StoreUnavailable(e)
            })?;

        info!(
            city = %query.city,
            period = %query.period,
            count = records.len(),
            "Weather history retrieved"
        );

        Ok(HistoryResponse {
            status_code: 200,
            message: "Weather history retrieved successfully".to_string(),
            count: records.len(),
            data: records,
            period: query.period.to_string(),
            start_time: format_timestamp(query.start),
            end_time: format_timestamp(query.end),
        })
    }
}
