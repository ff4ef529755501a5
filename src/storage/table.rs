//! Table store accessor for weather records.

use crate::{models::WeatherRecord, storage::StoreError, utils::format_timestamp};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use prometheus::IntCounter;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// A stored row as a JSON object; decoding into [`WeatherRecord`] happens in the accessor.
pub type Item = Map<String, Value>;

/// Inclusive timestamp bounds, both formatted with [`format_timestamp`].
#[derive(Debug, Clone, PartialEq)]
pub struct TimeWindow {
    pub start: String,
    pub end: String,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: format_timestamp(start),
            end: format_timestamp(end),
        }
    }

    /// `start <= timestamp <= end`; items without a string timestamp never match.
    pub fn contains(&self, item: &Item) -> bool {
        item.get("timestamp")
            .and_then(Value::as_str)
            .is_some_and(|ts| ts >= self.start.as_str() && ts <= self.end.as_str())
    }
}

/// Predicate pushed down to the backend scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanFilter {
    pub city: String,
    /// `None` matches any timestamp.
    pub window: Option<TimeWindow>,
    /// Upper bound on items evaluated per page.
    pub page_limit: Option<usize>,
}

impl ScanFilter {
    pub fn city(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            window: None,
            page_limit: None,
        }
    }

    pub fn city_in_window(city: impl Into<String>, window: TimeWindow) -> Self {
        Self {
            window: Some(window),
            ..Self::city(city)
        }
    }

    /// `cityName == city`, plus the window when one is set, on the raw item.
    pub fn matches(&self, item: &Item) -> bool {
        item.get("cityName").and_then(Value::as_str) == Some(self.city.as_str())
            && self.window.as_ref().is_none_or(|window| window.contains(item))
    }
}

/// Key-condition query over one partition (`id`), ordered by timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyQuery {
    pub id: String,
    pub window: Option<TimeWindow>,
    /// Oldest first when true, newest first otherwise.
    pub ascending: bool,
    /// Upper bound on items returned per page.
    pub page_limit: Option<usize>,
}

impl KeyQuery {
    pub fn matches(&self, item: &Item) -> bool {
        item.get("id").and_then(Value::as_str) == Some(self.id.as_str())
            && self.window.as_ref().is_none_or(|window| window.contains(item))
    }
}

/// One page of raw items plus the key to resume from, if any.
#[derive(Debug, Default)]
pub struct ScanPage {
    pub items: Vec<Item>,
    pub next: Option<Item>,
}

/// Primitive operations a table backend must provide.
#[async_trait]
pub trait TableBackend: Send + Sync {
    /// Upsert keyed by `(id, timestamp)`.
    async fn put_item(&self, item: Item) -> Result<(), StoreError>;

    async fn get_item(&self, id: &str, timestamp: &str) -> Result<Option<Item>, StoreError>;

    /// Return one page of items. Backends may apply `filter` server-side but are not required to.
    async fn scan(&self, filter: &ScanFilter, start_key: Option<Item>)
    -> Result<ScanPage, StoreError>;

    /// Return one page of the partition named by `query`, in the requested timestamp order.
    async fn query(&self, query: &KeyQuery, start_key: Option<Item>)
    -> Result<ScanPage, StoreError>;

    /// Short backend name for logs and health output.
    fn name(&self) -> &'static str;
}

/// Which backend primitive a read drains.
#[derive(Clone, Copy)]
enum Read<'a> {
    Scan(&'a ScanFilter),
    Query(&'a KeyQuery),
}

impl Read<'_> {
    fn matches(&self, item: &Item) -> bool {
        match self {
            Read::Scan(filter) => filter.matches(item),
            Read::Query(query) => query.matches(item),
        }
    }
}

/// Decoded records from a drained read.
struct Collected {
    records: Vec<WeatherRecord>,
    skipped: usize,
    pages: usize,
}

/// Reads and writes [`WeatherRecord`]s on top of a [`TableBackend`].
#[derive(Clone)]
pub struct TableStore {
    backend: Arc<dyn TableBackend>,
    skipped_items: Option<IntCounter>,
}

impl TableStore {
    pub fn new(backend: Arc<dyn TableBackend>) -> Self {
        Self {
            backend,
            skipped_items: None,
        }
    }

    /// Count items dropped by lenient decoding on the given counter.
    pub fn with_skip_counter(mut self, counter: IntCounter) -> Self {
        self.skipped_items = Some(counter);
        self
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub async fn put(&self, record: &WeatherRecord) -> Result<(), StoreError> {
        let item = match serde_json::to_value(record) {
            Ok(Value::Object(item)) => item,
            Ok(_) => {
                return Err(StoreError::Write(
                    "record did not serialize to an object".to_string(),
                ));
            }
            Err(e) => return Err(StoreError::Write(e.to_string())),
        };

        self.backend.put_item(item).await
    }

    pub async fn get_by_key(&self, id: &str, timestamp: &str) -> Result<WeatherRecord, StoreError> {
        let item = self
            .backend
            .get_item(id, timestamp)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("weather record {id} at {timestamp}")))?;

        Ok(serde_json::from_value(Value::Object(item))?)
    }

    /// Records for `city` with `start <= timestamp <= end`, oldest first.
    ///
    /// All scan pages are drained before sorting. Items that match the window
    /// but do not decode are skipped and counted rather than failing the query.
    pub async fn query_by_city_and_window(
        &self,
        city: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<WeatherRecord>, StoreError> {
        let filter = ScanFilter::city_in_window(city, TimeWindow::new(start, end));
        let Collected {
            mut records,
            skipped,
            pages,
        } = self.collect(Read::Scan(&filter), None).await?;

        records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

        debug!(
            city = %filter.city,
            start = %start,
            end = %end,
            pages,
            returned = records.len(),
            skipped,
            "Scanned weather history"
        );

        Ok(records)
    }

    /// Records for `city` in store order, at most `limit` of them when set.
    pub async fn records_by_city(
        &self,
        city: &str,
        limit: Option<usize>,
    ) -> Result<Vec<WeatherRecord>, StoreError> {
        let filter = ScanFilter {
            page_limit: limit,
            ..ScanFilter::city(city)
        };
        let collected = self.collect(Read::Scan(&filter), limit).await?;

        debug!(
            city,
            limit,
            pages = collected.pages,
            returned = collected.records.len(),
            skipped = collected.skipped,
            "Scanned weather records by city"
        );

        Ok(collected.records)
    }

    /// Most recent records stored under `id`, newest first, at most `limit` when set.
    pub async fn recent_by_id(
        &self,
        id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<WeatherRecord>, StoreError> {
        let query = KeyQuery {
            id: id.to_string(),
            window: None,
            ascending: false,
            page_limit: limit,
        };
        let collected = self.collect(Read::Query(&query), limit).await?;

        debug!(
            id,
            limit,
            pages = collected.pages,
            returned = collected.records.len(),
            skipped = collected.skipped,
            "Queried recent weather records"
        );

        Ok(collected.records)
    }

    /// Records stored under `id` with `start <= timestamp <= end`, oldest first.
    ///
    /// Ordering comes from the key query itself; every page is drained.
    pub async fn history_by_id(
        &self,
        id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<WeatherRecord>, StoreError> {
        let query = KeyQuery {
            id: id.to_string(),
            window: Some(TimeWindow::new(start, end)),
            ascending: true,
            page_limit: None,
        };
        let collected = self.collect(Read::Query(&query), None).await?;

        debug!(
            id,
            start = %start,
            end = %end,
            pages = collected.pages,
            returned = collected.records.len(),
            skipped = collected.skipped,
            "Queried weather history by id"
        );

        Ok(collected.records)
    }

    /// Drain pages of `read`, keeping matching items that decode, until the
    /// backend runs out of pages or `limit` records are held.
    async fn collect(&self, read: Read<'_>, limit: Option<usize>) -> Result<Collected, StoreError> {
        let mut records = Vec::new();
        let mut skipped = 0usize;
        let mut pages = 0usize;
        let mut start_key = None;

        loop {
            let page = match read {
                Read::Scan(filter) => self.backend.scan(filter, start_key.take()).await?,
                Read::Query(query) => self.backend.query(query, start_key.take()).await?,
            };
            pages += 1;

            for item in page.items {
                if !read.matches(&item) {
                    continue;
                }
                match decode_record(item) {
                    Some(record) => records.push(record),
                    None => skipped += 1,
                }
            }

            let full = limit.is_some_and(|limit| records.len() >= limit);
            match page.next {
                Some(key) if !full => start_key = Some(key),
                _ => break,
            }
        }

        if let Some(limit) = limit {
            records.truncate(limit);
        }

        if skipped > 0
            && let Some(counter) = &self.skipped_items
        {
            counter.inc_by(skipped as u64);
        }

        Ok(Collected {
            records,
            skipped,
            pages,
        })
    }
}

fn decode_record(item: Item) -> Option<WeatherRecord> {
    let id = item
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or("<missing id>")
        .to_string();

    match serde_json::from_value(Value::Object(item)) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(id = %id, error = %e, "Skipping weather record that failed to decode");
            None
        }
    }
}
