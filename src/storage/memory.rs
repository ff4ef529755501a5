//! In-process table and blob backends for local runs and tests.

use crate::storage::{
    BlobBackend, Item, KeyQuery, ObjectSummary, PutObject, ScanFilter, ScanPage, StoreError,
    TableBackend,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

const DEFAULT_PAGE_SIZE: usize = 100;

/// Table backend holding items in insertion order, with paged scans.
pub struct MemoryTable {
    items: RwLock<Vec<Item>>,
    page_size: usize,
}

impl Default for MemoryTable {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Scans return at most `page_size` raw items per page (minimum 1).
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            items: RwLock::new(Vec::new()),
            page_size: page_size.max(1),
        }
    }

    /// Append an item as-is, without key checks. Lets callers seed rows that
    /// no longer match the record schema.
    pub async fn insert_raw(&self, item: Item) {
        self.items.write().await.push(item);
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    fn page_len(&self, limit: Option<usize>) -> usize {
        limit.map_or(self.page_size, |limit| limit.clamp(1, self.page_size))
    }
}

fn key_of(item: &Item) -> Option<(&str, &str)> {
    let id = item.get("id").and_then(Value::as_str)?;
    let timestamp = item.get("timestamp").and_then(Value::as_str)?;
    Some((id, timestamp))
}

fn resume_key(offset: usize) -> Item {
    let mut key = Item::new();
    key.insert("offset".to_string(), Value::from(offset as u64));
    key
}

fn offset_of(start_key: Option<&Item>) -> Result<usize, StoreError> {
    match start_key {
        None => Ok(0),
        Some(key) => key
            .get("offset")
            .and_then(Value::as_u64)
            .map(|offset| offset as usize)
            .ok_or_else(|| StoreError::Read("invalid scan start key".to_string())),
    }
}

#[async_trait]
impl TableBackend for MemoryTable {
    async fn put_item(&self, item: Item) -> Result<(), StoreError> {
        let (id, timestamp) = key_of(&item)
            .map(|(id, ts)| (id.to_string(), ts.to_string()))
            .ok_or_else(|| StoreError::Write("item is missing id or timestamp".to_string()))?;

        let mut items = self.items.write().await;
        let existing = items
            .iter()
            .position(|stored| key_of(stored) == Some((id.as_str(), timestamp.as_str())));

        match existing {
            Some(index) => items[index] = item,
            None => items.push(item),
        }
        Ok(())
    }

    async fn get_item(&self, id: &str, timestamp: &str) -> Result<Option<Item>, StoreError> {
        let items = self.items.read().await;
        Ok(items
            .iter()
            .find(|stored| key_of(stored) == Some((id, timestamp)))
            .cloned())
    }

    async fn scan(
        &self,
        filter: &ScanFilter,
        start_key: Option<Item>,
    ) -> Result<ScanPage, StoreError> {
        let offset = offset_of(start_key.as_ref())?;
        let items = self.items.read().await;
        let end = (offset + self.page_len(filter.page_limit)).min(items.len());

        let page = items
            .get(offset..end)
            .unwrap_or_default()
            .iter()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect();

        let next = (end < items.len()).then(|| resume_key(end));

        Ok(ScanPage { items: page, next })
    }

    async fn query(
        &self,
        query: &KeyQuery,
        start_key: Option<Item>,
    ) -> Result<ScanPage, StoreError> {
        let offset = offset_of(start_key.as_ref())?;
        let items = self.items.read().await;

        let mut partition: Vec<&Item> = items
            .iter()
            .filter(|item| key_of(item).is_some() && query.matches(item))
            .collect();
        partition.sort_by(|a, b| {
            let order = key_of(a).map(|k| k.1).cmp(&key_of(b).map(|k| k.1));
            if query.ascending { order } else { order.reverse() }
        });

        let end = (offset + self.page_len(query.page_limit)).min(partition.len());
        let page = partition
            .get(offset..end)
            .unwrap_or_default()
            .iter()
            .map(|item| (*item).clone())
            .collect();
        let next = (end < partition.len()).then(|| resume_key(end));

        Ok(ScanPage { items: page, next })
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

struct StoredObject {
    object: PutObject,
    last_modified: DateTime<Utc>,
}

/// Blob backend keeping objects in a sorted map.
#[derive(Default)]
pub struct MemoryBlob {
    objects: RwLock<BTreeMap<String, StoredObject>>,
}

impl MemoryBlob {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full object as written, including content type and metadata.
    pub async fn object(&self, key: &str) -> Option<PutObject> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|stored| stored.object.clone())
    }
}

#[async_trait]
impl BlobBackend for MemoryBlob {
    async fn put_object(&self, object: PutObject) -> Result<(), StoreError> {
        let key = object.key.clone();
        self.objects.write().await.insert(
            key,
            StoredObject {
                object,
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self
            .objects
            .read()
            .await
            .get(key)
            .map(|stored| stored.object.body.clone()))
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectSummary>, StoreError> {
        Ok(self
            .objects
            .read()
            .await
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, stored)| ObjectSummary {
                key: key.clone(),
                size: stored.object.body.len() as u64,
                last_modified: Some(stored.last_modified),
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
