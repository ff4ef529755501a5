//! DynamoDB table backend.

use crate::storage::{Item, KeyQuery, ScanFilter, ScanPage, StoreError, TableBackend};
use async_trait::async_trait;
use aws_sdk_dynamodb::{Client, error::DisplayErrorContext, types::AttributeValue};
use serde_json::{Number, Value};
use std::collections::HashMap;
use tracing::info;

const CITY_FILTER: &str = "cityName = :city";
const CITY_WINDOW_FILTER: &str = "cityName = :city AND #ts BETWEEN :start AND :end";
const ID_KEY: &str = "id = :id";
const ID_WINDOW_KEY: &str = "id = :id AND #ts BETWEEN :start AND :end";

pub struct DynamoTable {
    client: Client,
    table: String,
}

impl DynamoTable {
    pub fn new(client: Client, table: String) -> Self {
        info!(table = %table, "DynamoDB table backend initialized");
        Self { client, table }
    }

    pub fn from_sdk_config(config: &aws_config::SdkConfig, table: String) -> Self {
        Self::new(Client::new(config), table)
    }
}

#[async_trait]
impl TableBackend for DynamoTable {
    async fn put_item(&self, item: Item) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(to_attribute_map(item)))
            .send()
            .await
            .map_err(|e| StoreError::Write(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }

    async fn get_item(&self, id: &str, timestamp: &str) -> Result<Option<Item>, StoreError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key("id", AttributeValue::S(id.to_string()))
            .key("timestamp", AttributeValue::S(timestamp.to_string()))
            .send()
            .await
            .map_err(|e| StoreError::Read(DisplayErrorContext(&e).to_string()))?;

        Ok(output.item().map(from_attribute_map))
    }

    async fn scan(
        &self,
        filter: &ScanFilter,
        start_key: Option<Item>,
    ) -> Result<ScanPage, StoreError> {
        let mut request = self
            .client
            .scan()
            .table_name(&self.table)
            .expression_attribute_values(":city", AttributeValue::S(filter.city.clone()))
            .set_limit(page_limit(filter.page_limit))
            .set_exclusive_start_key(start_key.map(to_attribute_map));

        request = match &filter.window {
            Some(window) => request
                .filter_expression(CITY_WINDOW_FILTER)
                .expression_attribute_names("#ts", "timestamp")
                .expression_attribute_values(":start", AttributeValue::S(window.start.clone()))
                .expression_attribute_values(":end", AttributeValue::S(window.end.clone())),
            None => request.filter_expression(CITY_FILTER),
        };

        let output = request
            .send()
            .await
            .map_err(|e| StoreError::Read(DisplayErrorContext(&e).to_string()))?;

        Ok(ScanPage {
            items: output.items().iter().map(from_attribute_map).collect(),
            next: resume_key(output.last_evaluated_key()),
        })
    }

    async fn query(
        &self,
        query: &KeyQuery,
        start_key: Option<Item>,
    ) -> Result<ScanPage, StoreError> {
        let mut request = self
            .client
            .query()
            .table_name(&self.table)
            .expression_attribute_values(":id", AttributeValue::S(query.id.clone()))
            .scan_index_forward(query.ascending)
            .set_limit(page_limit(query.page_limit))
            .set_exclusive_start_key(start_key.map(to_attribute_map));

        request = match &query.window {
            Some(window) => request
                .key_condition_expression(ID_WINDOW_KEY)
                .expression_attribute_names("#ts", "timestamp")
                .expression_attribute_values(":start", AttributeValue::S(window.start.clone()))
                .expression_attribute_values(":end", AttributeValue::S(window.end.clone())),
            None => request.key_condition_expression(ID_KEY),
        };

        let output = request
            .send()
            .await
            .map_err(|e| StoreError::Read(DisplayErrorContext(&e).to_string()))?;

        Ok(ScanPage {
            items: output.items().iter().map(from_attribute_map).collect(),
            next: resume_key(output.last_evaluated_key()),
        })
    }

    fn name(&self) -> &'static str {
        "dynamodb"
    }
}

fn page_limit(limit: Option<usize>) -> Option<i32> {
    limit.and_then(|limit| i32::try_from(limit.max(1)).ok())
}

fn resume_key(key: Option<&HashMap<String, AttributeValue>>) -> Option<Item> {
    key.filter(|key| !key.is_empty()).map(from_attribute_map)
}

fn to_attribute_map(item: Item) -> HashMap<String, AttributeValue> {
    item.into_iter()
        .map(|(name, value)| (name, to_attribute(value)))
        .collect()
}

fn to_attribute(value: Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s),
        Value::Array(values) => AttributeValue::L(values.into_iter().map(to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(to_attribute_map(map)),
    }
}

fn from_attribute_map(map: &HashMap<String, AttributeValue>) -> Item {
    map.iter()
        .map(|(name, value)| (name.clone(), from_attribute(value)))
        .collect()
}

fn from_attribute(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => parse_number(n),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(values) => Value::Array(values.iter().map(from_attribute).collect()),
        AttributeValue::M(map) => Value::Object(from_attribute_map(map)),
        AttributeValue::Ss(values) => Value::Array(values.iter().cloned().map(Value::String).collect()),
        AttributeValue::Ns(values) => Value::Array(values.iter().map(|n| parse_number(n)).collect()),
        // binary attributes have no JSON counterpart in a weather record
        _ => Value::Null,
    }
}

/// DynamoDB numbers travel as strings and may be normalized (`25.0` comes back as `25`).
fn parse_number(raw: &str) -> Value {
    if let Ok(int) = raw.parse::<i64>() {
        return Value::from(int);
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(raw.to_string()))
}
