//! Maps provider readings into persisted shapes.

use crate::{
    models::{ArchivalEnvelope, WeatherReading, WeatherRecord},
    utils::format_timestamp,
};
use chrono::{DateTime, Utc};

/// Records expire 30 days after collection.
pub const RECORD_TTL_SECONDS: i64 = 30 * 24 * 3600;

/// Flatten a reading into a table record. Deterministic for a given `now`.
pub fn to_record(reading: &WeatherReading, now: DateTime<Utc>) -> WeatherRecord {
    let collected_at = now.timestamp();

    WeatherRecord {
        id: format!("{}-{}", reading.name, collected_at),
        timestamp: format_timestamp(now),
        city_name: reading.name.clone(),
        temperature: reading.main.temp,
        description: reading
            .primary_description()
            .unwrap_or_default()
            .to_string(),
        humidity: reading.main.humidity,
        pressure: reading.main.pressure,
        wind_speed: reading.wind.speed,
        country: reading.sys.country.clone(),
        created_at: now,
        ttl: collected_at + RECORD_TTL_SECONDS,
    }
}

pub fn to_envelope(reading: WeatherReading, record: WeatherRecord) -> ArchivalEnvelope {
    ArchivalEnvelope {
        record,
        raw_response: reading,
    }
}
