//! Provider response shapes for the current-weather endpoint.
//!
//! Every section defaults when the provider omits it, so only malformed JSON
//! or wrongly typed values fail to decode.

use serde::{Deserialize, Serialize};

/// Current weather as returned by the provider, kept verbatim for archival.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherReading {
    pub name: String,
    pub coord: Coordinates,
    pub main: MainReadings,
    pub weather: Vec<Condition>,
    pub wind: Wind,
    pub clouds: Clouds,
    pub sys: SystemInfo,
    /// Observation time, unix seconds.
    pub dt: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coordinates {
    pub lon: f64,
    pub lat: f64,
}

/// Temperatures in Celsius (the client always asks for metric units).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MainReadings {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    /// hPa
    pub pressure: i64,
    /// percent
    pub humidity: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Condition {
    pub id: i64,
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Wind {
    pub speed: f64,
    pub deg: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Clouds {
    pub all: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemInfo {
    pub country: String,
    pub sunrise: i64,
    pub sunset: i64,
}

impl WeatherReading {
    /// Description of the first reported condition, if any.
    pub fn primary_description(&self) -> Option<&str> {
        self.weather.first().map(|c| c.description.as_str())
    }
}
