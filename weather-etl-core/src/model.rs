use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fmt, path::PathBuf, str::FromStr};

use crate::error::EtlError;

pub const DEFAULT_CITY: &str = "London";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_OUTPUT_FILE: &str = "raw_weather_data.json";
pub const UNKNOWN_CITY: &str = "Unknown";

/// Second-precision UTC format used for stored timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    Standard,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Standard => "standard",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Metric, Units::Imperial, Units::Standard]
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Units {
    type Err = EtlError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            "standard" => Ok(Units::Standard),
            _ => Err(EtlError::Configuration(format!(
                "Unknown units '{value}'. Supported units: metric, imperial, standard."
            ))),
        }
    }
}

/// Parameters of one forecast fetch.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub city: String,
    pub units: Units,
    pub language: String,
    /// Caps the number of returned timestamps; interpreted by the provider.
    pub count: Option<u32>,
    pub output_path: PathBuf,
}

impl Default for FetchRequest {
    fn default() -> Self {
        Self {
            city: DEFAULT_CITY.to_string(),
            units: Units::default(),
            language: DEFAULT_LANGUAGE.to_string(),
            count: None,
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
        }
    }
}

impl FetchRequest {
    pub fn for_city(city: impl Into<String>) -> Self {
        Self { city: city.into(), ..Self::default() }
    }
}

/// The provider's forecast payload, kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawForecastResponse(Value);

impl RawForecastResponse {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Number of entries under `list`, zero when absent.
    pub fn entry_count(&self) -> usize {
        self.0.get("list").and_then(Value::as_array).map_or(0, Vec::len)
    }
}

/// Measurement block of a forecast entry.
#[derive(Debug, Clone, Deserialize)]
pub struct MainBlock {
    pub temp: f64,
    pub humidity: f64,
    pub pressure: f64,
}

/// One timestamped entry of `list`.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastEntry {
    pub dt: u64,
    pub main: MainBlock,
}

/// Normalized output of the transformer.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub city: String,
}

pub type WeatherRecordBatch = Vec<WeatherRecord>;

/// Flat row handed to the record sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub timestamp: String,
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub city: String,
}

impl StoredRecord {
    pub fn from_record(record: &WeatherRecord, city: &str) -> Self {
        Self {
            timestamp: record.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            temperature: record.temperature,
            humidity: record.humidity,
            pressure: record.pressure,
            city: city.to_string(),
        }
    }
}

/// Outcome of one accepted batch insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertResult {
    pub table: String,
    pub inserted: usize,
}
