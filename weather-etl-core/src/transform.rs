//! Transform stage: raw provider JSON into normalized records.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::{fs, path::Path};
use tracing::{error, info, instrument};

use crate::{
    error::EtlError,
    model::{ForecastEntry, RawForecastResponse, UNKNOWN_CITY, WeatherRecord, WeatherRecordBatch},
};

/// Where the transformer reads raw JSON from.
#[derive(Debug, Clone, Copy)]
pub enum RawInput<'a> {
    File(&'a Path),
    Payload(&'a RawForecastResponse),
}

impl<'a> From<&'a Path> for RawInput<'a> {
    fn from(path: &'a Path) -> Self {
        RawInput::File(path)
    }
}

impl<'a> From<&'a RawForecastResponse> for RawInput<'a> {
    fn from(raw: &'a RawForecastResponse) -> Self {
        RawInput::Payload(raw)
    }
}

/// Turn every forecast entry into a record, or fail without a partial batch.
#[instrument(skip(input))]
pub fn transform<'a>(input: impl Into<RawInput<'a>>) -> Result<WeatherRecordBatch, EtlError> {
    let result = match input.into() {
        RawInput::File(path) => {
            info!("Loading raw weather data from {}", path.display());
            read_raw(path).and_then(|raw| records_from(raw.as_value()))
        }
        RawInput::Payload(raw) => records_from(raw.as_value()),
    };

    match &result {
        Ok(batch) => info!(records = batch.len(), "Successfully transformed raw weather data"),
        Err(e) => error!("Error transforming data: {e}"),
    }

    result
}

/// Read a raw forecast file written by the fetch stage.
pub fn read_raw(path: &Path) -> Result<RawForecastResponse, EtlError> {
    let text = fs::read_to_string(path).map_err(|e| {
        EtlError::transform(format!("Failed to read raw file {}: {e}", path.display()))
    })?;

    let value: Value = serde_json::from_str(&text).map_err(|e| {
        EtlError::transform(format!("Malformed JSON in {}: {e}", path.display()))
    })?;

    Ok(RawForecastResponse::new(value))
}

fn records_from(payload: &Value) -> Result<WeatherRecordBatch, EtlError> {
    let list = payload
        .get("list")
        .ok_or_else(|| EtlError::transform("missing `list` key"))?
        .as_array()
        .ok_or_else(|| EtlError::transform("`list` is not an array"))?;

    list.iter().enumerate().map(|(i, entry)| record_from(i, entry)).collect()
}

fn record_from(index: usize, entry: &Value) -> Result<WeatherRecord, EtlError> {
    let entry = ForecastEntry::deserialize(entry)
        .map_err(|e| EtlError::transform_at(index, e.to_string()))?;

    let secs = i64::try_from(entry.dt)
        .map_err(|_| EtlError::transform_at(index, format!("`dt` out of range: {}", entry.dt)))?;
    let timestamp = DateTime::<Utc>::from_timestamp(secs, 0)
        .ok_or_else(|| EtlError::transform_at(index, format!("`dt` out of range: {secs}")))?;

    Ok(WeatherRecord {
        timestamp,
        temperature: entry.main.temp,
        humidity: entry.main.humidity,
        pressure: entry.main.pressure,
        city: UNKNOWN_CITY.to_string(),
    })
}
