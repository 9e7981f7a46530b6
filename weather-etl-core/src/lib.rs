//! Core library for the `weather-etl` pipeline.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The fetch, transform and store stages
//! - Narrow capabilities over the weather provider and the record store
//! - Shared domain models (requests, raw payloads, records)
//!
//! It is used by `weather-etl-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod fetch;
pub mod model;
pub mod provider;
pub mod store;
pub mod transform;

pub use config::{Config, OpenWeatherConfig, SupabaseConfig};
pub use error::EtlError;
pub use fetch::Fetcher;
pub use model::{
    FetchRequest, InsertResult, RawForecastResponse, StoredRecord, Units, WeatherRecord,
    WeatherRecordBatch,
};
pub use provider::{ForecastSource, openweather::OpenWeatherClient};
pub use store::{RecordSink, StoreWriter, supabase::SupabaseClient};
pub use transform::{RawInput, transform};
