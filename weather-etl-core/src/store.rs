//! Store stage: stamp records and hand them to a record sink.

use async_trait::async_trait;
use std::fmt::Debug;
use tracing::{info, instrument, warn};

use crate::{
    error::EtlError,
    model::{InsertResult, StoredRecord, WeatherRecordBatch},
    transform::{RawInput, transform},
};

pub mod supabase;

/// Capability of inserting one batch of rows into a named table.
#[async_trait]
pub trait RecordSink: Send + Sync + Debug {
    async fn insert(&self, table: &str, records: &[StoredRecord]) -> Result<InsertResult, EtlError>;
}

/// Stamp each record with `city` and its second-precision timestamp string.
pub fn prepare_records(batch: &WeatherRecordBatch, city: &str) -> Vec<StoredRecord> {
    batch.iter().map(|record| StoredRecord::from_record(record, city)).collect()
}

#[derive(Debug)]
pub struct StoreWriter<K> {
    sink: K,
    table: String,
}

impl<K: RecordSink> StoreWriter<K> {
    pub fn new(sink: K, table: impl Into<String>) -> Self {
        Self { sink, table: table.into() }
    }

    /// Transform raw input and insert the whole batch in one call.
    #[instrument(skip(self, input), fields(table = %self.table))]
    pub async fn transform_and_store<'a>(
        &self,
        input: impl Into<RawInput<'a>>,
        city: &str,
    ) -> Result<InsertResult, EtlError> {
        let batch = transform(input)?;
        let records = prepare_records(&batch, city);

        if records.is_empty() {
            warn!("No records to insert for city: {city}");
            return Ok(InsertResult { table: self.table.clone(), inserted: 0 });
        }

        info!(records = records.len(), "Inserting records for city: {city}");
        let result = self.sink.insert(&self.table, &records).await?;
        info!(inserted = result.inserted, "Insert accepted by {}", result.table);

        Ok(result)
    }
}
