use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, instrument};

use crate::{
    config::SupabaseConfig,
    error::{EtlError, truncate_body},
    model::{InsertResult, StoredRecord},
};

use super::RecordSink;

/// Batch inserts through the PostgREST interface of a Supabase project.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    url: String,
    key: String,
    http: Client,
}

impl SupabaseClient {
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Result<Self, EtlError> {
        let url = url.into();
        let key = key.into();

        if url.trim().is_empty() || key.trim().is_empty() {
            return Err(EtlError::Configuration(
                "Supabase URL and key must not be empty".to_string(),
            ));
        }

        Ok(Self { url: url.trim_end_matches('/').to_string(), key, http: Client::new() })
    }

    /// Construct from config; fails when either credential is missing.
    pub fn from_config(config: &SupabaseConfig) -> Result<Self, EtlError> {
        match (config.url.as_deref(), config.key.as_deref()) {
            (Some(url), Some(key)) => Self::new(url, key),
            _ => {
                let err = EtlError::Configuration(
                    "Supabase credentials not found.\n\
                     Hint: set SUPABASE_URL and SUPABASE_KEY or run `weather-etl configure supabase`."
                        .to_string(),
                );
                error!("{err}");
                Err(err)
            }
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url, table)
    }
}

#[async_trait]
impl RecordSink for SupabaseClient {
    #[instrument(skip(self, records), fields(records = records.len()))]
    async fn insert(&self, table: &str, records: &[StoredRecord]) -> Result<InsertResult, EtlError> {
        if records.is_empty() {
            let err = EtlError::Persistence("Refusing to insert an empty batch".to_string());
            error!("Error inserting data: {err}");
            return Err(err);
        }

        let url = self.table_url(table);
        debug!(url = %url, "Inserting records");

        let res = self
            .http
            .post(&url)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .header("Prefer", "return=minimal")
            .json(records)
            .send()
            .await
            .map_err(|e| {
                EtlError::Persistence(format!("Failed to reach Supabase: {}", e.without_url()))
            })
            .inspect_err(|e| error!("Error inserting data: {e}"))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            let err = EtlError::Persistence(format!(
                "Insert into '{table}' failed with status {status}: {}",
                truncate_body(&body)
            ));
            error!("Error inserting data: {err}");
            return Err(err);
        }

        Ok(InsertResult { table: table.to_string(), inserted: records.len() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_requires_both_credentials() {
        let cfg = SupabaseConfig { url: Some("https://x.supabase.co".into()), ..Default::default() };
        let err = SupabaseClient::from_config(&cfg).unwrap_err();

        assert!(matches!(err, EtlError::Configuration(_)));
        assert!(err.to_string().contains("Supabase credentials not found"));
    }

    #[test]
    fn empty_credentials_are_rejected() {
        assert!(SupabaseClient::new("", "key").is_err());
        assert!(SupabaseClient::new("https://x.supabase.co", " ").is_err());
    }

    #[test]
    fn table_url_points_at_rest_endpoint() {
        let client = SupabaseClient::new("https://x.supabase.co/", "key").expect("valid");
        assert_eq!(client.table_url("weather_data"), "https://x.supabase.co/rest/v1/weather_data");
    }
}
