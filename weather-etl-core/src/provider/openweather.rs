use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

use crate::{
    config::OpenWeatherConfig,
    error::EtlError,
    model::{FetchRequest, RawForecastResponse},
};

use super::ForecastSource;

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    config: OpenWeatherConfig,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(config: OpenWeatherConfig) -> Result<Self, EtlError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(EtlError::Transport)?;

        Ok(Self { config, http })
    }

    fn forecast_url(&self) -> String {
        format!("{}/forecast", self.config.base_url.trim_end_matches('/'))
    }

    fn check_request<'a>(&'a self, request: &FetchRequest) -> Result<&'a str, EtlError> {
        let api_key = self.config.api_key().ok_or_else(|| {
            EtlError::Configuration(
                "OpenWeather API key not found.\n\
                 Hint: set OPENWEATHERMAP_API_KEY or run `weather-etl configure openweather`."
                    .to_string(),
            )
        })?;

        if request.city.trim().is_empty() {
            return Err(EtlError::Configuration("City must not be empty".to_string()));
        }
        if request.count == Some(0) {
            return Err(EtlError::Configuration(
                "Timestamp count must be a positive integer".to_string(),
            ));
        }

        Ok(api_key)
    }
}

#[async_trait]
impl ForecastSource for OpenWeatherClient {
    #[instrument(skip(self, request), fields(city = %request.city, units = %request.units))]
    async fn fetch_forecast(&self, request: &FetchRequest) -> Result<RawForecastResponse, EtlError> {
        let api_key = self.check_request(request).inspect_err(|e| error!("{e}"))?;

        let mut query = vec![
            ("q", request.city.clone()),
            ("appid", api_key.to_string()),
            ("units", request.units.as_str().to_string()),
            ("lang", request.language.clone()),
        ];
        if let Some(cnt) = request.count {
            query.push(("cnt", cnt.to_string()));
        }

        info!(
            lang = %request.language,
            cnt = ?request.count,
            "Fetching weather data for city: {}",
            request.city
        );

        let url = self.forecast_url();
        debug!(url = %url, "Sending forecast request");

        let res = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| EtlError::Transport(e.without_url()))
            .inspect_err(|e| error!("Request error occurred: {e}"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| EtlError::Transport(e.without_url()))
            .inspect_err(|e| error!("Failed to read forecast response body: {e}"))?;

        if !status.is_success() {
            let err = EtlError::RemoteService { status: status.as_u16(), body };
            error!("HTTP error occurred: {err}");
            return Err(err);
        }

        let payload: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| EtlError::transform(format!("Forecast response is not valid JSON: {e}")))
            .inspect_err(|e| error!("{e}"))?;

        let raw = RawForecastResponse::new(payload);
        info!("Received response: {} records fetched.", raw.entry_count());

        Ok(raw)
    }
}
