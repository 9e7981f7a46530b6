use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    Config, EtlError,
    model::{FetchRequest, RawForecastResponse},
    provider::openweather::OpenWeatherClient,
};

pub mod openweather;

/// Capability of returning one raw forecast payload for a request.
#[async_trait]
pub trait ForecastSource: Send + Sync + Debug {
    async fn fetch_forecast(&self, request: &FetchRequest) -> Result<RawForecastResponse, EtlError>;
}

/// Construct the OpenWeather source from config.
pub fn source_from_config(config: &Config) -> Result<OpenWeatherClient, EtlError> {
    OpenWeatherClient::new(config.openweather.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_from_config_accepts_missing_key() {
        // The key is checked per fetch, before any request is sent.
        let cfg = Config::default();
        assert!(source_from_config(&cfg).is_ok());
    }
}
