//! Fetch stage: one provider call, one raw file write.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::{fs, path::Path};
use tracing::{error, info, instrument};

use crate::{
    error::EtlError,
    model::{FetchRequest, RawForecastResponse},
    provider::ForecastSource,
};

#[derive(Debug)]
pub struct Fetcher<S> {
    source: S,
}

impl<S: ForecastSource> Fetcher<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Fetch a forecast and save it verbatim to `request.output_path`.
    ///
    /// The file is only written after the provider answered successfully.
    #[instrument(skip(self, request), fields(city = %request.city))]
    pub async fn fetch(&self, request: &FetchRequest) -> Result<RawForecastResponse, EtlError> {
        let raw = self.source.fetch_forecast(request).await?;

        write_raw(&request.output_path, &raw).inspect_err(|e| error!("{e}"))?;
        info!("Weather data successfully saved to {}", request.output_path.display());

        Ok(raw)
    }
}

/// Pretty-print the payload with a four-space indent, replacing any existing file.
pub fn write_raw(path: &Path, raw: &RawForecastResponse) -> Result<(), EtlError> {
    let io_err = |source| EtlError::Io { path: path.to_path_buf(), source };

    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    raw.serialize(&mut ser)
        .map_err(|e| EtlError::transform(format!("Failed to serialize forecast payload: {e}")))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, buf).map_err(io_err)
}
