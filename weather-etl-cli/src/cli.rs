use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use inquire::{Password, Text};
use std::path::PathBuf;
use tracing::info;
use weather_etl_core::{
    Config, FetchRequest, Fetcher, StoreWriter, SupabaseClient, Units, dashboard,
    model::{DEFAULT_CITY, DEFAULT_LANGUAGE, DEFAULT_OUTPUT_FILE, UNKNOWN_CITY},
    provider::source_from_config,
    transform,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-etl", version, about = "Weather forecast ETL")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Service {
    Openweather,
    Supabase,
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// City name, e.g. "London" or "New York".
    #[arg(long, default_value = DEFAULT_CITY)]
    pub city: String,

    /// One of: metric, imperial, standard.
    #[arg(long, default_value = "metric")]
    pub units: Units,

    /// Language code for weather descriptions.
    #[arg(long, default_value = DEFAULT_LANGUAGE)]
    pub lang: String,

    /// Number of timestamps to fetch.
    #[arg(long)]
    pub count: Option<u32>,

    /// Where to save the raw response.
    #[arg(long, default_value = DEFAULT_OUTPUT_FILE)]
    pub output: PathBuf,
}

impl From<FetchArgs> for FetchRequest {
    fn from(args: FetchArgs) -> Self {
        Self {
            city: args.city,
            units: args.units,
            language: args.lang,
            count: args.count,
            output_path: args.output,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a service.
    Configure {
        #[arg(value_enum)]
        service: Service,
    },

    /// Fetch a forecast and save the raw response.
    Fetch(FetchArgs),

    /// Print normalized records from a raw response file.
    Transform {
        #[arg(long, default_value = DEFAULT_OUTPUT_FILE)]
        input: PathBuf,
    },

    /// Transform a raw response file and insert the records.
    Store {
        #[arg(long, default_value = DEFAULT_OUTPUT_FILE)]
        input: PathBuf,

        /// City label stamped on every record.
        #[arg(long, default_value = UNKNOWN_CITY)]
        city: String,
    },

    /// Fetch a forecast, then transform and store it.
    Run(FetchArgs),

    /// Fetch the built-in example: New York, metric, 50 timestamps.
    Example,

    /// Show the sample weather table and chart.
    Dashboard,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { service } => configure(service)?,
            Command::Fetch(args) => {
                fetch(&load_config()?, args.into()).await?;
            }
            Command::Transform { input } => {
                let batch = transform(input.as_path())?;
                for record in &batch {
                    println!(
                        "{}  temp={:<7} humidity={:<5} pressure={}",
                        record.timestamp.format("%Y-%m-%d %H:%M:%S"),
                        record.temperature,
                        record.humidity,
                        record.pressure,
                    );
                }
                println!("{} records", batch.len());
            }
            Command::Store { input, city } => {
                let writer = store_writer(&load_config()?)?;
                let result = writer.transform_and_store(input.as_path(), &city).await?;
                println!("Inserted {} records into {}", result.inserted, result.table);
            }
            Command::Run(args) => {
                let config = load_config()?;
                // Fail on missing store credentials before spending a provider call.
                let writer = store_writer(&config)?;
                let request: FetchRequest = args.into();
                let raw = fetch(&config, request.clone()).await?;
                let result = writer.transform_and_store(&raw, &request.city).await?;
                println!("Inserted {} records into {}", result.inserted, result.table);
            }
            Command::Example => {
                let request = FetchRequest {
                    count: Some(50),
                    ..FetchRequest::for_city("New York")
                };
                fetch(&load_config()?, request).await?;
            }
            Command::Dashboard => {
                print!("{}", dashboard::render(&dashboard::sample_data()));
            }
        }

        Ok(())
    }
}

fn load_config() -> anyhow::Result<Config> {
    let config = Config::load().context("Failed to load configuration")?;
    Ok(config.with_env_overrides())
}

fn store_writer(config: &Config) -> anyhow::Result<StoreWriter<SupabaseClient>> {
    let client = SupabaseClient::from_config(&config.supabase)?;
    Ok(StoreWriter::new(client, config.supabase.table()))
}

async fn fetch(
    config: &Config,
    request: FetchRequest,
) -> anyhow::Result<weather_etl_core::RawForecastResponse> {
    let fetcher = Fetcher::new(source_from_config(config)?);
    let raw = fetcher
        .fetch(&request)
        .await
        .with_context(|| format!("Failed to fetch forecast for {}", request.city))?;

    println!(
        "Saved {} forecast entries for {} to {}",
        raw.entry_count(),
        request.city,
        request.output_path.display()
    );
    Ok(raw)
}

fn configure(service: Service) -> anyhow::Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;

    match service {
        Service::Openweather => {
            let key = Password::new("OpenWeatherMap API key:")
                .without_confirmation()
                .prompt()
                .context("Failed to read API key")?;
            config.set_openweather_api_key(key.trim().to_string());
        }
        Service::Supabase => {
            let url = Text::new("Supabase project URL:")
                .prompt()
                .context("Failed to read Supabase URL")?;
            let key = Password::new("Supabase key:")
                .without_confirmation()
                .prompt()
                .context("Failed to read Supabase key")?;
            config.set_supabase_credentials(url.trim().to_string(), key.trim().to_string());
        }
    }

    let path = config.save().context("Failed to save configuration")?;
    info!(path = %path.display(), "Configuration saved");
    println!("Saved configuration to {}", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_defaults_match_core_defaults() {
        let cli = Cli::try_parse_from(["weather-etl", "fetch"]).expect("valid args");
        let Command::Fetch(args) = cli.command else {
            panic!("expected fetch command");
        };

        let request: FetchRequest = args.into();
        assert_eq!(request.city, DEFAULT_CITY);
        assert_eq!(request.units, Units::Metric);
        assert_eq!(request.language, DEFAULT_LANGUAGE);
        assert_eq!(request.count, None);
        assert_eq!(request.output_path, PathBuf::from(DEFAULT_OUTPUT_FILE));
    }

    #[test]
    fn units_parse_through_core_type() {
        let cli = Cli::try_parse_from(["weather-etl", "run", "--units", "imperial", "--count", "8"])
            .expect("valid args");
        let Command::Run(args) = cli.command else {
            panic!("expected run command");
        };

        assert_eq!(args.units, Units::Imperial);
        assert_eq!(args.count, Some(8));
    }

    #[test]
    fn unknown_units_are_rejected() {
        let err = Cli::try_parse_from(["weather-etl", "fetch", "--units", "kelvin"]).unwrap_err();
        assert!(err.to_string().contains("Unknown units"));
    }

    #[test]
    fn store_city_defaults_to_unknown() {
        let cli = Cli::try_parse_from(["weather-etl", "store"]).expect("valid args");
        let Command::Store { city, input } = cli.command else {
            panic!("expected store command");
        };

        assert_eq!(city, UNKNOWN_CITY);
        assert_eq!(input, PathBuf::from(DEFAULT_OUTPUT_FILE));
    }
}
