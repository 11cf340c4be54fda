use chrono::DateTime;
use clap::{Parser, Subcommand};

use weather_core::{ClientConfig, RpcHttpClient, Status, WeatherRpc, WeatherSnapshot};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather RPC client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch (and persist) the current weather for a city.
    Current {
        /// City name; prompts interactively when omitted.
        city: Option<String>,
    },

    /// Show persisted snapshots for a city over a time range.
    History {
        /// City name; prompts interactively when omitted.
        city: Option<String>,

        /// Start timestamp (epoch ms). Defaults to 24h before the end.
        #[arg(long)]
        from_ms: Option<i64>,

        /// End timestamp (epoch ms). Defaults to now.
        #[arg(long)]
        to_ms: Option<i64>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = ClientConfig::from_env();
        let client = RpcHttpClient::new(&config);

        match self.command {
            Command::Current { city } => {
                let city = resolve_city(city)?;
                match client.get_current_weather(&city).await {
                    Ok(snapshot) => println!("{}", format_snapshot(&snapshot)),
                    Err(status) => print_rpc_error(&status),
                }
            }
            Command::History { city, from_ms, to_ms } => {
                let city = resolve_city(city)?;
                let to_ms = to_ms.unwrap_or_else(|| chrono::Utc::now().timestamp_millis());
                let from_ms = from_ms.unwrap_or(to_ms - DAY_MS);

                match client.get_weather_history(&city, from_ms, to_ms).await {
                    Ok(series) if series.is_empty() => {
                        println!("No snapshots for {city} in the requested range.");
                    }
                    Ok(series) => {
                        for point in &series {
                            println!("{}", format_point(point));
                        }
                    }
                    Err(status) => print_rpc_error(&status),
                }
            }
        }

        Ok(())
    }
}

fn resolve_city(city: Option<String>) -> anyhow::Result<String> {
    match city {
        Some(city) => Ok(city),
        None => Ok(inquire::Text::new("Enter city name:").prompt()?),
    }
}

fn print_rpc_error(status: &Status) {
    eprintln!("RPC Error: {} - {}", status.code, status.message);
}

fn format_snapshot(s: &WeatherSnapshot) -> String {
    format!(
        "\nWeather in {}:\n\
         Temperature: {:.1} celsius\n\
         Humidity: {}%\n\
         Conditions: {}\n\
         Wind Speed: {} m/s",
        s.city, s.temperature_c, s.humidity, s.description, s.wind_speed
    )
}

fn format_point(s: &WeatherSnapshot) -> String {
    let when = DateTime::from_timestamp_millis(s.timestamp_ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| format!("{} ms", s.timestamp_ms));
    format!(
        "{when}  {:>6.1} C  {:>3}%  {:>5.1} m/s  {}",
        s.temperature_c, s.humidity, s.wind_speed, s.description
    )
}
