use std::str::FromStr;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing_subscriber::EnvFilter;
use validator::Validate;

use coffee_engine::arrivals::{ArrivalGenerator, ArrivalProfile};
use coffee_engine::business_rules::ShopHours;
use coffee_engine::catalog::InMemoryCatalog;
use coffee_engine::clock::SimulatedClock;
use coffee_engine::dispatch::{CustomerQueue, LanePool, ShiftReport, ShiftScheduler, TracingSink};
use coffee_engine::{EngineError, EngineResult, ShopConfig};

/// Settings for one run of the binary, read from the environment
struct RunSettings {
    date: NaiveDate,
    seed: u64,
    /// Serve the first opening hour's arrivals as one concurrent burst.
    /// Lanes share a fixed clock, set to the last arrival of that hour.
    lanes: Option<usize>,
    profile: ArrivalProfile,
}

impl RunSettings {
    fn from_env() -> EngineResult<Self> {
        let date = match std::env::var("SHIFT_DATE") {
            Ok(raw) => NaiveDate::from_str(&raw)
                .map_err(|e| EngineError::Config(format!("SHIFT_DATE '{}': {}", raw, e)))?,
            Err(_) => Local::now().date_naive(),
        };

        let mut profile = ArrivalProfile::default();
        if let Some(per_hour) = env_number("SHIFT_CUSTOMERS_PER_HOUR")? {
            profile.customers_per_hour = per_hour;
        }
        profile.validate()?;

        Ok(Self {
            date,
            seed: env_number("SHIFT_SEED")?.unwrap_or(42),
            lanes: env_number("SHIFT_LANES")?,
            profile,
        })
    }
}

fn env_number<T: FromStr>(name: &str) -> EngineResult<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| EngineError::Config(format!("{} must be a number, got '{}'", name, raw))),
        Err(_) => Ok(None),
    }
}

async fn run() -> EngineResult<ShiftReport> {
    let config = ShopConfig::load()?;
    let settings = RunSettings::from_env()?;

    let hours = burst_hours(config.admission.hours, settings.lanes);
    let customers = ArrivalGenerator::new(settings.seed, &config).generate(settings.date, hours, &settings.profile);
    tracing::info!(
        "Generated {} customers for {} (seed {})",
        customers.len(),
        settings.date,
        settings.seed
    );
    let last_arrival = customers.last().map(|customer| customer.arrived_at);
    let queue = CustomerQueue::from_customers(customers)?;

    let opening = settings
        .date
        .and_hms_opt(config.admission.hours.open_hour, 0, 0)
        .ok_or_else(|| EngineError::Config("invalid opening hour".to_string()))?;
    let catalog = Arc::new(InMemoryCatalog::new(config.menu.clone()));

    match settings.lanes {
        Some(lanes) => {
            let served_at = last_arrival.unwrap_or(opening);
            tracing::info!("Serving {} customers at {} across {} lanes", queue.len(), served_at, lanes);
            let clock = Arc::new(SimulatedClock::at(served_at));
            LanePool::new(&config, catalog, clock, lanes).serve(queue).await
        }
        None => {
            let clock = Arc::new(SimulatedClock::at(opening));
            ShiftScheduler::new(&config, catalog, clock).run_shift(queue, &mut TracingSink)
        }
    }
}

/// Lanes serve only the opening hour; the scheduler serves the whole day
fn burst_hours(hours: ShopHours, lanes: Option<usize>) -> ShopHours {
    match lanes {
        Some(_) => ShopHours {
            open_hour: hours.open_hour,
            close_hour: hours.open_hour + 1,
        },
        None => hours,
    }
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Logs go to stderr so stdout carries only the JSON report
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Coffee shift - Starting...");

    let report = match run().await {
        Ok(report) => report,
        Err(e) => {
            e.log();
            std::process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            EngineError::from(e).log();
            std::process::exit(1);
        }
    }
}
