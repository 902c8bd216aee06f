use std::fmt;
use std::future::Future;

use tracing::{error, info, warn};

use crate::db::Storage;
use crate::error::{FetchError, PipelineError, StorageError};
use crate::models::WeatherReading;

const GREETING: &str = "Welcome to the weather forecast!";
const LIVE_FOOTER: &str = "Have a nice day!";
const FALLBACK_FOOTER: &str = "That was the last weather forecast update from database.";

/// Where live readings come from.
pub trait ReadingSource {
    fn fetch_reading(&self) -> impl Future<Output = Result<WeatherReading, FetchError>>;
}

/// Append-only reading storage with a "most recent" query.
pub trait ReadingStore {
    /// Create whatever the store needs; `true` if the seed row was written.
    fn initialize(&self) -> Result<bool, StorageError>;
    fn insert(&self, reading: &WeatherReading) -> Result<i64, StorageError>;
    fn read_latest(&self) -> Result<WeatherReading, StorageError>;
}

impl ReadingStore for Storage {
    fn initialize(&self) -> Result<bool, StorageError> {
        Storage::initialize(self)
    }

    fn insert(&self, reading: &WeatherReading) -> Result<i64, StorageError> {
        Storage::insert(self, reading)
    }

    fn read_latest(&self) -> Result<WeatherReading, StorageError> {
        Storage::read_latest(self)
    }
}

/// Whether a live reading made it into storage.
#[derive(Debug)]
pub enum Persisted {
    Stored(i64),
    Failed(StorageError),
}

/// Result of one invocation.
#[derive(Debug)]
pub enum Report {
    /// Fetched from the page just now.
    Live {
        reading: WeatherReading,
        persisted: Persisted,
    },
    /// Page unreachable; latest stored reading instead.
    Fallback {
        reading: WeatherReading,
        cause: FetchError,
    },
}

impl Report {
    /// Report text for a reading read back from storage.
    pub fn stored_text(reading: &WeatherReading) -> String {
        format!("{}\n{}", body(reading), FALLBACK_FOOTER)
    }
}

fn body(r: &WeatherReading) -> String {
    format!(
        "{}\nToday is: {}\nTime now: {}\nTemperature: {}",
        GREETING, r.date, r.time, r.temperature
    )
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Live { reading, .. } => write!(f, "{}\n{}", body(reading), LIVE_FOOTER),
            Report::Fallback { reading, .. } => f.write_str(&Report::stored_text(reading)),
        }
    }
}

/// Set up storage, then [`run`]. A setup failure is logged and the fetch
/// still happens: the insert then reports `Persisted::Failed`, and the fallback
/// read fails with `PipelineError::Storage`.
pub async fn run_with_setup<S, R>(source: &S, store: &R) -> Result<Report, PipelineError>
where
    S: ReadingSource,
    R: ReadingStore,
{
    if let Err(e) = store.initialize() {
        error!("Storage setup failed, continuing with live fetch: {}", e);
    }
    run(source, store).await
}

/// Fetch one reading and store it, or fall back to the latest stored reading
/// when the source is unreachable. Other fetch errors are returned as-is.
pub async fn run<S, R>(source: &S, store: &R) -> Result<Report, PipelineError>
where
    S: ReadingSource,
    R: ReadingStore,
{
    match source.fetch_reading().await {
        Ok(reading) => {
            let persisted = match store.insert(&reading) {
                Ok(id) => {
                    info!("The weather info was added to the DB (id {})", id);
                    Persisted::Stored(id)
                }
                Err(e) => {
                    error!("Can't insert data into DB, continuing: {}", e);
                    Persisted::Failed(e)
                }
            };
            info!(
                "Printed data: {} {} {}",
                reading.date, reading.time, reading.temperature
            );
            Ok(Report::Live { reading, persisted })
        }
        Err(cause @ FetchError::UnreachableSource(_)) => {
            warn!("Source unreachable, falling back to DB: {}", cause);
            let reading = store
                .read_latest()
                .inspect_err(|e| error!("Can't print data from DB: {}", e))?;
            info!("The weather was printed from DB");
            Ok(Report::Fallback { reading, cause })
        }
        Err(e) => {
            error!("Fetching weather failed: {}", e);
            Err(e.into())
        }
    }
}
