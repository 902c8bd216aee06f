use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{error, info};

use crate::error::StorageError;
use crate::models::WeatherReading;

type Result<T> = std::result::Result<T, StorageError>;

/// SQLite-backed store for readings. Holds only the file path; every
/// operation opens its own connection and drops it before returning.
#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Ok(conn)
    }

    /// Create the database file, the table and the seed row if missing.
    /// Returns `true` when the seed row was written by this call.
    pub fn initialize(&self) -> Result<bool> {
        self.create_database().inspect_err(|e| {
            error!("Database wasn't created at {}: {}", self.path.display(), e);
        })?;
        self.create_table().inspect_err(|e| {
            error!("Table wasn't created: {}", e);
        })?;
        let seeded = self.seed_table().inspect_err(|e| {
            error!("Table wasn't initialized: {}", e);
        })?;
        info!("The table was initialized (seeded: {})", seeded);
        Ok(seeded)
    }

    fn create_database(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let _conn = self.connect()?;
        info!("The database is ready at {}", self.path.display());
        Ok(())
    }

    fn create_table(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS weather_table (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                date        VARCHAR(20) NOT NULL CHECK (date <> '' AND length(date) <= 20),
                time        VARCHAR(10) NOT NULL CHECK (time <> '' AND length(time) <= 10),
                temperature VARCHAR(20) NOT NULL CHECK (temperature <> '' AND length(temperature) <= 20)
            );
            ",
        )?;
        info!("The table was created in database");
        Ok(())
    }

    fn seed_table(&self) -> Result<bool> {
        let conn = self.connect()?;
        let seed = WeatherReading::seed();
        let inserted = conn.execute(
            "INSERT INTO weather_table (date, time, temperature)
             SELECT ?1, ?2, ?3
             WHERE NOT EXISTS (SELECT 1 FROM weather_table)",
            params![seed.date, seed.time, seed.temperature],
        )?;
        Ok(inserted > 0)
    }

    /// Append a reading and return the id storage assigned to it.
    pub fn insert(&self, reading: &WeatherReading) -> Result<i64> {
        let conn = self.connect().inspect_err(|e| {
            error!("Connection failed, can't insert data into DB: {}", e);
        })?;
        info!("Got connection to DB for insert data");
        conn.execute(
            "INSERT INTO weather_table (date, time, temperature) VALUES (?1, ?2, ?3)",
            params![reading.date, reading.time, reading.temperature],
        )
        .inspect_err(|e| error!("Insert rejected: {}", e))?;
        let id = conn.last_insert_rowid();
        info!(
            "Transferred data to DB: {} {} {} (id {})",
            reading.date, reading.time, reading.temperature, id
        );
        Ok(id)
    }

    /// Most recently inserted reading (highest id).
    pub fn read_latest(&self) -> Result<WeatherReading> {
        let conn = self.connect().inspect_err(|e| {
            error!("Connection failed, can't read data from DB: {}", e);
        })?;
        info!("Got connection to DB for getting data");
        let row = conn
            .query_row(
                "SELECT id, date, time, temperature FROM weather_table ORDER BY id DESC LIMIT 1",
                [],
                |row| {
                    Ok(WeatherReading {
                        id: Some(row.get(0)?),
                        date: row.get(1)?,
                        time: row.get(2)?,
                        temperature: row.get(3)?,
                    })
                },
            )
            .optional()?;
        let reading = row.ok_or(StorageError::Empty)?;
        info!(
            "Read weather info from DB: {} {} {}",
            reading.date, reading.time, reading.temperature
        );
        Ok(reading)
    }

    #[cfg(test)]
    fn count(&self) -> Result<i64> {
        let conn = self.connect()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM weather_table", [], |row| row.get(0))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_storage() -> (tempfile::TempDir, Storage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().join("nested/weather.sqlite"));
        (dir, storage)
    }

    #[test]
    fn initialize_seeds_empty_table() {
        let (_dir, s) = temp_storage();
        assert!(s.initialize().unwrap());
        let latest = s.read_latest().unwrap();
        assert_eq!(latest.date, "today");
        assert_eq!(latest.time, "now");
        assert_eq!(latest.temperature, "awesome weather");
        assert_eq!(latest.id, Some(1));
    }

    #[test]
    fn initialize_is_idempotent() {
        let (_dir, s) = temp_storage();
        assert!(s.initialize().unwrap());
        assert!(!s.initialize().unwrap());
        assert_eq!(s.count().unwrap(), 1);
    }

    #[test]
    fn initialize_does_not_seed_populated_table() {
        let (_dir, s) = temp_storage();
        s.initialize().unwrap();
        s.insert(&WeatherReading::new("Wed, 14 Oct", "12:30", "+7 °C")).unwrap();
        assert!(!s.initialize().unwrap());
        assert_eq!(s.count().unwrap(), 2);
    }

    #[test]
    fn read_latest_returns_highest_id() {
        let (_dir, s) = temp_storage();
        s.initialize().unwrap();
        let mut last = 0;
        for i in 0..5 {
            let r = WeatherReading::new(format!("day {}", i), format!("{}:00", i), format!("+{}", i));
            last = s.insert(&r).unwrap();
            // interleaved reads must not affect ordering
            s.read_latest().unwrap();
        }
        let latest = s.read_latest().unwrap();
        assert_eq!(latest.id, Some(last));
        assert_eq!(latest.date, "day 4");
        assert_eq!(latest.temperature, "+4");
    }

    #[test]
    fn insert_assigns_increasing_ids() {
        let (_dir, s) = temp_storage();
        s.initialize().unwrap();
        let a = s.insert(&WeatherReading::new("a", "1", "x")).unwrap();
        let b = s.insert(&WeatherReading::new("b", "2", "y")).unwrap();
        assert!(b > a);
    }

    #[test]
    fn read_latest_without_table_fails() {
        let (_dir, s) = temp_storage();
        std::fs::create_dir_all(s.path().parent().unwrap()).unwrap();
        assert!(matches!(s.read_latest(), Err(StorageError::Sql(_))));
    }

    #[test]
    fn read_latest_on_empty_table_is_empty_error() {
        let (_dir, s) = temp_storage();
        s.create_database().unwrap();
        s.create_table().unwrap();
        assert!(matches!(s.read_latest(), Err(StorageError::Empty)));
    }

    #[test]
    fn empty_field_is_rejected() {
        let (_dir, s) = temp_storage();
        s.initialize().unwrap();
        let err = s.insert(&WeatherReading::new("Thu, 15 Oct", "", "+9")).unwrap_err();
        assert!(matches!(err, StorageError::Sql(_)));
        assert_eq!(s.count().unwrap(), 1);
    }

    #[test]
    fn over_long_field_is_rejected() {
        let (_dir, s) = temp_storage();
        s.initialize().unwrap();
        // time is VARCHAR(10)
        let err = s
            .insert(&WeatherReading::new("Thu, 15 Oct", "14:25:00 UTC+3", "+9"))
            .unwrap_err();
        assert!(matches!(err, StorageError::Sql(_)));
        let long_temp = "+9".repeat(11);
        assert!(s.insert(&WeatherReading::new("Thu", "14:25", long_temp)).is_err());
        assert_eq!(s.read_latest().unwrap().date, "today");
    }

    #[test]
    fn unopenable_path_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        // a directory cannot be opened as a database file
        let s = Storage::new(dir.path());
        assert!(s.insert(&WeatherReading::new("a", "b", "c")).is_err());
    }
}
