use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

const DEFAULT_URL: &str = "https://www.gismeteo.by/weather-minsk-4248/";
const DEFAULT_DB_PATH: &str = "data/weather.sqlite";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Runtime settings. Every field is optional in the JSON file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub db_path: PathBuf,
    pub selectors: Selectors,
}

/// CSS selectors locating the reading on the page. `temperature`, `date` and
/// `time` are evaluated inside the first `container` match.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub container: String,
    pub temperature: String,
    pub date: String,
    pub time: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            selectors: Selectors::default(),
        }
    }
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            container: r#"div[class="tabs _center"]"#.to_string(),
            temperature: r#"div[class="tab-weather"] span[class="unit unit_temperature_c"]"#
                .to_string(),
            date: r#"div[class="tab  tooltip"] div[class="tab-content"] div[class="date"]"#
                .to_string(),
            time: r#"div[id="time"]"#.to_string(),
        }
    }
}

impl Config {
    /// Load from an optional JSON file, then apply `WEATHER_URL` /
    /// `WEATHER_DB_PATH` overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        Ok(config.with_overrides(|key| env::var(key).ok()))
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("WEATHER_URL") {
            self.url = url;
        }
        if let Some(db) = lookup("WEATHER_DB_PATH") {
            self.db_path = PathBuf::from(db);
        }
        self
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        let c = Config::from_json("{}").unwrap();
        assert_eq!(c.url, DEFAULT_URL);
        assert_eq!(c.timeout(), Duration::from_secs(10));
        assert_eq!(c.db_path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(c.selectors.time, r#"div[id="time"]"#);
    }

    #[test]
    fn partial_selectors_keep_other_defaults() {
        let c = Config::from_json(r#"{"timeout_secs": 3, "selectors": {"time": "span.clock"}}"#)
            .unwrap();
        assert_eq!(c.timeout_secs, 3);
        assert_eq!(c.selectors.time, "span.clock");
        assert_eq!(c.selectors.container, Selectors::default().container);
    }

    #[test]
    fn env_overrides_win_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"url": "https://example.com/", "db_path": "file.sqlite"}"#)
            .unwrap();
        let c = Config::from_file(&path).unwrap().with_overrides(|key| match key {
            "WEATHER_URL" => Some("http://127.0.0.1:18765/gismeteo.html".to_string()),
            "WEATHER_DB_PATH" => Some("/tmp/weather.sqlite".to_string()),
            _ => None,
        });
        assert_eq!(c.url, "http://127.0.0.1:18765/gismeteo.html");
        assert_eq!(c.db_path, PathBuf::from("/tmp/weather.sqlite"));
    }

    #[test]
    fn unset_overrides_keep_file_values() {
        let c = Config::from_json(r#"{"db_path": "file.sqlite"}"#)
            .unwrap()
            .with_overrides(|_| None);
        assert_eq!(c.url, DEFAULT_URL);
        assert_eq!(c.db_path, PathBuf::from("file.sqlite"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Config::from_file(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn bad_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
