/// One weather observation as rendered on the source page.
///
/// All three fields are free text (the date is not a calendar date and the
/// temperature keeps its unit symbol). `id` is assigned by storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherReading {
    pub id: Option<i64>,
    pub date: String,
    pub time: String,
    pub temperature: String,
}

impl WeatherReading {
    pub fn new(
        date: impl Into<String>,
        time: impl Into<String>,
        temperature: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            date: date.into(),
            time: time.into(),
            temperature: temperature.into(),
        }
    }

    /// Placeholder row written into an empty table so the fallback path always
    /// has something to read.
    pub fn seed() -> Self {
        Self::new("today", "now", "awesome weather")
    }
}
