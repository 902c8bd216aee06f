pub mod text;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::config::Selectors;
use crate::error::FetchError;
use crate::models::WeatherReading;

/// Parsed form of [`Selectors`], keeping the source strings for error reports.
pub struct CompiledSelectors {
    container: (Selector, String),
    temperature: (Selector, String),
    date: (Selector, String),
    time: (Selector, String),
}

impl CompiledSelectors {
    pub fn compile(sel: &Selectors) -> Result<Self, FetchError> {
        Ok(Self {
            container: compile_one("container", &sel.container)?,
            temperature: compile_one("temperature", &sel.temperature)?,
            date: compile_one("date", &sel.date)?,
            time: compile_one("time", &sel.time)?,
        })
    }
}

fn compile_one(field: &'static str, raw: &str) -> Result<(Selector, String), FetchError> {
    Selector::parse(raw)
        .map(|s| (s, raw.to_string()))
        .map_err(|_| FetchError::InvalidSelector {
            field,
            selector: raw.to_string(),
        })
}

/// Pull date, time and temperature out of a fetched page.
///
/// Temperature and time come from the first match inside the container; the
/// date joins every match, since the page splits it across several nodes.
pub fn extract_reading(html: &str, sel: &CompiledSelectors) -> Result<WeatherReading, FetchError> {
    let doc = Html::parse_document(html);

    let container = doc
        .select(&sel.container.0)
        .next()
        .ok_or_else(|| not_found("container", &sel.container.1))?;

    let temperature = first_text(container, "temperature", &sel.temperature)?;
    let date = joined_text(container, "date", &sel.date)?;
    let time = first_text(container, "time", &sel.time)?;

    debug!("Extracted {} {} {}", date, time, temperature);
    Ok(WeatherReading::new(date, time, temperature))
}

fn first_text(
    scope: ElementRef<'_>,
    field: &'static str,
    (selector, raw): &(Selector, String),
) -> Result<String, FetchError> {
    scope
        .select(selector)
        .next()
        .map(text::element_text)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| not_found(field, raw))
}

fn joined_text(
    scope: ElementRef<'_>,
    field: &'static str,
    (selector, raw): &(Selector, String),
) -> Result<String, FetchError> {
    let joined = scope
        .select(selector)
        .map(text::element_text)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if joined.is_empty() {
        return Err(not_found(field, raw));
    }
    Ok(joined)
}

fn not_found(field: &'static str, selector: &str) -> FetchError {
    FetchError::ElementNotFound {
        field,
        selector: selector.to_string(),
    }
}

// ── Tests ──
