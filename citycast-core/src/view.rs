//! The single display state and its rendering.
//!
//! Every string shown to the user is derived from the current snapshot on
//! each call to [`ViewState::render`]; nothing is cached between renders.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::fmt;

use crate::{
    classify::{IconKey, Theme, classify},
    model::{CityQuery, Units, WeatherSnapshot},
    wind::degrees_to_cardinal,
};

/// Shown in place of any value that is not available.
pub const PLACEHOLDER: &str = "-";
pub const NOT_FOUND_HEADING: &str = "City not found";
pub const INPUT_HINT: &str = "Please provide a city with attention to spelling";

/// Result of one lookup, as far as the view is concerned.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found(WeatherSnapshot),
    NotFound(CityQuery),
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    snapshot: Option<WeatherSnapshot>,
    heading: String,
    input_invalid: bool,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn heading(&self) -> &str {
        &self.heading
    }

    pub fn input_invalid(&self) -> bool {
        self.input_invalid
    }

    /// Outcomes are applied in arrival order; the last one applied wins.
    pub fn apply(&mut self, outcome: LookupOutcome) {
        match outcome {
            LookupOutcome::Found(snapshot) => {
                self.heading = snapshot.city_query.clone();
                self.snapshot = Some(snapshot);
                self.input_invalid = false;
            }
            LookupOutcome::NotFound(_) => {
                self.heading = NOT_FOUND_HEADING.to_string();
                self.snapshot = None;
                self.input_invalid = true;
            }
            LookupOutcome::Failed => {}
        }
    }

    pub fn render(&self, units: Units) -> RenderedView {
        let heading = if self.heading.is_empty() {
            PLACEHOLDER.to_string()
        } else {
            self.heading.clone()
        };

        let Some(snapshot) = &self.snapshot else {
            return RenderedView::placeholder(heading, self.input_invalid);
        };

        let classification = classify(snapshot);
        let offset = snapshot.timezone_offset_secs;

        RenderedView {
            heading,
            input_invalid: self.input_invalid,
            theme: Some(classification.theme()),
            icon: classification.icon,
            temperature: format!("{}{}", floor(snapshot.temperature), units.temperature_suffix()),
            description: snapshot.description.clone(),
            humidity: format!("{}%", snapshot.humidity_pct),
            feels_like: format!("{}°", floor(snapshot.feels_like)),
            sunrise: format_local(snapshot.sunrise, offset, "%H:%M"),
            sunset: format_local(snapshot.sunset, offset, "%H:%M"),
            observed_on: format_local(snapshot.observed_at, offset, "%A, %B %-d, %Y"),
            wind: format!(
                "{} {} / {}",
                snapshot.wind_speed,
                units.speed_suffix(),
                degrees_to_cardinal(snapshot.wind_direction_deg)
            ),
            pressure: format!("{} hPa", snapshot.pressure_hpa),
        }
    }
}

/// Display-ready values for one render pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedView {
    pub heading: String,
    pub input_invalid: bool,
    pub theme: Option<Theme>,
    pub icon: IconKey,
    pub temperature: String,
    pub description: String,
    pub humidity: String,
    pub feels_like: String,
    pub sunrise: String,
    pub sunset: String,
    pub observed_on: String,
    pub wind: String,
    pub pressure: String,
}

impl RenderedView {
    fn placeholder(heading: String, input_invalid: bool) -> Self {
        Self {
            heading,
            input_invalid,
            theme: None,
            icon: IconKey::NoWeather,
            temperature: PLACEHOLDER.to_string(),
            description: String::new(),
            humidity: format!("{PLACEHOLDER}%"),
            feels_like: format!("{PLACEHOLDER}°"),
            sunrise: PLACEHOLDER.to_string(),
            sunset: PLACEHOLDER.to_string(),
            observed_on: PLACEHOLDER.to_string(),
            wind: PLACEHOLDER.to_string(),
            pressure: format!("{PLACEHOLDER} hPa"),
        }
    }
}

impl fmt::Display for RenderedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let theme = self.theme.map(|t| t.as_str()).unwrap_or(PLACEHOLDER);
        writeln!(f, "{}  {}  [{}]", self.icon.glyph(), self.heading, theme)?;
        if self.input_invalid {
            writeln!(f, "   {INPUT_HINT}")?;
        }
        writeln!(f, "   {}  {}", self.temperature, self.description)?;
        writeln!(f, "   {}", self.observed_on)?;
        writeln!(f)?;
        writeln!(f, "HUMIDITY    {}", self.humidity)?;
        writeln!(f, "FEELS LIKE  {}", self.feels_like)?;
        writeln!(f, "SUNRISE     {}", self.sunrise)?;
        writeln!(f, "SUNSET      {}", self.sunset)?;
        writeln!(f, "WIND        {}", self.wind)?;
        write!(f, "PRESSURE    {}", self.pressure)
    }
}

fn floor(value: f64) -> i64 {
    value.floor() as i64
}

fn format_local(epoch_secs: i64, offset_secs: i32, pattern: &str) -> String {
    local_time(epoch_secs, offset_secs)
        .map(|t| t.format(pattern).to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

fn local_time(epoch_secs: i64, offset_secs: i32) -> Option<DateTime<FixedOffset>> {
    let offset = FixedOffset::east_opt(offset_secs)?;
    DateTime::from_timestamp(epoch_secs, 0).map(|utc| utc.with_timezone(&offset))
}
