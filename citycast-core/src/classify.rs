//! Day/night detection and condition-to-icon mapping.

use serde::Serialize;

use crate::model::WeatherSnapshot;

/// Visual theme of the rendered view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Day,
    Night,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Day => "day",
            Theme::Night => "night",
        }
    }
}

/// Icon shown next to the heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IconKey {
    ClearDay,
    ClearNight,
    Clouds,
    Rain,
    Drizzle,
    Snow,
    Thunderstorm,
    Mist,
    NoWeather,
}

impl IconKey {
    /// Image asset used by the web front-end.
    pub fn asset_name(&self) -> &'static str {
        match self {
            IconKey::ClearDay => "clear.png",
            IconKey::ClearNight => "clear-night.png",
            IconKey::Clouds => "cloudy.png",
            IconKey::Rain => "rainy.png",
            IconKey::Drizzle => "drizzle.png",
            IconKey::Snow => "snow.png",
            IconKey::Thunderstorm => "thunderstorm.png",
            IconKey::Mist => "mist.png",
            IconKey::NoWeather => "noWeather.png",
        }
    }

    /// Glyph used by the terminal renderer.
    pub fn glyph(&self) -> &'static str {
        match self {
            IconKey::ClearDay => "☀",
            IconKey::ClearNight => "☾",
            IconKey::Clouds => "☁",
            IconKey::Rain => "☂",
            IconKey::Drizzle => "⛆",
            IconKey::Snow => "❄",
            IconKey::Thunderstorm => "⚡",
            IconKey::Mist => "≋",
            IconKey::NoWeather => "?",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub is_night: bool,
    pub icon: IconKey,
}

impl Classification {
    pub fn theme(&self) -> Theme {
        if self.is_night { Theme::Night } else { Theme::Day }
    }
}

pub fn classify(snapshot: &WeatherSnapshot) -> Classification {
    let is_night = is_night(snapshot.observed_at, snapshot.sunrise, snapshot.sunset);
    Classification {
        is_night,
        icon: icon_for(&snapshot.condition_keyword, is_night),
    }
}

/// Night is anything outside `[sunrise, sunset]`; both ends count as day.
/// All three arguments must be in the same reference (UTC epoch seconds).
pub fn is_night(observed_at: i64, sunrise: i64, sunset: i64) -> bool {
    !(sunrise <= observed_at && observed_at <= sunset)
}

pub fn icon_for(condition_keyword: &str, is_night: bool) -> IconKey {
    match condition_keyword.trim().to_lowercase().as_str() {
        "clear" if is_night => IconKey::ClearNight,
        "clear" => IconKey::ClearDay,
        "clouds" => IconKey::Clouds,
        "rain" => IconKey::Rain,
        "drizzle" => IconKey::Drizzle,
        "snow" => IconKey::Snow,
        "thunderstorm" => IconKey::Thunderstorm,
        "mist" => IconKey::Mist,
        _ => IconKey::NoWeather,
    }
}
