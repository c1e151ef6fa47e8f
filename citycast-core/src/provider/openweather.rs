use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::model::{CityQuery, Units, WeatherSnapshot};

use super::{FetchError, WeatherProvider};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
const CURRENT_WEATHER_PATH: &str = "/data/2.5/weather";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    units: Units,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, units: Units) -> Self {
        Self {
            api_key,
            units,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn units(&self) -> Units {
        self.units
    }

    fn current_weather_url(&self) -> String {
        format!("{}{}", self.base_url, CURRENT_WEATHER_PATH)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip_all, fields(city = %city))]
    async fn fetch(&self, city: &CityQuery) -> Result<WeatherSnapshot, FetchError> {
        debug!(units = %self.units, "requesting current weather from OpenWeather");

        let res = self
            .http
            .get(self.current_weather_url())
            .query(&[
                ("q", city.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", self.units.as_str()),
            ])
            .send()
            .await?;

        let status = res.status().as_u16();
        let body = res.text().await?;
        debug!(status, bytes = body.len(), "received OpenWeather response");

        parse_current(city, status, &body)
    }
}

/// `cod` is a number on success and a string on errors.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OwCode {
    Number(u16),
    Text(String),
}

impl OwCode {
    fn as_u16(&self) -> Option<u16> {
        match self {
            OwCode::Number(n) => Some(*n),
            OwCode::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwEnvelope {
    #[serde(default)]
    cod: Option<OwCode>,
    #[serde(default)]
    message: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    #[serde(default)]
    deg: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    dt: i64,
    #[serde(default)]
    timezone: i32,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
    sys: OwSys,
}

fn parse_current(city: &CityQuery, status: u16, body: &str) -> Result<WeatherSnapshot, FetchError> {
    let envelope = serde_json::from_str::<OwEnvelope>(body).ok();
    let cod = envelope
        .as_ref()
        .and_then(|e| e.cod.as_ref())
        .and_then(OwCode::as_u16);

    // A 200 transport status can still carry an error code in the body.
    let effective = match cod {
        Some(code) if is_success(status) => code,
        _ => status,
    };

    if effective == 404 || cod == Some(404) {
        return Err(FetchError::NotFound { city: city.to_string() });
    }

    if !is_success(effective) {
        let message = envelope
            .and_then(|e| e.message)
            .and_then(|m| m.as_str().map(str::to_string))
            .unwrap_or_else(|| truncate_body(body));
        return Err(FetchError::Provider { status: effective, message });
    }

    let parsed: OwCurrentResponse = serde_json::from_str(body)?;
    let (condition_keyword, description) = parsed
        .weather
        .into_iter()
        .next()
        .map(|w| (w.main, w.description))
        .unwrap_or_default();

    Ok(WeatherSnapshot {
        city_query: city.to_string(),
        observed_at: parsed.dt,
        sunrise: parsed.sys.sunrise,
        sunset: parsed.sys.sunset,
        timezone_offset_secs: parsed.timezone,
        temperature: parsed.main.temp,
        feels_like: parsed.main.feels_like,
        humidity_pct: parsed.main.humidity,
        pressure_hpa: parsed.main.pressure,
        wind_speed: parsed.wind.speed,
        wind_direction_deg: parsed.wind.deg,
        condition_keyword,
        description,
    })
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city() -> CityQuery {
        CityQuery::parse("London").expect("non-blank")
    }

    const LONDON: &str = r#"{
        "coord": {"lon": -0.1257, "lat": 51.5085},
        "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}],
        "main": {"temp": 14.62, "feels_like": 13.9, "temp_min": 13.0, "temp_max": 15.5,
                 "pressure": 1021, "humidity": 72},
        "wind": {"speed": 4.12, "deg": 250},
        "dt": 1697724000,
        "sys": {"country": "GB", "sunrise": 1697697180, "sunset": 1697735040},
        "timezone": 3600,
        "name": "London",
        "cod": 200
    }"#;

    #[test]
    fn parses_current_weather() {
        let snapshot = parse_current(&city(), 200, LONDON).expect("valid body");

        assert_eq!(snapshot.city_query, "London");
        assert_eq!(snapshot.observed_at, 1_697_724_000);
        assert_eq!(snapshot.sunrise, 1_697_697_180);
        assert_eq!(snapshot.sunset, 1_697_735_040);
        assert_eq!(snapshot.timezone_offset_secs, 3600);
        assert_eq!(snapshot.humidity_pct, 72);
        assert_eq!(snapshot.pressure_hpa, 1021);
        assert_eq!(snapshot.wind_direction_deg, 250.0);
        assert_eq!(snapshot.condition_keyword, "Clear");
        assert_eq!(snapshot.description, "clear sky");
    }

    #[test]
    fn string_cod_404_is_not_found() {
        let body = r#"{"cod":"404","message":"city not found"}"#;
        let err = parse_current(&city(), 404, body).unwrap_err();
        assert!(err.is_not_found());

        // Some gateways answer 200 and leave the code in the body.
        let err = parse_current(&city(), 200, body).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn numeric_cod_404_is_not_found() {
        let body = r#"{"cod":404,"message":"city not found"}"#;
        assert!(parse_current(&city(), 200, body).unwrap_err().is_not_found());
        assert!(parse_current(&city(), 404, body).unwrap_err().is_not_found());
    }

    #[test]
    fn provider_error_uses_message_field() {
        let body = r#"{"cod":401,"message":"Invalid API key. Please see https://openweathermap.org/faq#error401 for more info."}"#;
        match parse_current(&city(), 401, body).unwrap_err() {
            FetchError::Provider { status, message } => {
                assert_eq!(status, 401);
                assert!(message.starts_with("Invalid API key"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_json_error_body_is_truncated() {
        let body = "x".repeat(500);
        match parse_current(&city(), 502, &body).unwrap_err() {
            FetchError::Provider { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message.len(), 203);
                assert!(message.ends_with("..."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_fields_are_a_decode_error() {
        let err = parse_current(&city(), 200, r#"{"cod":200,"dt":1}"#).unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn empty_weather_list_yields_empty_condition() {
        let body = LONDON.replace(
            r#"[{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}]"#,
            "[]",
        );
        let snapshot = parse_current(&city(), 200, &body).expect("valid body");
        assert_eq!(snapshot.condition_keyword, "");
        assert_eq!(snapshot.description, "");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let provider = OpenWeatherProvider::new("KEY".into(), Units::Imperial)
            .with_base_url("http://localhost:8080/");
        assert_eq!(
            provider.current_weather_url(),
            "http://localhost:8080/data/2.5/weather"
        );
        assert_eq!(provider.units(), Units::Imperial);
    }
}
