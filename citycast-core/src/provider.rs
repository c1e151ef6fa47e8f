use crate::{
    Config, Units,
    model::{CityQuery, WeatherSnapshot},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

pub mod openweather;

/// Why a lookup produced no snapshot.
///
/// `NotFound` is an expected, user-visible outcome. Every other variant is a
/// network-class failure: logged, and the view is left as it was.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("City not found: {city}")]
    NotFound { city: String },

    #[error("Failed to reach weather provider: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Weather provider returned status {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("Failed to decode weather provider response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound { .. })
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Issue exactly one request for the current conditions in `city`.
    async fn fetch(&self, city: &CityQuery) -> Result<WeatherSnapshot, FetchError>;
}

/// Construct the OpenWeather provider from config, requesting `units`.
pub fn provider_from_config(
    config: &Config,
    units: Units,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No OpenWeather API key configured.\n\
                 Hint: run `citycast configure` or set {} before building or running.",
            crate::config::API_KEY_ENV
        )
    })?;

    let provider = OpenWeatherProvider::new(api_key, units).with_base_url(config.base_url());
    Ok(Box::new(provider))
}
