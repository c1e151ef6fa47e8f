//! Core library for the `citycast` weather lookup.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather current-conditions client behind a provider trait
//! - Day/night and condition classification, wind direction labels
//! - The single view state and its rendering
//!
//! It is used by `citycast-cli`, but can also back other front-ends.

pub mod classify;
pub mod config;
pub mod model;
pub mod provider;
pub mod session;
pub mod view;
pub mod wind;

pub use classify::{Classification, IconKey, Theme, classify};
pub use config::Config;
pub use model::{CityQuery, Units, WeatherSnapshot};
pub use provider::{
    FetchError, WeatherProvider, openweather::OpenWeatherProvider, provider_from_config,
};
pub use session::{Session, SubmitResult};
pub use view::{LookupOutcome, RenderedView, ViewState};
pub use wind::{Cardinal, degrees_to_cardinal};
