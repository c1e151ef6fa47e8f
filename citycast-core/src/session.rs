use tracing::{debug, info};

use crate::{
    model::CityQuery,
    provider::{FetchError, WeatherProvider},
    view::{LookupOutcome, ViewState},
};

/// What happened to one submitted search.
#[derive(Debug)]
pub enum SubmitResult {
    /// Blank input; no request was made.
    Ignored,
    Found,
    NotFound,
    /// Network-class failure; the view was left untouched. Logged at
    /// `info` only, the front-end reports it to the user.
    Failed(FetchError),
}

/// One provider plus the view state it feeds.
///
/// `submit` takes `&mut self`, so a session never has two requests in flight.
#[derive(Debug)]
pub struct Session {
    provider: Box<dyn WeatherProvider>,
    view: ViewState,
}

impl Session {
    pub fn new(provider: Box<dyn WeatherProvider>) -> Self {
        Self {
            provider,
            view: ViewState::new(),
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub async fn submit(&mut self, raw_input: &str) -> SubmitResult {
        let Some(city) = CityQuery::parse(raw_input) else {
            debug!("ignoring blank city input");
            return SubmitResult::Ignored;
        };

        let (outcome, result) = match self.provider.fetch(&city).await {
            Ok(snapshot) => (LookupOutcome::Found(snapshot), SubmitResult::Found),
            Err(FetchError::NotFound { .. }) => {
                info!(city = %city, "city not found");
                (LookupOutcome::NotFound(city), SubmitResult::NotFound)
            }
            Err(err) => {
                info!(city = %city, error = %err, "weather lookup failed");
                (LookupOutcome::Failed, SubmitResult::Failed(err))
            }
        };

        self.view.apply(outcome);
        result
    }
}
