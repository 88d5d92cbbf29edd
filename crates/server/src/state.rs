use std::sync::Arc;

use service::{resorts::ResortRepository, weather::ForecastProvider};

/// Shared handler state. Both collaborators are injected at startup so tests
/// can swap either for an in-process double.
#[derive(Clone)]
pub struct AppState {
    pub resorts: Arc<dyn ResortRepository>,
    pub weather: Arc<dyn ForecastProvider>,
}
