use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::state::AppState;

/// Raw query parameters. Parsed by hand so a bad value yields the same empty
/// result as an upstream failure rather than a rejection.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WeatherQuery {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

impl WeatherQuery {
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((parse_coordinate(self.latitude.as_deref())?, parse_coordinate(self.longitude.as_deref())?))
    }
}

fn parse_coordinate(raw: Option<&str>) -> Option<f64> {
    raw?.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[utoipa::path(
    get, path = "/weather", tag = "weather",
    params(WeatherQuery),
    responses((status = 200, description = "Forecast document, or null when unavailable"))
)]
pub async fn get_weather(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> Json<Option<Value>> {
    let Some((latitude, longitude)) = query.coordinates() else {
        warn!(?query, "weather request without usable coordinates");
        return Json(None);
    };
    Json(state.weather.fetch_forecast(latitude, longitude).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(lat: Option<&str>, lon: Option<&str>) -> WeatherQuery {
        WeatherQuery { latitude: lat.map(Into::into), longitude: lon.map(Into::into) }
    }

    #[test]
    fn coordinates_parse() {
        assert_eq!(q(Some("39.6"), Some(" -106.3")).coordinates(), Some((39.6, -106.3)));
        assert_eq!(q(Some("40"), Some("-111")).coordinates(), Some((40.0, -111.0)));
        assert_eq!(q(None, Some("1")).coordinates(), None);
        assert_eq!(q(Some("north"), Some("1")).coordinates(), None);
        assert_eq!(q(Some("NaN"), Some("1")).coordinates(), None);
        assert_eq!(q(Some("1"), Some("inf")).coordinates(), None);
    }
}
