use std::time::Duration;

use async_trait::async_trait;
use common::metrics::{WEATHER_REQUESTS_TOTAL, WEATHER_UPSTREAM_FAILURES_TOTAL};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT},
    Client,
};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Failures while resolving a forecast. Never escapes `ForecastProvider`.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("invalid coordinates: latitude must be -90 to 90, longitude must be -180 to 180")]
    InvalidCoordinates,
    #[error("http client setup failed: {0}")]
    Client(String),
    #[error("request to {stage} failed: {message}")]
    Request { stage: &'static str, message: String },
    #[error("{stage} answered with status {status}")]
    Status { stage: &'static str, status: u16 },
    #[error("response is missing `{0}`")]
    MissingField(&'static str),
    #[error("cannot parse {stage} response: {message}")]
    Parse { stage: &'static str, message: String },
}

#[derive(Debug, Clone)]
pub struct WeatherClientConfig {
    /// e.g. `https://api.weather.gov`, without trailing slash
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for WeatherClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.weather.gov".into(),
            user_agent: "(myweatherapp.com, contact@myweatherapp.com)".into(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Coordinates in, forecast document out. `None` means "no data": the
/// upstream failed, answered unexpectedly, or the coordinates were invalid.
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    async fn fetch_forecast(&self, latitude: f64, longitude: f64) -> Option<Value>;
}

/// Client for the National Weather Service points/forecast API.
#[derive(Debug, Clone)]
pub struct NwsForecastClient {
    http: Client,
    base_url: String,
}

const POINTS: &str = "points lookup";
const FORECAST: &str = "forecast";

impl NwsForecastClient {
    pub fn new(config: WeatherClientConfig) -> Result<Self, WeatherError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = Client::builder()
            .user_agent(config.user_agent)
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| WeatherError::Client(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url.trim_end_matches('/').to_string() })
    }

    fn points_url(&self, latitude: f64, longitude: f64) -> String {
        format!("{}/points/{},{}", self.base_url, latitude, longitude)
    }

    /// Two-step lookup with every failure reported.
    pub async fn try_fetch_forecast(&self, latitude: f64, longitude: f64) -> Result<Value, WeatherError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(WeatherError::InvalidCoordinates);
        }

        let grid = self.get_json(&self.points_url(latitude, longitude), POINTS).await?;
        let forecast_url = grid
            .pointer("/properties/forecast")
            .and_then(Value::as_str)
            .ok_or(WeatherError::MissingField("properties.forecast"))?;
        debug!(%forecast_url, "resolved forecast endpoint");

        let forecast = self.get_json(forecast_url, FORECAST).await?;
        if !forecast.is_object() {
            return Err(WeatherError::Parse { stage: FORECAST, message: "payload is not an object".into() });
        }
        Ok(forecast)
    }

    async fn get_json(&self, url: &str, stage: &'static str) -> Result<Value, WeatherError> {
        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| WeatherError::Request { stage, message: e.to_string() })?;

        let status = res.status();
        if !status.is_success() {
            return Err(WeatherError::Status { stage, status: status.as_u16() });
        }

        res.json::<Value>()
            .await
            .map_err(|e| WeatherError::Parse { stage, message: e.to_string() })
    }
}

#[async_trait]
impl ForecastProvider for NwsForecastClient {
    #[instrument(skip(self), fields(component = "weather_client"))]
    async fn fetch_forecast(&self, latitude: f64, longitude: f64) -> Option<Value> {
        WEATHER_REQUESTS_TOTAL.inc();
        match self.try_fetch_forecast(latitude, longitude).await {
            Ok(forecast) => Some(forecast),
            Err(e) => {
                WEATHER_UPSTREAM_FAILURES_TOTAL.inc();
                warn!(error = %e, "forecast unavailable");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_url_has_no_double_slash() {
        let client = NwsForecastClient::new(WeatherClientConfig {
            base_url: "https://api.weather.gov/".into(),
            ..WeatherClientConfig::default()
        })
        .unwrap();
        assert_eq!(client.points_url(39.6, -106.3), "https://api.weather.gov/points/39.6,-106.3");
    }

    #[tokio::test]
    async fn out_of_range_coordinates_short_circuit() {
        let client = NwsForecastClient::new(WeatherClientConfig {
            base_url: "http://127.0.0.1:9".into(),
            ..WeatherClientConfig::default()
        })
        .unwrap();
        let err = client.try_fetch_forecast(91.0, 0.0).await.unwrap_err();
        assert!(matches!(err, WeatherError::InvalidCoordinates));
        assert!(client.fetch_forecast(0.0, -200.0).await.is_none());
    }

    #[test]
    fn invalid_user_agent_fails_setup() {
        let err = NwsForecastClient::new(WeatherClientConfig {
            user_agent: "bad\nagent".into(),
            ..WeatherClientConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, WeatherError::Client(_)));
    }
}
