//! Forecast proxy for the external weather API.
//!
//! The upstream answers in two steps: coordinates resolve to grid metadata that
//! carries a forecast URL, and that URL serves the forecast document.

pub mod client;

pub use client::{ForecastProvider, NwsForecastClient, WeatherClientConfig, WeatherError};
