use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Flat file holding one resort per row.
    #[serde(default = "default_resorts_csv")]
    pub resorts_csv: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { resorts_csv: default_resorts_csv() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// The upstream rejects requests without an identifying User-Agent.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_weather_timeout")]
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_weather_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self { allowed_origin: default_allowed_origin() }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl LogFormat {
    fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(anyhow!("logging.format must be `compact` or `json`, got `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
    /// When set, logs are appended to this file instead of stdout.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 5000 }
fn default_resorts_csv() -> PathBuf { PathBuf::from("data/favorite_ski_resorts.csv") }
fn default_weather_base_url() -> String { "https://api.weather.gov".into() }
fn default_user_agent() -> String { "(myweatherapp.com, contact@myweatherapp.com)".into() }
fn default_weather_timeout() -> u64 { 10 }
fn default_allowed_origin() -> String { "http://localhost:3000".into() }

/// Load `CONFIG_PATH` (default `config.toml`); a missing file yields defaults.
pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    if !std::path::Path::new(&path).exists() {
        return Ok(AppConfig::default());
    }
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {path}"))?;
    let cfg: AppConfig =
        toml::from_str(&content).with_context(|| format!("failed to parse config file {path}"))?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.apply_env_overrides(|key| std::env::var(key).ok())?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Overlay values from the environment. `lookup` is injected so tests do not
    /// have to mutate the process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("SERVER_PORT is not a valid port: {port}"))?;
        }
        // 与二进制入口一致，允许通过 TOKIO_WORKER_THREADS 调整线程数
        if let Some(threads) = lookup("TOKIO_WORKER_THREADS") {
            self.server.worker_threads = threads.trim().parse().ok();
        }
        if let Some(path) = lookup("RESORTS_CSV_PATH") {
            self.storage.resorts_csv = PathBuf::from(path);
        }
        if let Some(url) = lookup("WEATHER_BASE_URL") {
            self.weather.base_url = url;
        }
        if let Some(ua) = lookup("WEATHER_USER_AGENT") {
            self.weather.user_agent = ua;
        }
        if let Some(origin) = lookup("CORS_ORIGIN") {
            self.cors.allowed_origin = origin;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            self.logging.format = LogFormat::parse(&format)?;
        }
        if let Some(file) = lookup("LOG_FILE") {
            self.logging.file = if file.trim().is_empty() { None } else { Some(PathBuf::from(file)) };
        }
        Ok(())
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        // 归一化 server（空 host 回退默认值，线程数 0 视为 4）
        self.server.normalize()?;
        self.storage.validate()?;
        // weather.base_url 去除尾部斜杠，必须为 http(s)
        self.weather.normalize_and_validate()?;
        self.cors.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<()> {
        if self.resorts_csv.as_os_str().is_empty() {
            return Err(anyhow!("storage.resorts_csv must not be empty"));
        }
        Ok(())
    }
}

impl WeatherConfig {
    fn normalize_and_validate(&mut self) -> Result<()> {
        let trimmed = self.base_url.trim().trim_end_matches('/').to_string();
        let lower = trimmed.to_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(anyhow!("weather.base_url must start with http:// or https://"));
        }
        self.base_url = trimmed;
        if self.user_agent.trim().is_empty() {
            return Err(anyhow!("weather.user_agent must not be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(anyhow!("weather.timeout_secs must be a positive number of seconds"));
        }
        Ok(())
    }
}

impl CorsConfig {
    fn validate(&self) -> Result<()> {
        let origin = self.allowed_origin.trim();
        if origin.is_empty() || origin.chars().any(|c| c.is_control()) {
            return Err(anyhow!("cors.allowed_origin must be a non-empty origin"));
        }
        Ok(())
    }
}
