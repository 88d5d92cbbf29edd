use std::net::SocketAddr;
use std::path::PathBuf;

use axum::Router;
use configs::AppConfig;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

use server::{routes, startup};

struct TestApp {
    base_url: String,
    csv: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.csv);
    }
}

/// Full startup path with the forecast upstream pointed at a closed port.
async fn start_server(seed: &str) -> anyhow::Result<TestApp> {
    let csv = std::env::temp_dir().join(format!("e2e_{}.csv", Uuid::new_v4()));
    tokio::fs::write(&csv, format!("Region,State,Name,Latitude,Longitude\n{seed}")).await?;

    let mut cfg = AppConfig::default();
    cfg.storage.resorts_csv = csv.clone();
    cfg.weather.base_url = "http://127.0.0.1:9".into();
    cfg.weather.timeout_secs = 1;
    cfg.normalize_and_validate()?;

    let state = startup::build_state(&cfg).await?;
    let app: Router = routes::build_router(state, startup::build_cors(&cfg.cors)?);
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url, csv })
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    let app = start_server("").await?;
    let res = reqwest::get(format!("{}/health", app.base_url)).await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_resort_lifecycle() -> anyhow::Result<()> {
    let app = start_server("Colorado,US,Vail,39.6,-106.3\n").await?;
    let client = reqwest::Client::new();
    let url = format!("{}/ski-resorts", app.base_url);

    let res = client
        .post(&url)
        .json(&json!({"name": "Alta", "region": "Utah", "state": "US", "latitude": 40.5884, "longitude": -111.6386}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);

    let res = client
        .post(&url)
        .json(&json!({"name": "ALTA", "region": "Utah", "state": "US", "latitude": 40.5884, "longitude": -111.6386}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    assert_eq!(res.text().await?, "Resort already exists");

    let names: Vec<String> = client
        .get(&url)
        .send()
        .await?
        .json::<Vec<Value>>()
        .await?
        .iter()
        .filter_map(|r| r["name"].as_str().map(str::to_string))
        .collect();
    assert_eq!(names, ["Vail", "Alta"]);

    let res = client.delete(format!("{url}/vail")).send().await?;
    assert_eq!(res.text().await?, "Resort deleted");

    // State survives a restart from the same file.
    let text = tokio::fs::read_to_string(&app.csv).await?;
    assert_eq!(text, "Region,State,Name,Latitude,Longitude\nUtah,US,Alta,40.5884,-111.6386\n");
    Ok(())
}

#[tokio::test]
async fn e2e_weather_upstream_down_is_null() -> anyhow::Result<()> {
    let app = start_server("").await?;
    let res = reqwest::get(format!("{}/weather?latitude=39.6&longitude=-106.3", app.base_url)).await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.text().await?, "null");
    Ok(())
}

#[tokio::test]
async fn e2e_missing_data_file_fails_startup() {
    let mut cfg = AppConfig::default();
    cfg.storage.resorts_csv = std::env::temp_dir().join(format!("missing_{}.csv", Uuid::new_v4()));
    let Err(err) = startup::build_state(&cfg).await else {
        panic!("startup must fail without a data file");
    };
    assert!(err.to_string().contains("cannot access resort data file"), "{err}");
}
