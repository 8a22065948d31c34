use folio::AppCommand;
use folio::core::store::{KeyValueStore, RESULTS_KEY, SESSION_KEY};
use std::fs;
use tempfile::TempDir;
use tracing::info;

// Adds automatic logging to test
mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_mock_server(mock_response: &str, status_code: u16) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/analyze"))
            .respond_with(ResponseTemplate::new(status_code).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub const SUCCESS_BODY: &str = r#"{
        "portfolio": {"cagr": 0.152, "annual_vol": 0.22, "sharpe": 1.2345, "max_drawdown": -0.4},
        "benchmark": {"cagr": 0.11, "annual_vol": 0.17, "sharpe": 0.8, "max_drawdown": -0.38},
        "chart_data": [
            {"date": "2018-01-01", "portfolio": 100.0, "benchmark": 100.0},
            {"date": "2018-01-02", "portfolio": 101.2, "benchmark": 100.3}
        ]
    }"#;
}

struct TestApp {
    _dir: TempDir,
    data_path: std::path::PathBuf,
    config_path: String,
}

impl TestApp {
    fn new(service_url: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let data_path = dir.path().join("data");
        let config_path = dir.path().join("config.yaml");
        let config_content = format!(
            r#"
            service:
              url: "{}"
              timeout_secs: 5
            data_path: "{}"
            "#,
            service_url,
            data_path.display()
        );
        fs::write(&config_path, config_content).expect("Failed to write config file");

        TestApp {
            data_path,
            config_path: config_path.to_str().unwrap().to_string(),
            _dir: dir,
        }
    }

    async fn run(&self, command: AppCommand) -> anyhow::Result<()> {
        folio::run_command(command, Some(&self.config_path)).await
    }

    async fn stored(&self, key: &str) -> Option<String> {
        let store = folio::store::DiskStore::open(&self.data_path.join("store")).unwrap();
        store.get(key).await.unwrap()
    }
}

fn add(ticker: &str, quantity: &str) -> AppCommand {
    AppCommand::Add {
        ticker: ticker.to_string(),
        quantity: quantity.to_string(),
    }
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    let mock_server = test_utils::create_mock_server(test_utils::SUCCESS_BODY, 200).await;
    let app = TestApp::new(&format!("{}/api/analyze", mock_server.uri()));

    app.run(add("hfcl.ns", "10")).await.unwrap();
    app.run(add("tcs.ns", "2")).await.unwrap();
    app.run(AppCommand::SetBenchmark("^BSESN".to_string()))
        .await
        .unwrap();
    app.run(AppCommand::List).await.unwrap();

    let session: serde_json::Value =
        serde_json::from_str(&app.stored(SESSION_KEY).await.unwrap()).unwrap();
    info!(?session, "Saved session");
    assert_eq!(session["holdings"].as_array().unwrap().len(), 2);
    assert_eq!(session["holdings"][0]["ticker"], "HFCL.NS");
    assert_eq!(session["benchmark"], "^BSESN");

    let result = app.run(AppCommand::Analyze { points: 12 }).await;
    assert!(result.is_ok(), "Analyze failed with: {:?}", result.err());

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["holdings"]["HFCL.NS"], 10.0);
    assert_eq!(body["holdings"]["TCS.NS"], 2.0);
    assert_eq!(body["benchmark"], "^BSESN");
    assert_eq!(body["start_date"], "2018-01-01");
    assert_eq!(body["risk_free_rate"], 0.065);

    let saved: serde_json::Value =
        serde_json::from_str(&app.stored(RESULTS_KEY).await.unwrap()).unwrap();
    assert_eq!(saved["portfolio"]["cagr"], 0.152);

    app.run(AppCommand::Report { points: 12 }).await.unwrap();
}

#[test_log::test(tokio::test)]
async fn test_remove_holding_is_persisted() {
    let app = TestApp::new("http://127.0.0.1:9/api/analyze");

    app.run(add("AAA", "1")).await.unwrap();
    app.run(add("BBB", "2")).await.unwrap();

    let session: serde_json::Value =
        serde_json::from_str(&app.stored(SESSION_KEY).await.unwrap()).unwrap();
    let first_id = session["holdings"][0]["id"].as_u64().unwrap();

    app.run(AppCommand::Remove { id: first_id }).await.unwrap();
    app.run(AppCommand::Remove { id: first_id }).await.unwrap();

    let session: serde_json::Value =
        serde_json::from_str(&app.stored(SESSION_KEY).await.unwrap()).unwrap();
    let holdings = session["holdings"].as_array().unwrap();
    assert_eq!(holdings.len(), 1);
    assert_eq!(holdings[0]["ticker"], "BBB");
}

#[test_log::test(tokio::test)]
async fn test_analyze_empty_portfolio_makes_no_request() {
    let mock_server = test_utils::create_mock_server(test_utils::SUCCESS_BODY, 200).await;
    let app = TestApp::new(&format!("{}/api/analyze", mock_server.uri()));

    let result = app.run(AppCommand::Analyze { points: 12 }).await;

    assert_eq!(
        result.unwrap_err().to_string(),
        "Please add at least one stock holding"
    );
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_analyze_surfaces_service_error() {
    let mock_server = test_utils::create_mock_server(r#"{"error": "bad date"}"#, 400).await;
    let app = TestApp::new(&format!("{}/api/analyze", mock_server.uri()));
    app.run(add("ABC", "5")).await.unwrap();

    let result = app.run(AppCommand::Analyze { points: 12 }).await;

    assert_eq!(result.unwrap_err().to_string(), "bad date");
    assert!(app.stored(RESULTS_KEY).await.is_none());

    let session: serde_json::Value =
        serde_json::from_str(&app.stored(SESSION_KEY).await.unwrap()).unwrap();
    assert_eq!(session["holdings"].as_array().unwrap().len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_analyze_unreachable_service() {
    let app = TestApp::new("http://127.0.0.1:9/api/analyze");
    app.run(add("ABC", "5")).await.unwrap();

    let result = app.run(AppCommand::Analyze { points: 12 }).await;

    assert_eq!(
        result.unwrap_err().to_string(),
        folio::core::error::TRANSPORT_ERROR_MESSAGE
    );
}

#[test_log::test(tokio::test)]
async fn test_invalid_add_is_rejected() {
    let app = TestApp::new("http://127.0.0.1:9/api/analyze");

    assert!(app.run(add("", "10")).await.is_err());
    assert!(app.run(add("ABC", "abc")).await.is_err());
    assert!(app.stored(SESSION_KEY).await.is_none());
}

#[test_log::test(tokio::test)]
async fn test_parameters_survive_between_runs() {
    let app = TestApp::new("http://127.0.0.1:9/api/analyze");

    app.run(AppCommand::SetStartDate(
        chrono::NaiveDate::from_ymd_opt(2020, 4, 1).unwrap(),
    ))
    .await
    .unwrap();
    app.run(AppCommand::SetRiskFreeRate(0.05)).await.unwrap();
    assert!(app.run(AppCommand::SetRiskFreeRate(f64::NAN)).await.is_err());

    let session: serde_json::Value =
        serde_json::from_str(&app.stored(SESSION_KEY).await.unwrap()).unwrap();
    assert_eq!(session["startDate"], "2020-04-01");
    assert_eq!(session["riskFreeRate"], 0.05);
    assert_eq!(session["benchmark"], "^NSEI");
}
