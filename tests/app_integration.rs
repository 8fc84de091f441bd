use std::fs;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const RATES_JSON: &str = r#"{
        "bcv": {
            "precio_bcv": 36.5,
            "fecha_actualizacion": "2025-01-10T16:00:00.000Z"
        },
        "paralelo": {
            "precio_paralelo": 40.0
        }
    }"#;

    pub async fn create_mock_server(response: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/all"))
            .respond_with(response)
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub async fn create_rates_server() -> MockServer {
        create_mock_server(ResponseTemplate::new(200).set_body_string(RATES_JSON)).await
    }

    /// Writes a config pointing at `server` and returns the temp file holding it.
    pub fn write_config(server: &MockServer, extra: &str) -> tempfile::NamedTempFile {
        let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        let config_content = format!(
            "endpoint: \"{}/v1/all\"\n{}",
            server.uri(),
            extra
        );
        super::fs::write(config_file.path(), config_content).expect("Failed to write config file");
        config_file
    }
}

#[test_log::test(tokio::test)]
async fn test_rates_command_with_mock() {
    let server = test_utils::create_rates_server().await;
    let config_file = test_utils::write_config(&server, "mode: average\n");

    let result = dolarve::run_command(
        dolarve::AppCommand::Rates,
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "Rates command failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_convert_command_with_mock() {
    let server = test_utils::create_rates_server().await;
    let config_file = test_utils::write_config(&server, "");

    let result = dolarve::run_command(
        dolarve::AppCommand::Convert {
            amount: "10".to_string(),
            from: dolarve::core::Field::Source,
            mode: Some(dolarve::core::RateMode::Market),
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "Convert command failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_convert_command_rejects_invalid_amount() {
    let server = test_utils::create_rates_server().await;
    let config_file = test_utils::write_config(&server, "");

    let result = dolarve::run_command(
        dolarve::AppCommand::Convert {
            amount: "abc".to_string(),
            from: dolarve::core::Field::Target,
            mode: None,
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    let err = result.expect_err("Invalid amount should fail");
    info!(error = %err, "Convert failed as expected");
    assert_eq!(err.to_string(), "Invalid amount: \"abc\"");
}

#[test_log::test(tokio::test)]
async fn test_rates_command_surfaces_server_error() {
    let server =
        test_utils::create_mock_server(wiremock::ResponseTemplate::new(503)).await;
    let config_file = test_utils::write_config(&server, "");

    let result = dolarve::run_command(
        dolarve::AppCommand::Rates,
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    let err = result.expect_err("Server error should fail");
    assert_eq!(err.to_string(), "Failed to load exchange rates");
    assert!(format!("{err:#}").contains("HTTP error: 503 Service Unavailable"));
}

#[test_log::test(tokio::test)]
async fn test_missing_config_file() {
    let result = dolarve::run_command(
        dolarve::AppCommand::Rates,
        Some("/nonexistent/dolarve/config.yaml"),
    )
    .await;
    let err = result.expect_err("Missing config should fail");
    assert!(err.to_string().starts_with("Failed to read config file"));
}

#[test_log::test(tokio::test)]
async fn test_session_polls_mock_endpoint() {
    use dolarve::cli::watch::{Command, Session};
    use dolarve::core::config::AppConfig;
    use dolarve::core::{Field, RateProvider};
    use dolarve::providers::DollarApiProvider;
    use std::sync::Arc;

    let server = test_utils::create_rates_server().await;
    let config = AppConfig {
        endpoint: format!("{}/v1/all", server.uri()),
        ..AppConfig::default()
    };
    let provider: Arc<dyn RateProvider> = Arc::new(DollarApiProvider::new(&config.endpoint).unwrap());

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let mut session = Session::new(&config);
    session.handle(Command::Edit(Field::Source, "10".to_string()));

    let poller = session.fetcher().poller(provider, tx);
    poller.fetch_now().await.unwrap();
    let reply = rx.recv().await.expect("No poll reply");
    assert!(session.apply_reply(reply));

    assert_eq!(session.binder().value(Field::Target), "365.00");
}
