use httpmock::prelude::*;
use plan_quoter::app::form::QuoteForm;
use plan_quoter::config::ExtractorConfig;
use plan_quoter::core::currency::CurrencyFormat;
use plan_quoter::core::snapshot::PricingSnapshot;
use plan_quoter::domain::model::{AgeBracket, PlanId, PlanPrices, PricingTable};
use plan_quoter::utils::error::EXTRACTION_FAILED_MESSAGE;
use plan_quoter::{GeminiExtractor, LocalStorage, PricingStore, QuoterApp, QuoterError};
use tempfile::TempDir;

const MODEL_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

fn extractor_config(server: &MockServer) -> ExtractorConfig {
    ExtractorConfig {
        endpoint: server.url("/v1beta"),
        model: "gemini-2.5-flash".to_string(),
        api_key: Some("test-key".to_string()),
        timeout_seconds: 5,
    }
}

fn gemini_reply(table_json: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": table_json }] },
            "finishReason": "STOP"
        }],
        "modelVersion": "gemini-2.5-flash"
    })
}

/// Store seeded with a distinctive by-contribution price so the reset is visible.
fn seeded_store() -> PricingStore {
    let mut table = PricingTable::builtin();
    table.set_plan(PlanId::ByContribution, Some(PlanPrices::flat(12_000.0)));
    PricingStore::new(table)
}

fn setup(server: &MockServer) -> (TempDir, QuoterApp<GeminiExtractor<ExtractorConfig>, LocalStorage>) {
    let temp_dir = TempDir::new().unwrap();
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
    std::fs::write(temp_dir.path().join("tabla.png"), b"\x89PNG\r\n\x1a\nfake").unwrap();

    let app = QuoterApp::new(
        seeded_store(),
        GeminiExtractor::new(extractor_config(server)),
        storage,
        CurrencyFormat::en_us(),
    );
    (temp_dir, app)
}

#[tokio::test]
async fn test_successful_update_replaces_table() {
    let server = MockServer::start_async().await;
    let table_json = r#"{
        "200": {"01-29": 41000, "30-39": 50000, "40-49": 58000, "50-59": 71000},
        "300": {"01-29": 51000, "30-39": 60000, "40-49": 69000, "50-59": 88000},
        "400": {"01-29": 63000, "30-39": 72000, "40-49": 85000, "50-59": 109000},
        "500": {"01-29": 79000, "30-39": 90000, "40-49": 107000, "50-59": 137000}
    }"#;

    let api_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(MODEL_PATH)
                .query_param("key", "test-key")
                .body_contains("\"mimeType\":\"image/png\"")
                .body_contains("Individual")
                .body_contains("\"responseMimeType\":\"application/json\"");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(gemini_reply(table_json));
        })
        .await;

    let (_temp_dir, app) = setup(&server);

    let report = app.update_prices("tabla.png", None).await.unwrap();

    api_mock.assert_async().await;
    assert_eq!(report.priced_cells, 16);
    assert!(report.missing_cells.is_empty());

    let table = app.store().snapshot();
    assert_eq!(table.price(PlanId::Plan300, AgeBracket::From40To49), Some(69_000.0));
    assert_eq!(table.by_contribution_price(), Some(9_000.0));

    // later quotes use the new prices
    let view = app.quote(&QuoteForm::new("10000", "35", PlanId::Plan200));
    assert_eq!(view.result, "A ABONAR: $24,502.55");
}

#[tokio::test]
async fn test_update_writes_snapshot() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(MODEL_PATH);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(gemini_reply(r#"{"500": {"50-59": 150000}}"#));
        })
        .await;

    let (temp_dir, app) = setup(&server);

    let report = app
        .update_prices("tabla.png", Some("snapshots/precios.json"))
        .await
        .unwrap();
    assert_eq!(report.missing_cells.len(), 15);

    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
    let snapshot = PricingSnapshot::load(&storage, "snapshots/precios.json")
        .await
        .unwrap();

    assert_eq!(snapshot.source, "tabla.png");
    assert_eq!(snapshot.table, *app.store().snapshot());
    assert_eq!(
        snapshot.table.price(PlanId::Plan500, AgeBracket::From50To59),
        Some(150_000.0)
    );
}

#[tokio::test]
async fn test_upstream_error_keeps_previous_table() {
    let server = MockServer::start_async().await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(POST).path(MODEL_PATH);
            then.status(503).body("model overloaded");
        })
        .await;

    let (_temp_dir, app) = setup(&server);
    let before = app.store().snapshot();

    let err = app.update_prices("tabla.png", None).await.unwrap_err();

    api_mock.assert_async().await;
    assert!(matches!(err, QuoterError::ExtractionFailed { .. }));
    assert_eq!(err.user_friendly_message(), EXTRACTION_FAILED_MESSAGE);
    assert_eq!(*app.store().snapshot(), *before);
    assert_eq!(app.store().snapshot().by_contribution_price(), Some(12_000.0));
}

#[tokio::test]
async fn test_unparsable_reply_keeps_previous_table() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(MODEL_PATH);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(gemini_reply("Lo siento, no puedo leer la imagen."));
        })
        .await;

    let (_temp_dir, app) = setup(&server);
    let before = app.store().snapshot();

    let err = app.update_prices("tabla.png", None).await.unwrap_err();

    assert_eq!(err.to_string(), EXTRACTION_FAILED_MESSAGE);
    assert_eq!(*app.store().snapshot(), *before);
}

#[tokio::test]
async fn test_missing_api_key_fails_without_request() {
    let server = MockServer::start_async().await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(POST).path(MODEL_PATH);
            then.status(200);
        })
        .await;

    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("tabla.jpg"), b"\xff\xd8\xff").unwrap();
    let mut config = extractor_config(&server);
    config.api_key = None;

    let app = QuoterApp::new(
        seeded_store(),
        GeminiExtractor::new(config),
        LocalStorage::new(temp_dir.path().to_str().unwrap().to_string()),
        CurrencyFormat::default(),
    );

    let err = app.update_prices("tabla.jpg", None).await.unwrap_err();

    assert!(matches!(err, QuoterError::ExtractionFailed { .. }));
    api_mock.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_non_image_file_is_rejected_before_extraction() {
    let server = MockServer::start_async().await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(POST).path(MODEL_PATH);
            then.status(200);
        })
        .await;

    let (temp_dir, app) = setup(&server);
    std::fs::write(temp_dir.path().join("tabla.pdf"), b"%PDF").unwrap();

    let err = app.update_prices("tabla.pdf", None).await.unwrap_err();

    assert!(matches!(err, QuoterError::UnsupportedImage { .. }));
    api_mock.assert_hits_async(0).await;
}
