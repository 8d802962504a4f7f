//! Integration tests for the Azure Read OCR client against a mock server.

use chart_insight::{
    AnswerModel, AzureReadClient, ChartInsight, ChartType, InsightConfig, InsightError,
    ModelReply, OcrConfig, OcrEngine, OcrError,
};
use edgequake_llm::{ChatMessage, CompletionOptions};
use image::{DynamicImage, Rgb, RgbImage};
use serde_json::json;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "test-key";
const ANALYZE_PATH: &str = "/vision/v3.2/read/analyze";
const RESULT_PATH: &str = "/vision/v3.2/read/analyzeResults/op-123";

fn client_for(server: &MockServer, max_polls: u32) -> AzureReadClient {
    let config = OcrConfig::builder()
        .endpoint(format!("{}/", server.uri()))
        .api_key(KEY)
        .poll_interval_ms(10)
        .max_wait_secs(10)
        .max_polls(max_polls)
        .build()
        .expect("valid config");
    AzureReadClient::new(config).expect("client")
}

async fn mount_submit(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(ANALYZE_PATH))
        .and(query_param("language", "en"))
        .and(header("Ocp-Apim-Subscription-Key", KEY))
        .and(header("Content-Type", "application/octet-stream"))
        .respond_with(
            ResponseTemplate::new(202)
                .insert_header("Operation-Location", format!("{}{}", server.uri(), RESULT_PATH).as_str()),
        )
        .expect(1)
        .mount(server)
        .await;
}

fn succeeded(lines: &[&str]) -> serde_json::Value {
    let lines: Vec<_> = lines.iter().map(|t| json!({ "text": t })).collect();
    json!({
        "status": "succeeded",
        "analyzeResult": {
            "version": "3.2.0",
            "readResults": [{ "page": 1, "lines": lines }]
        }
    })
}

fn chart_png() -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([0, 0, 0])));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .expect("encode fixture");
    buf
}

// ── Read flow ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn polls_until_succeeded_and_joins_lines() {
    let server = MockServer::start().await;
    mount_submit(&server).await;

    let polls = Arc::new(AtomicUsize::new(0));
    let counter = polls.clone();
    Mock::given(method("GET"))
        .and(path(RESULT_PATH))
        .and(header("Ocp-Apim-Subscription-Key", KEY))
        .respond_with(move |_req: &wiremock::Request| {
            match counter.fetch_add(1, Ordering::SeqCst) {
                0 => ResponseTemplate::new(200).set_body_json(json!({ "status": "notStarted" })),
                1 => ResponseTemplate::new(200).set_body_json(json!({ "status": "running" })),
                _ => ResponseTemplate::new(200)
                    .set_body_json(succeeded(&["Bar Chart", "Q1 sales 100", "Q2 sales 150"])),
            }
        })
        .expect(3)
        .mount(&server)
        .await;

    let text = client_for(&server, 10)
        .extract_text(chart_png())
        .await
        .expect("OCR should succeed");

    assert_eq!(text, "Bar Chart\nQ1 sales 100\nQ2 sales 150");
    assert_eq!(polls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn stuck_operation_stops_at_poll_budget() {
    let server = MockServer::start().await;
    mount_submit(&server).await;

    Mock::given(method("GET"))
        .and(path(RESULT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "running" })))
        .expect(3)
        .mount(&server)
        .await;

    let err = client_for(&server, 3)
        .extract_text(chart_png())
        .await
        .unwrap_err();

    match err {
        OcrError::Timeout {
            polls, last_status, ..
        } => {
            assert_eq!(polls, 3);
            assert_eq!(last_status, "running");
        }
        other => panic!("expected Timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn stuck_operation_stops_at_deadline() {
    let server = MockServer::start().await;
    mount_submit(&server).await;

    Mock::given(method("GET"))
        .and(path(RESULT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "running" })))
        .mount(&server)
        .await;

    let config = OcrConfig::builder()
        .endpoint(server.uri())
        .api_key(KEY)
        .poll_interval_ms(250)
        .max_wait_secs(1)
        .max_polls(1000)
        .build()
        .unwrap();
    let client = AzureReadClient::new(config).unwrap();

    let err = client.extract_text(chart_png()).await.unwrap_err();

    match err {
        OcrError::Timeout {
            polls, elapsed_ms, ..
        } => {
            assert!(polls < 1000, "deadline should stop polling first");
            assert!(elapsed_ms >= 1000, "elapsed {elapsed_ms}ms");
        }
        other => panic!("expected Timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_operation_is_reported() {
    let server = MockServer::start().await;
    mount_submit(&server).await;

    Mock::given(method("GET"))
        .and(path(RESULT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "failed" })))
        .mount(&server)
        .await;

    let err = client_for(&server, 5)
        .extract_text(chart_png())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        OcrError::OperationFailed {
            status: "failed".into()
        }
    );
    assert_eq!(err.to_string(), "OCR failed or no text found.");
}

#[tokio::test]
async fn succeeded_without_lines_is_no_text() {
    let server = MockServer::start().await;
    mount_submit(&server).await;

    Mock::given(method("GET"))
        .and(path(RESULT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(succeeded(&[])))
        .mount(&server)
        .await;

    let err = client_for(&server, 5)
        .extract_text(chart_png())
        .await
        .unwrap_err();

    assert_eq!(err, OcrError::NoText);
}

#[tokio::test]
async fn rejected_key_surfaces_http_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ANALYZE_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("Access denied"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server, 5)
        .extract_text(chart_png())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        OcrError::HttpStatus {
            status: 401,
            body: "Access denied".into()
        }
    );
    assert!(err.to_string().starts_with("Azure OCR Error: "));
}

#[tokio::test]
async fn missing_operation_location_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ANALYZE_PATH))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;

    let err = client_for(&server, 5)
        .extract_text(chart_png())
        .await
        .unwrap_err();

    assert_eq!(err, OcrError::MissingOperationLocation);
}

#[tokio::test]
async fn malformed_status_body_is_invalid_response() {
    let server = MockServer::start().await;
    mount_submit(&server).await;

    Mock::given(method("GET"))
        .and(path(RESULT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server, 5)
        .extract_text(chart_png())
        .await
        .unwrap_err();

    assert!(matches!(err, OcrError::InvalidResponse { .. }), "got {err:?}");
}

// ── Engine over the real client ──────────────────────────────────────────────

struct FixedModel;

impl AnswerModel for FixedModel {
    async fn answer(
        &self,
        _messages: Vec<ChatMessage>,
        _options: CompletionOptions,
    ) -> Result<ModelReply, InsightError> {
        Ok(ModelReply::text("Q2 had higher sales.It sold 150 units."))
    }
}

#[tokio::test]
async fn engine_analyzes_through_azure_client() {
    let server = MockServer::start().await;
    mount_submit(&server).await;

    Mock::given(method("GET"))
        .and(path(RESULT_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(succeeded(&["Bar Chart: Q1 sales 100, Q2 sales 150"])),
        )
        .mount(&server)
        .await;

    let engine = ChartInsight::new(client_for(&server, 5), FixedModel, InsightConfig::default());

    let analysis = engine
        .analyze(&chart_png(), "Which quarter had higher sales?")
        .await
        .expect("analysis should succeed");

    assert_eq!(analysis.chart_type, ChartType::Bar);
    assert_eq!(analysis.ocr_text, "Bar Chart: Q1 sales 100, Q2 sales 150");
    assert_eq!(analysis.answer, "Q2 had higher sales. It sold 150 units.");
}
