//! Azure Computer Vision Read (v3.2) client.
//!
//! The Read API is asynchronous on the server side:
//!
//! ```text
//! POST {endpoint}/vision/v3.2/read/analyze?language=en   (image bytes)
//!   ◀── 202 Accepted, Operation-Location: {endpoint}/vision/v3.2/read/analyzeResults/{id}
//! GET  {Operation-Location}                               (repeat)
//!   ◀── 200 {"status": "notStarted" | "running" | "succeeded" | "failed", ...}
//! ```
//!
//! ## Bounded polling
//!
//! The status endpoint is polled at `poll_interval_ms` until a terminal
//! status arrives. Two independent limits stop a stuck operation: the
//! `max_wait_secs` deadline and the `max_polls` budget. Whichever is hit
//! first ends the loop with [`OcrError::Timeout`]. Every HTTP request also
//! carries `request_timeout_secs`.

use crate::config::OcrConfig;
use crate::error::OcrError;
use crate::ocr::OcrEngine;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const OPERATION_LOCATION_HEADER: &str = "Operation-Location";
const READ_ANALYZE_PATH: &str = "/vision/v3.2/read/analyze";

/// Body of a `GET analyzeResults/{id}` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReadOperation {
    status: String,
    #[serde(default)]
    analyze_result: Option<AnalyzeResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResult {
    #[serde(default)]
    read_results: Vec<ReadResult>,
}

#[derive(Debug, Deserialize)]
struct ReadResult {
    #[serde(default)]
    lines: Vec<ReadLine>,
}

#[derive(Debug, Deserialize)]
struct ReadLine {
    text: String,
}

impl ReadOperation {
    /// All recognised lines, page by page, joined with `\n`.
    fn joined_lines(&self) -> String {
        self.analyze_result
            .iter()
            .flat_map(|r| r.read_results.iter())
            .flat_map(|page| page.lines.iter())
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// OCR client for the Azure Read API.
///
/// Cheap to clone; the inner `reqwest::Client` shares its connection pool.
#[derive(Debug, Clone)]
pub struct AzureReadClient {
    http: reqwest::Client,
    config: OcrConfig,
}

impl AzureReadClient {
    /// Create a client. Missing credentials are not an error until the
    /// first call to [`OcrEngine::extract_text`].
    pub fn new(config: OcrConfig) -> Result<Self, OcrError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| OcrError::Request {
                detail: e.to_string(),
            })?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    fn credentials(&self) -> Result<(&str, &str), OcrError> {
        let endpoint = self
            .config
            .endpoint
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .ok_or(OcrError::NotConfigured {
                missing: "AZURE_OCR_ENDPOINT",
            })?;
        let key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(OcrError::NotConfigured {
                missing: "AZURE_OCR_KEY",
            })?;
        Ok((endpoint.trim_end_matches('/'), key))
    }

    /// Submit the image and return the operation URL to poll.
    async fn submit(&self, png: Vec<u8>) -> Result<String, OcrError> {
        let (endpoint, key) = self.credentials()?;
        let url = format!(
            "{}{}?language={}",
            endpoint, READ_ANALYZE_PATH, self.config.language
        );
        debug!("Submitting {} bytes to Azure Read", png.len());

        let response = self
            .http
            .post(&url)
            .header(SUBSCRIPTION_KEY_HEADER, key)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(png)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let location = response
            .headers()
            .get(OPERATION_LOCATION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(OcrError::MissingOperationLocation)?;

        if location.starts_with("http://") || location.starts_with("https://") {
            Ok(location.to_string())
        } else {
            Ok(format!("{}/{}", endpoint, location.trim_start_matches('/')))
        }
    }

    async fn fetch_status(&self, operation_url: &str) -> Result<ReadOperation, OcrError> {
        let (_, key) = self.credentials()?;
        let response = self
            .http
            .get(operation_url)
            .header(SUBSCRIPTION_KEY_HEADER, key)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<ReadOperation>()
            .await
            .map_err(|e| OcrError::InvalidResponse {
                detail: e.to_string(),
            })
    }

    /// Poll the read operation until it finishes or a limit is reached.
    async fn wait_for_result(&self, operation_url: &str) -> Result<ReadOperation, OcrError> {
        let started = Instant::now();
        let deadline = started + self.config.max_wait();
        let mut polls: u32 = 0;
        let mut last_status = String::from("notStarted");

        loop {
            if polls >= self.config.max_polls || Instant::now() >= deadline {
                let elapsed_ms = started.elapsed().as_millis() as u64;
                warn!(
                    "Azure Read still '{}' after {} polls ({}ms); giving up",
                    last_status, polls, elapsed_ms
                );
                return Err(OcrError::Timeout {
                    polls,
                    elapsed_ms,
                    last_status,
                });
            }

            polls += 1;
            let operation = self.fetch_status(operation_url).await?;
            debug!("Azure Read poll {}: status={}", polls, operation.status);

            match operation.status.as_str() {
                "notStarted" | "running" => {
                    last_status = operation.status;
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    sleep(self.config.poll_interval().min(remaining)).await;
                }
                _ => return Ok(operation),
            }
        }
    }
}

impl OcrEngine for AzureReadClient {
    async fn extract_text(&self, png: Vec<u8>) -> Result<String, OcrError> {
        let start = Instant::now();
        let operation_url = self.submit(png).await?;
        let operation = self.wait_for_result(&operation_url).await?;

        if operation.status != "succeeded" {
            warn!("Azure Read finished with status '{}'", operation.status);
            return Err(OcrError::OperationFailed {
                status: operation.status,
            });
        }

        let text = operation.joined_lines();
        if text.trim().is_empty() {
            return Err(OcrError::NoText);
        }

        info!(
            "OCR extracted {} lines in {}ms",
            text.lines().count(),
            start.elapsed().as_millis()
        );
        Ok(text)
    }
}

fn request_error(e: reqwest::Error) -> OcrError {
    let detail = if e.is_timeout() {
        format!("request timed out: {e}")
    } else {
        e.to_string()
    };
    OcrError::Request { detail }
}
