// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Google Sheets `values.append` endpoint.

use std::time::Duration;

use reqwest::Url;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::debug;
use vyvoz_core::VyvozError;

/// Base URL of the Sheets REST API.
pub const API_BASE_URL: &str = "https://sheets.googleapis.com";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange<'a> {
    major_dimension: &'static str,
    values: [&'a [String]; 1],
}

/// Subset of the append response the exporter logs.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendResponse {
    #[serde(default)]
    pub updates: Option<AppendUpdates>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendUpdates {
    #[serde(default)]
    pub updated_range: Option<String>,
    #[serde(default)]
    pub updated_rows: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    status: String,
    message: String,
}

/// Authenticated client bound to one spreadsheet.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    client: reqwest::Client,
    base_url: Url,
    spreadsheet_id: String,
}

impl SheetsClient {
    pub fn new(
        access_token: &str,
        spreadsheet_id: &str,
        api_base: &str,
    ) -> Result<Self, VyvozError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {access_token}"))
            .map_err(|e| VyvozError::Config(format!("invalid sheets access token: {e}")))?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| sheets_error("failed to build HTTP client", e))?;

        let base_url = Url::parse(api_base)
            .map_err(|e| VyvozError::Config(format!("invalid sheets.api_base {api_base}: {e}")))?;

        Ok(Self {
            client,
            base_url,
            spreadsheet_id: spreadsheet_id.to_string(),
        })
    }

    /// `{base}/v4/spreadsheets/{id}` followed by `extra` path segments.
    fn url(&self, extra: &[&str]) -> Result<Url, VyvozError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| VyvozError::Config("sheets.api_base cannot be a base URL".into()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str()])
            .extend(extra);
        Ok(url)
    }

    /// Appends one row after the last table row of `sheet`.
    ///
    /// Cells are written as plain strings (`RAW`): Sheets never turns a
    /// `+7...` phone into a number or evaluates text starting with `=`.
    pub async fn append_row(
        &self,
        sheet: &str,
        row: &[String],
    ) -> Result<AppendResponse, VyvozError> {
        let range = format!("{}:append", quote_sheet(sheet));
        let mut url = self.url(&["values", &range])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");

        let body = ValueRange {
            major_dimension: "ROWS",
            values: [row],
        };
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| sheets_error("HTTP request failed", e))?;

        let status = response.status();
        debug!(status = %status, sheet, "append response received");
        let text = response
            .text()
            .await
            .map_err(|e| sheets_error("failed to read response body", e))?;

        if !status.is_success() {
            return Err(VyvozError::sink("sheets", api_error_message(status, &text)));
        }
        Ok(serde_json::from_str(&text).unwrap_or_default())
    }

    /// Fetches only the spreadsheet id, to verify the token and the id.
    pub async fn probe(&self) -> Result<(), VyvozError> {
        let mut url = self.url(&[])?;
        url.query_pairs_mut().append_pair("fields", "spreadsheetId");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| sheets_error("HTTP request failed", e))?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let text = response.text().await.unwrap_or_default();
        Err(VyvozError::sink("sheets", api_error_message(status, &text)))
    }
}

/// A1 notation for a whole sheet; quotes are doubled inside the name.
fn quote_sheet(sheet: &str) -> String {
    format!("'{}'", sheet.replace('\'', "''"))
}

fn api_error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(err) => format!("Sheets API error {status} ({}): {}", err.error.status, err.error.message),
        Err(_) => format!("Sheets API returned {status}: {body}"),
    }
}

fn sheets_error(context: &str, e: reqwest::Error) -> VyvozError {
    VyvozError::Sink {
        sink: "sheets".into(),
        message: format!("{context}: {e}"),
        source: Some(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, header, method, path, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn row() -> Vec<String> {
        vec!["04.05.2026 12:30".into(), "Иванов Иван".into()]
    }

    #[test]
    fn sheet_names_are_quoted() {
        assert_eq!(quote_sheet("КГМ Зона 1"), "'КГМ Зона 1'");
        assert_eq!(quote_sheet("O'Brien"), "'O''Brien'");
    }

    #[test]
    fn url_keeps_base_path() {
        let client = SheetsClient::new("t", "abc", "http://localhost:9/proxy/").unwrap();
        assert_eq!(
            client.url(&["values"]).unwrap().as_str(),
            "http://localhost:9/proxy/v4/spreadsheets/abc/values"
        );
    }

    #[tokio::test]
    async fn append_posts_row_with_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"^/v4/spreadsheets/sheet-1/values/.+:append$"))
            .and(query_param("valueInputOption", "RAW"))
            .and(query_param("insertDataOption", "INSERT_ROWS"))
            .and(header("authorization", "Bearer secret"))
            .and(body_json(serde_json::json!({
                "majorDimension": "ROWS",
                "values": [["04.05.2026 12:30", "Иванов Иван"]]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "spreadsheetId": "sheet-1",
                "updates": {"updatedRange": "'КГМ Зона 1'!A5:B5", "updatedRows": 1}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = SheetsClient::new("secret", "sheet-1", &server.uri()).unwrap();
        let response = client.append_row("КГМ Зона 1", &row()).await.unwrap();
        let updates = response.updates.unwrap();
        assert_eq!(updates.updated_rows, Some(1));
    }

    #[tokio::test]
    async fn user_text_is_sent_verbatim_as_raw_cells() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(query_param("valueInputOption", "RAW"))
            .and(body_json(serde_json::json!({
                "majorDimension": "ROWS",
                "values": [["+79131234567", "=IMPORTXML(\"http://x\")", "ул. Мира, 10"]]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = SheetsClient::new("secret", "sheet-1", &server.uri()).unwrap();
        let row = vec![
            "+79131234567".to_string(),
            "=IMPORTXML(\"http://x\")".to_string(),
            "ул. Мира, 10".to_string(),
        ];
        client.append_row("КГМ Зона 2", &row).await.unwrap();
    }

    #[tokio::test]
    async fn api_error_is_reported_with_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "error": {"code": 403, "message": "The caller does not have permission", "status": "PERMISSION_DENIED"}
            })))
            .mount(&server)
            .await;

        let client = SheetsClient::new("secret", "sheet-1", &server.uri()).unwrap();
        let err = client.append_row("Жалобы Зона 2", &row()).await.unwrap_err();
        let text = err.to_string();
        assert!(text.starts_with("sheets error"), "got: {text}");
        assert!(text.contains("PERMISSION_DENIED"), "got: {text}");
    }

    #[tokio::test]
    async fn non_json_success_body_is_tolerated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let client = SheetsClient::new("secret", "sheet-1", &server.uri()).unwrap();
        let response = client.append_row("x", &row()).await.unwrap();
        assert!(response.updates.is_none());
    }

    #[tokio::test]
    async fn probe_checks_spreadsheet_access() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/spreadsheets/sheet-1"))
            .and(query_param("fields", "spreadsheetId"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "spreadsheetId": "sheet-1"
            })))
            .mount(&server)
            .await;

        let ok = SheetsClient::new("secret", "sheet-1", &server.uri()).unwrap();
        assert!(ok.probe().await.is_ok());
        let missing = SheetsClient::new("secret", "other", &server.uri()).unwrap();
        assert!(missing.probe().await.is_err());
    }
}
