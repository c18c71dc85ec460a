//! Google Sheets v4 REST client for a single worksheet.

use std::sync::Arc;

use async_trait::async_trait;
use models::columns::{quote_sheet_title, row_range, whole_column, whole_row};
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

use super::token::TokenSource;
use super::SheetClient;
use crate::errors::ServiceError;

pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

fn cell_text(v: Value) -> String {
    match v {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Handle on one worksheet of one spreadsheet. Opened once, shared by all requests.
pub struct GoogleSheetsClient {
    http: reqwest::Client,
    tokens: Arc<dyn TokenSource>,
    api_base: Url,
    spreadsheet_id: String,
    worksheet: String,
    sheet_id: i64,
}

impl GoogleSheetsClient {
    /// Open `worksheet` inside `spreadsheet_id`, resolving its numeric sheet id.
    #[instrument(skip(http, tokens))]
    pub async fn open(
        http: reqwest::Client,
        tokens: Arc<dyn TokenSource>,
        api_base: &str,
        spreadsheet_id: &str,
        worksheet: &str,
    ) -> Result<Self, ServiceError> {
        let api_base = Url::parse(api_base)
            .map_err(|e| ServiceError::Configuration(format!("invalid api base {api_base:?}: {e}")))?;
        let mut client = Self {
            http,
            tokens,
            api_base,
            spreadsheet_id: spreadsheet_id.to_string(),
            worksheet: worksheet.to_string(),
            sheet_id: 0,
        };

        let mut url = client.url(&["v4", "spreadsheets", spreadsheet_id])?;
        url.query_pairs_mut().append_pair("fields", "sheets.properties(sheetId,title)");
        let meta: SpreadsheetMeta = client.send(client.http.get(url)).await?;
        let entry = meta
            .sheets
            .into_iter()
            .find(|s| s.properties.title == worksheet)
            .ok_or_else(|| ServiceError::Configuration(format!("worksheet {worksheet:?} not found in spreadsheet")))?;
        client.sheet_id = entry.properties.sheet_id;
        info!(sheet_id = client.sheet_id, "worksheet_opened");
        Ok(client)
    }

    pub fn sheet_id(&self) -> i64 {
        self.sheet_id
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ServiceError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| ServiceError::Configuration(format!("api base {} cannot carry a path", self.api_base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn values_url(&self, range: &str) -> Result<Url, ServiceError> {
        self.url(&["v4", "spreadsheets", self.spreadsheet_id.as_str(), "values", range])
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ServiceError> {
        let token = self.tokens.access_token().await?;
        let resp = req.bearer_auth(token).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Sheet(format!("{status}: {body}")));
        }
        Ok(resp.json::<T>().await?)
    }

    async fn get_values(&self, range: &str, major_dimension: &str) -> Result<Vec<Vec<String>>, ServiceError> {
        let mut url = self.values_url(range)?;
        url.query_pairs_mut().append_pair("majorDimension", major_dimension);
        let vr: ValueRange = self.send(self.http.get(url)).await?;
        debug!(%range, rows = vr.values.len(), "values_read");
        Ok(vr
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }
}

#[async_trait]
impl SheetClient for GoogleSheetsClient {
    async fn row_values(&self, row: usize) -> Result<Vec<String>, ServiceError> {
        let range = whole_row(&self.worksheet, row);
        Ok(self.get_values(&range, "ROWS").await?.into_iter().next().unwrap_or_default())
    }

    async fn col_values(&self, col: usize) -> Result<Vec<String>, ServiceError> {
        let range = whole_column(&self.worksheet, col);
        Ok(self.get_values(&range, "COLUMNS").await?.into_iter().next().unwrap_or_default())
    }

    async fn append_row(&self, values: Vec<String>) -> Result<(), ServiceError> {
        let range = quote_sheet_title(&self.worksheet);
        let mut url = self.values_url(&format!("{range}:append"))?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        let body = json!({ "majorDimension": "ROWS", "values": [values] });
        let _: Value = self.send(self.http.post(url).json(&body)).await?;
        Ok(())
    }

    async fn update_row(&self, row: usize, first_col: usize, values: Vec<String>) -> Result<(), ServiceError> {
        if values.is_empty() {
            return Ok(());
        }
        let last_col = first_col + values.len() - 1;
        let range = row_range(&self.worksheet, row, first_col, last_col);
        let mut url = self.values_url(&range)?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        let body = json!({ "range": range, "majorDimension": "ROWS", "values": [values] });
        let _: Value = self.send(self.http.put(url).json(&body)).await?;
        Ok(())
    }

    async fn delete_row(&self, row: usize) -> Result<(), ServiceError> {
        if row == 0 {
            return Err(ServiceError::Validation("row index is 1-based".into()));
        }
        let target = format!("{}:batchUpdate", self.spreadsheet_id);
        let url = self.url(&["v4", "spreadsheets", target.as_str()])?;
        let body = json!({
            "requests": [{
                "deleteDimension": {
                    "range": {
                        "sheetId": self.sheet_id,
                        "dimension": "ROWS",
                        "startIndex": row - 1,
                        "endIndex": row,
                    }
                }
            }]
        });
        let _: Value = self.send(self.http.post(url).json(&body)).await?;
        Ok(())
    }

    /// Rows are padded with empty cells to the widest row, matching the grid as displayed.
    async fn all_values(&self) -> Result<Vec<Vec<String>>, ServiceError> {
        let range = quote_sheet_title(&self.worksheet);
        let mut rows = self.get_values(&range, "ROWS").await?;
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in rows.iter_mut() {
            row.resize(width, String::new());
        }
        Ok(rows)
    }
}
