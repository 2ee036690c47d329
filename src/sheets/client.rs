use reqwest::{Client, RequestBuilder, Url};
use serde_json::Value;
use std::time::Duration;

use crate::sheets::{
    DEFAULT_SHEETS_URL,
    error::{Result, SheetsError},
    types::{AddSheetRequest, BatchUpdateRequest, GridProperties, Request, SheetProperties, ValueRange},
};

/// Клиент Google Sheets API v4
#[derive(Debug, Clone)]
pub struct SheetsClient {
    client: Client,
    base_url: Url,
    access_token: String,
}

pub struct SheetsClientBuilder {
    base_url: String,
    access_token: String,
    timeout: Duration,
}

impl SheetsClientBuilder {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_SHEETS_URL.to_string(),
            access_token: access_token.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = duration;
        self
    }

    pub fn build(self) -> Result<SheetsClient> {
        let base_url = Url::parse(&self.base_url)
            .map_err(|e| SheetsError::Custom(format!("invalid base url {}: {e}", self.base_url)))?;
        let client = Client::builder().timeout(self.timeout).build()?;

        Ok(SheetsClient {
            client,
            base_url,
            access_token: self.access_token,
        })
    }
}

/// Диапазон A1 с названием листа в кавычках
pub fn a1_range(sheet_title: &str, cell: &str) -> String {
    format!("'{}'!{}", sheet_title.replace('\'', "''"), cell)
}

impl SheetsClient {
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SheetsError::Custom(format!("base url {} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send_request(&self, builder: RequestBuilder) -> Result<()> {
        let response = builder.bearer_auth(&self.access_token).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SheetsError::from_status(status, body));
        }

        Ok(())
    }

    /// Добавление листа с заданным названием и размером сетки
    pub async fn add_sheet(
        &self,
        spreadsheet_id: &str,
        title: &str,
        row_count: u32,
        column_count: u32,
    ) -> Result<()> {
        let target = format!("{spreadsheet_id}:batchUpdate");
        let url = self.url(&["spreadsheets", target.as_str()])?;

        let payload = BatchUpdateRequest {
            requests: vec![Request {
                add_sheet: AddSheetRequest {
                    properties: SheetProperties {
                        title: title.to_string(),
                        grid_properties: GridProperties {
                            row_count,
                            column_count,
                        },
                    },
                },
            }],
        };

        self.send_request(self.client.post(url).json(&payload)).await
    }

    /// Запись прямоугольного блока значений, начиная с `range`
    pub async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<Value>>,
    ) -> Result<()> {
        let url = self.url(&["spreadsheets", spreadsheet_id, "values", range])?;

        let payload = ValueRange {
            range: range.to_string(),
            major_dimension: "ROWS".to_string(),
            values,
        };

        let builder = self
            .client
            .put(url)
            .query(&[("valueInputOption", "RAW")])
            .json(&payload);

        self.send_request(builder).await
    }
}
