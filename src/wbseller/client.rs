use reqwest::{
    RequestBuilder,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use std::time::Duration;
use tracing::debug;

use crate::wbseller::models::{TariffSnapshot, TariffsBoxResponse};

use super::error::{Result, WbSellerError};

pub const DEFAULT_TARIFFS_URL: &str = "https://common-api.wildberries.ru/api/v1/tariffs/box";

/// HTTP-клиент API тарифов Wildberries
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    url: String,
    headers: HeaderMap,
}

impl Client {
    /// Создание клиента с bearer-токеном
    pub fn new(url: impl Into<String>, token: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();

        let auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| WbSellerError::InvalidToken(e.to_string()))?;
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            url: url.into(),
            headers,
        })
    }

    /// Отправка HTTP-запроса и получение тела ответа.
    /// Неуспешный статус превращается в типизированную ошибку
    async fn send_request(&self, builder: RequestBuilder) -> Result<String> {
        let response = builder.headers(self.headers.clone()).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(WbSellerError::from_status(status, body));
        }

        Ok(body)
    }

    /// Получение тарифов коробов на дату `YYYY-MM-DD`.
    /// Пустое тело ответа означает, что сохранять нечего
    pub async fn fetch_tariffs(&self, date: &str) -> Result<Option<TariffSnapshot>> {
        let builder = self.http.get(&self.url).query(&[("date", date)]);

        let body = self.send_request(builder).await?;

        if body.trim().is_empty() {
            debug!(date, "Пустой ответ API тарифов");
            return Ok(None);
        }

        let parsed = serde_json::from_str::<TariffsBoxResponse>(&body)?;

        Ok(Some(parsed.into()))
    }
}
