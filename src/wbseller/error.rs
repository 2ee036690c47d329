use reqwest::{Error as ReqwestError, StatusCode};
use serde_json::Error as SerdeJsonError;
use std::result::Result as StdResult;
use thiserror::Error;

use crate::retry::RateLimited;

pub type Result<T> = StdResult<T, WbSellerError>;

#[derive(Error, Debug)]
pub enum WbSellerError {
    #[error("ReqwestError: {0:?}")]
    Reqwest(#[from] ReqwestError),

    #[error("RateLimited: {0}")]
    RateLimited(String),

    #[error("ClientError {status}: {body}")]
    Client { status: u16, body: String },

    #[error("ServerError {status}: {body}")]
    Server { status: u16, body: String },

    #[error("SerdeJsonError: {0:?}")]
    SerdeJson(#[from] SerdeJsonError),

    #[error("InvalidToken: {0}")]
    InvalidToken(String),
}

impl WbSellerError {
    /// Классификация неуспешного HTTP-ответа
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited(body),
            s if s.is_client_error() => Self::Client {
                status: s.as_u16(),
                body,
            },
            s => Self::Server {
                status: s.as_u16(),
                body,
            },
        }
    }

    /// HTTP-статус ответа, если ошибка пришла от сервера
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RateLimited(_) => Some(StatusCode::TOO_MANY_REQUESTS.as_u16()),
            Self::Client { status, .. } | Self::Server { status, .. } => Some(*status),
            Self::Reqwest(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl RateLimited for WbSellerError {
    fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }
}
