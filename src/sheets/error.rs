use reqwest::{Error as ReqwestError, StatusCode};
use std::result::Result as StdResult;
use thiserror::Error;

use crate::retry::RateLimited;

pub type Result<T> = StdResult<T, SheetsError>;

#[derive(Error, Debug)]
pub enum SheetsError {
    #[error("ReqwestError: {0:?}")]
    Reqwest(#[from] ReqwestError),

    #[error("RateLimited: {0}")]
    RateLimited(String),

    #[error("ClientError {status}: {body}")]
    Client { status: u16, body: String },

    #[error("ServerError {status}: {body}")]
    Server { status: u16, body: String },

    #[error("{0}")]
    Custom(String),
}

impl SheetsError {
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
}

impl RateLimited for SheetsError {
    fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }
}
