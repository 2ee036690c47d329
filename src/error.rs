use crate::sheets::error::SheetsError;
use crate::storage::StoreError;
use crate::wbseller::error::WbSellerError;
use std::io::Error as StdIoError;
use std::result::Result as StdResult;
use thiserror::Error as ThisError;
use toml::de::Error as TomlDeError;

pub type Result<T> = StdResult<T, Error>;

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("StdIoError: {0:?}")]
    StdIo(#[from] StdIoError),

    #[error("WbSellerError: {0:?}")]
    WbSeller(#[from] WbSellerError),

    #[error("StoreError: {0:?}")]
    Store(#[from] StoreError),

    #[error("SheetsError: {0:?}")]
    Sheets(#[from] SheetsError),

    #[error("TomlDeError: {0:?}")]
    TomlDe(#[from] TomlDeError),

    #[error("ConfigError: {0}")]
    Config(String),

    #[error("InvalidDateKey: {0:?}")]
    InvalidDateKey(String),

    #[error("SchedulerError: {0}")]
    Scheduler(String),
}
