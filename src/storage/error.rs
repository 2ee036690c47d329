use sqlx::{Error as SqlxError, migrate::MigrateError};
use std::result::Result as StdResult;
use thiserror::Error;

pub type Result<T> = StdResult<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SqlxError: {0:?}")]
    Sqlx(#[from] SqlxError),

    #[error("MigrateError: {0:?}")]
    Migrate(#[from] MigrateError),

    #[error("{0}")]
    Custom(String),
}
