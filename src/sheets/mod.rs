pub mod client;
pub mod error;
pub mod publisher;
pub mod types;

pub use client::{SheetsClient, SheetsClientBuilder};
pub use publisher::SnapshotPublisher;

pub const DEFAULT_SHEETS_URL: &str = "https://sheets.googleapis.com/v4";
