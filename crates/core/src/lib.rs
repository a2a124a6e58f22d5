pub mod config;
pub mod naming;
pub mod types;

pub use config::{Config, ConfigError, OcrConfig};
pub use naming::{date_for_log, receipt_filename};
pub use types::{ReceiptRecord, ReceiptType};
