use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::naming::date_for_log;

/// The two kinds of receipt the system accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptType {
    DrReceipt,
    AaConf,
}

impl ReceiptType {
    /// Subdirectory under the upload folder where files of this type land.
    pub fn subdir(self) -> &'static str {
        match self {
            ReceiptType::DrReceipt => "DR_receipts",
            ReceiptType::AaConf => "AA_conf",
        }
    }
}

impl std::fmt::Display for ReceiptType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReceiptType::DrReceipt => write!(f, "DR receipt"),
            ReceiptType::AaConf => write!(f, "AA conf"),
        }
    }
}

impl std::str::FromStr for ReceiptType {
    type Err = UnknownReceiptType;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dr receipt" | "dr-receipt" | "dr" => Ok(ReceiptType::DrReceipt),
            "aa conf" | "aa-conf" | "aa" => Ok(ReceiptType::AaConf),
            other => Err(UnknownReceiptType(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown receipt type: '{0}'")]
pub struct UnknownReceiptType(String);

/// One row of the persistent log. Field names map directly onto the CSV
/// header columns; the struct is built once per successful run and never
/// mutated afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptRecord {
    #[serde(rename = "Driver ID")]
    pub driver_id: String,
    #[serde(rename = "Driver Name")]
    pub driver_name: String,
    #[serde(rename = "Amount")]
    pub amount: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Receipt Type")]
    pub receipt_type: String,
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
}

impl ReceiptRecord {
    /// Assemble a log row from the extracted fields and the caller-supplied
    /// metadata. `logged_at` is the moment the run completed.
    pub fn new(
        driver_id: impl Into<String>,
        driver_name: impl Into<String>,
        amount: impl Into<String>,
        transaction_date: NaiveDate,
        receipt_type: ReceiptType,
        logged_at: DateTime<Local>,
    ) -> Self {
        Self {
            driver_id: driver_id.into(),
            driver_name: driver_name.into(),
            amount: amount.into(),
            date: date_for_log(transaction_date),
            receipt_type: receipt_type.to_string(),
            timestamp: logged_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}
