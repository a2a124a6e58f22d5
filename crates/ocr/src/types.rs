use serde::{Deserialize, Serialize};

/// Sentinel used wherever best-effort extraction comes up empty.
pub const UNKNOWN: &str = "Unknown";

/// Monetary amount pulled out of OCR text.
///
/// `shorthand` is always derived from `numeric` by the tier rules in
/// `extract::amount_shorthand`; an unknown `full` carries an unknown
/// `shorthand` and no numeric value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedAmount {
    /// Currency-prefixed amount as matched (commas retained), or "Unknown".
    pub full: String,
    pub numeric: Option<f64>,
    /// Compact rendering for filenames ("N4.0k", "N9h", …), or "Unknown".
    pub shorthand: String,
}

impl ExtractedAmount {
    pub fn unknown() -> Self {
        Self { full: UNKNOWN.to_string(), numeric: None, shorthand: UNKNOWN.to_string() }
    }

    pub fn is_known(&self) -> bool {
        self.full != UNKNOWN
    }
}

/// Everything the field extractor produces for one receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFields {
    pub amount: ExtractedAmount,
    /// "-" for non-DR receipts, "Unknown" when DR parsing fails.
    pub sender_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_amount_is_consistent() {
        let a = ExtractedAmount::unknown();
        assert_eq!(a.full, "Unknown");
        assert_eq!(a.shorthand, "Unknown");
        assert!(a.numeric.is_none());
        assert!(!a.is_known());
    }

    #[test]
    fn known_amount_reports_known() {
        let a = ExtractedAmount {
            full: "N4,000".to_string(),
            numeric: Some(4000.0),
            shorthand: "N4.0k".to_string(),
        };
        assert!(a.is_known());
    }
}
