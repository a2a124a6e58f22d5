use std::sync::OnceLock;

use regex::Regex;

use driverlog_core::ReceiptType;

use crate::types::{ExtractedAmount, ExtractedFields, UNKNOWN};

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

// Optional naira marker, then 1–3 leading digits followed by 3-digit groups
// with an optional space/comma separator, then an optional 1–2 digit decimal.
// Only the numeric token is captured; a 4–5 digit run without separators
// matches just its first three digits.
re!(re_amount, r"(?:[₦N]\s?)?(\d{1,3}(?:[\s,]?\d{3})*(?:\.\d{1,2})?)");

re!(re_sender_inline, r"Sender Details\s*(.+)");

/// Line marker that precedes (or contains) the sender name on DR receipts.
const SENDER_MARKER: &str = "Sender Details";

/// Name placeholder for receipt types that carry no sender block.
const NO_NAME: &str = "-";

// ── Public extraction API ─────────────────────────────────────────────────────

pub struct Extractor;

impl Extractor {
    /// Extract the amount and (for DR receipts) the sender name from raw
    /// OCR text. Both fields degrade to sentinels rather than failing.
    pub fn extract(ocr_text: &str, receipt_type: ReceiptType) -> ExtractedFields {
        let amount = Self::extract_amount(ocr_text);
        let sender_name = match receipt_type {
            ReceiptType::DrReceipt => Self::extract_sender_name(ocr_text),
            ReceiptType::AaConf => NO_NAME.to_string(),
        };
        ExtractedFields { amount, sender_name }
    }

    // ── Amount ────────────────────────────────────────────────────────────────

    /// First numeric token in the text, naira-prefixed, with the compact
    /// shorthand derived from its value.
    pub fn extract_amount(text: &str) -> ExtractedAmount {
        let Some(caps) = re_amount().captures(text) else {
            return ExtractedAmount::unknown();
        };
        let Some(token) = caps.get(1) else {
            return ExtractedAmount::unknown();
        };

        // Literal spaces are dropped from the display form; commas stay.
        let full_token = token.as_str().replace(' ', "");
        let digits: String = full_token
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ',')
            .collect();
        let Ok(value) = digits.parse::<f64>() else {
            return ExtractedAmount::unknown();
        };

        ExtractedAmount {
            full: format!("N{full_token}"),
            numeric: Some(value),
            shorthand: amount_shorthand(value),
        }
    }

    // ── Sender name ───────────────────────────────────────────────────────────

    /// Scan for the first "Sender Details" line. The name is accepted from
    /// the marker line itself or from the line directly below it, whichever
    /// first holds at least two tokens. Only that first occurrence is ever
    /// consulted; if both checks fail the name is "Unknown".
    fn extract_sender_name(text: &str) -> String {
        let lines: Vec<&str> = text.lines().collect();
        for (i, line) in lines.iter().enumerate() {
            if !line.contains(SENDER_MARKER) {
                continue;
            }
            if let Some(rest) = re_sender_inline().captures(line).and_then(|c| c.get(1)) {
                let candidate = rest.as_str().trim();
                if candidate.split_whitespace().count() >= 2 {
                    return title_case(candidate);
                }
            }
            if let Some(next) = lines.get(i + 1) {
                let candidate = next.trim();
                if candidate.split_whitespace().count() >= 2 {
                    return title_case(candidate);
                }
            }
            break;
        }
        UNKNOWN.to_string()
    }
}

/// Compact amount rendering used in filenames.
///
/// Both tiers at and above 10_000 render as whole-number thousands; only the
/// 1_000..10_000 band keeps one decimal place.
fn amount_shorthand(value: f64) -> String {
    if value >= 1000.0 {
        if value >= 100_000.0 {
            format!("N{}k", (value / 1000.0) as i64)
        } else if value >= 10_000.0 {
            format!("N{}k", (value / 1000.0) as i64)
        } else {
            format!("N{:.1}k", value / 1000.0)
        }
    } else if value >= 100.0 {
        format!("N{}h", (value / 100.0) as i64)
    } else {
        format!("N{}", value as i64)
    }
}

/// Uppercase the first character of every whitespace-separated token and
/// lowercase the rest; tokens are re-joined with single spaces.
fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Amount ────────────────────────────────────────────────────────────────

    #[test]
    fn amount_unknown_when_no_digits() {
        let a = Extractor::extract_amount("no numbers on this receipt");
        assert_eq!(a.full, "Unknown");
        assert_eq!(a.shorthand, "Unknown");
        assert!(a.numeric.is_none());
    }

    #[test]
    fn amount_with_naira_sign_and_commas() {
        let a = Extractor::extract_amount("Transfer of ₦4,000.50 completed");
        assert_eq!(a.full, "N4,000.50");
        assert_eq!(a.numeric, Some(4000.5));
        assert_eq!(a.shorthand, "N4.0k");
    }

    #[test]
    fn amount_space_separated_thousands_collapse() {
        let a = Extractor::extract_amount("N 1 500 received");
        assert_eq!(a.full, "N1500");
        assert_eq!(a.numeric, Some(1500.0));
        assert_eq!(a.shorthand, "N1.5k");
    }

    #[test]
    fn amount_marker_is_optional() {
        let a = Extractor::extract_amount("paid 250 cash");
        assert_eq!(a.full, "N250");
        assert_eq!(a.shorthand, "N2h");
    }

    #[test]
    fn amount_first_numeric_token_wins() {
        // Any leading digit run is taken, even when a marked amount follows.
        let a = Extractor::extract_amount("Ref 12 for N5,000");
        assert_eq!(a.full, "N12");
        assert_eq!(a.shorthand, "N12");
    }

    #[test]
    fn amount_four_digit_run_without_separator_truncates() {
        // 1234 has no separator, so only the leading three digits match.
        let a = Extractor::extract_amount("1234");
        assert_eq!(a.full, "N123");
        assert_eq!(a.numeric, Some(123.0));
    }

    #[test]
    fn amount_six_digit_run_groups_cleanly() {
        let a = Extractor::extract_amount("123456");
        assert_eq!(a.full, "N123456");
        assert_eq!(a.shorthand, "N123k");
    }

    #[test]
    fn amount_small_decimal_keeps_cents_in_full() {
        let a = Extractor::extract_amount("N99.99");
        assert_eq!(a.full, "N99.99");
        assert_eq!(a.shorthand, "N99");
    }

    // ── Shorthand tiers ───────────────────────────────────────────────────────

    #[test]
    fn shorthand_below_one_hundred_truncates_units() {
        assert_eq!(amount_shorthand(50.0), "N50");
        assert_eq!(amount_shorthand(99.99), "N99");
    }

    #[test]
    fn shorthand_hundreds_band() {
        assert_eq!(amount_shorthand(150.0), "N1h");
        assert_eq!(amount_shorthand(999.0), "N9h");
    }

    #[test]
    fn shorthand_low_thousands_keep_one_decimal() {
        assert_eq!(amount_shorthand(1000.0), "N1.0k");
        assert_eq!(amount_shorthand(1500.0), "N1.5k");
        assert_eq!(amount_shorthand(9999.0), "N10.0k");
    }

    #[test]
    fn shorthand_ten_thousands_drop_the_decimal() {
        assert_eq!(amount_shorthand(10_000.0), "N10k");
        assert_eq!(amount_shorthand(99_999.0), "N99k");
    }

    #[test]
    fn shorthand_hundred_thousands_match_the_tier_below() {
        // The top two tiers are distinct branches with identical output.
        assert_eq!(amount_shorthand(100_000.0), "N100k");
        assert_eq!(amount_shorthand(150_000.0), "N150k");
    }

    // ── Sender name ───────────────────────────────────────────────────────────

    #[test]
    fn name_inline_after_marker() {
        let text = "Transaction OK\nSender Details John Michael Doe\nNext Line Person";
        let f = Extractor::extract(text, ReceiptType::DrReceipt);
        // Inline hit wins; the following line is never consulted.
        assert_eq!(f.sender_name, "John Michael Doe");
    }

    #[test]
    fn name_is_title_cased() {
        let text = "Sender Details JOHN DOE";
        let f = Extractor::extract(text, ReceiptType::DrReceipt);
        assert_eq!(f.sender_name, "John Doe");
    }

    #[test]
    fn name_taken_from_next_line_when_marker_stands_alone() {
        let text = "Sender Details\njane ann smith\nmore text";
        let f = Extractor::extract(text, ReceiptType::DrReceipt);
        assert_eq!(f.sender_name, "Jane Ann Smith");
    }

    #[test]
    fn name_single_inline_token_falls_through_to_next_line() {
        let text = "Sender Details John\nMary Jane Watson";
        let f = Extractor::extract(text, ReceiptType::DrReceipt);
        assert_eq!(f.sender_name, "Mary Jane Watson");
    }

    #[test]
    fn name_unknown_when_first_marker_occurrence_fails() {
        // A later, matchable occurrence exists but scanning stops after the
        // first one.
        let text = "Sender Details\nX\nSender Details Good Name";
        let f = Extractor::extract(text, ReceiptType::DrReceipt);
        assert_eq!(f.sender_name, "Unknown");
    }

    #[test]
    fn name_unknown_without_marker() {
        let f = Extractor::extract("just an amount N2,000", ReceiptType::DrReceipt);
        assert_eq!(f.sender_name, "Unknown");
    }

    #[test]
    fn name_dash_for_aa_conf_even_with_marker_present() {
        let text = "Sender Details John Doe\nN4,000";
        let f = Extractor::extract(text, ReceiptType::AaConf);
        assert_eq!(f.sender_name, "-");
    }

    #[test]
    fn empty_text_degrades_everywhere() {
        let f = Extractor::extract("", ReceiptType::DrReceipt);
        assert_eq!(f.amount.full, "Unknown");
        assert_eq!(f.sender_name, "Unknown");
    }

    // ── title_case ────────────────────────────────────────────────────────────

    #[test]
    fn title_case_per_whitespace_token() {
        assert_eq!(title_case("john doe"), "John Doe");
        assert_eq!(title_case("  spaced   out  "), "Spaced Out");
        assert_eq!(title_case("MIXED cAsE here"), "Mixed Case Here");
    }

    #[test]
    fn title_case_leaves_inner_punctuation_alone() {
        assert_eq!(title_case("mary-jane o'hara"), "Mary-jane O'hara");
    }
}
