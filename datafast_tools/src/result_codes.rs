//! Classification of OPPWA result codes.
//!
//! Result codes look like `000.100.110`. The gateway documents them in groups identified by prefix patterns; only the
//! group matters to us.
use std::fmt::Display;

use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCategory {
    /// The transaction was processed successfully.
    Success,
    /// Processed successfully, but the gateway recommends a manual review.
    SuccessNeedsReview,
    /// Still in progress. Poll again later.
    Pending,
    /// Rejected by the bank, risk checks, validation or the gateway itself.
    Rejected,
    /// Not a code we recognise.
    Unknown,
}

impl Display for ResultCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultCategory::Success => write!(f, "success"),
            ResultCategory::SuccessNeedsReview => write!(f, "success (review)"),
            ResultCategory::Pending => write!(f, "pending"),
            ResultCategory::Rejected => write!(f, "rejected"),
            ResultCategory::Unknown => write!(f, "unknown"),
        }
    }
}

fn pattern(p: &str) -> Regex {
    Regex::new(p).expect("valid result code pattern")
}

static SUCCESS: Lazy<Regex> = Lazy::new(|| pattern(r"^(000\.000\.|000\.100\.1|000\.[36]|000\.400\.1[12]0)"));
static SUCCESS_REVIEW: Lazy<Regex> = Lazy::new(|| pattern(r"^(000\.400\.0[^3]|000\.400\.100)"));
static PENDING: Lazy<Regex> = Lazy::new(|| pattern(r"^(000\.200|800\.400\.5|100\.400\.500)"));
static REJECTED: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // 3D secure and intercard risk checks
        r"^(000\.400\.[1][0-9][1-9]|000\.400\.2)",
        // External bank or payment system
        r"^(800\.[17]00|800\.800\.[123])",
        // Communication errors
        r"^(900\.[1234]00|000\.400\.030)",
        // System errors
        r"^(800\.[56]|999\.|600\.1|800\.800\.[84])",
        // Asynchronous workflow errors
        r"^(100\.39[765])",
        r"^(300\.100\.100)",
        // External risk systems
        r"^(100\.400\.[0-3]|100\.38|100\.370\.100|100\.370\.11)",
        r"^(800\.400\.1)",
        r"^(800\.400\.2|100\.390)",
        // Blacklists and risk validation
        r"^(100\.100\.701|800\.[32])",
        r"^(800\.1[123456]0)",
        // Configuration validation
        r"^(600\.[23]|500\.[12]|800\.121)",
        // Registration, job and reference validation
        r"^(100\.[13]50)",
        r"^(100\.250|100\.360)",
        r"^(700\.[1345][05]0)",
        // Format, address, contact, account and amount validation
        r"^(200\.[123]|100\.[53][07]|800\.900|100\.[69]00\.500)",
        r"^(100\.800)",
        r"^(100\.700|100\.900\.[123467890][0-9]{2})",
        r"^(100\.100|100\.2[01])",
        r"^(100\.55)",
        // Chargebacks
        r"^(000\.100\.2)",
    ]
    .into_iter()
    .map(pattern)
    .collect()
});

pub fn classify_result_code(code: &str) -> ResultCategory {
    let code = code.trim();
    if SUCCESS.is_match(code) {
        ResultCategory::Success
    } else if SUCCESS_REVIEW.is_match(code) {
        ResultCategory::SuccessNeedsReview
    } else if PENDING.is_match(code) {
        ResultCategory::Pending
    } else if REJECTED.iter().any(|r| r.is_match(code)) {
        ResultCategory::Rejected
    } else {
        ResultCategory::Unknown
    }
}
