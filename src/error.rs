// src/error.rs

use thiserror::Error;

/// Everything that can go wrong between a user action and the venue.
/// Each variant maps to a distinct user-facing report; none are fatal
/// to the running process.
#[derive(Error, Debug)]
pub enum TradeError {
    /// Spot price could not be obtained from the market-data endpoint.
    #[error("spot price unavailable for {0}")]
    NoQuote(String),

    /// The selected series has no published strike ladder (unknown or
    /// already expired).
    #[error("no option series listed for expiry {0}")]
    InvalidExpiry(String),

    /// The venue accepted the request transport-wise but declined it.
    #[error("exchange rejected the request: {code}{}", .context.as_deref().map(|c| format!(": {c}")).unwrap_or_default())]
    ExchangeRejected {
        code: String,
        context: Option<String>,
    },

    /// Network-level failure talking to the exchange (DNS, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The exchange answered with a payload we could not make sense of.
    #[error("unexpected exchange payload: {0}")]
    Decode(String),
}

impl TradeError {
    pub fn rejected(code: impl Into<String>, context: Option<String>) -> Self {
        Self::ExchangeRejected { code: code.into(), context }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_display_carries_venue_reason() {
        let err = TradeError::rejected("insufficient_margin", Some("margin required 42.5".into()));
        let text = err.to_string();
        assert!(text.contains("insufficient_margin"));
        assert!(text.contains("margin required 42.5"));

        let bare = TradeError::rejected("bad_request", None);
        assert_eq!(bare.to_string(), "exchange rejected the request: bad_request");
    }
}
