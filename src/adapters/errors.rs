//! Exchange adapter error types
//!
//! All exchange-related errors are wrapped in the `ExchangeError` enum.
//! Vendor error payloads are classified into it through an `ErrorTable`:
//! exact code/message matches are consulted before broad substring matches.

use thiserror::Error;

/// Exchange-specific error types for adapter operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    /// Missing or rejected credentials
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// Credentials valid but not allowed to perform the call
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Account frozen or suspended by the venue
    #[error("Account suspended: {0}")]
    AccountSuspended(String),

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    /// Order rejected for violating venue rules (tick, size, tif...)
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    /// Malformed request (bad parameter, unknown route)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Unknown or unsupported market identifier
    #[error("Bad symbol: {0}")]
    BadSymbol(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Venue is in a scheduled maintenance window
    #[error("On maintenance: {0}")]
    OnMaintenance(String),

    /// Venue temporarily unreachable (5xx, gateway)
    #[error("Exchange not available: {0}")]
    ExchangeNotAvailable(String),

    /// Operation or route not offered by this adapter
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// Client-side pre-validation failure, raised before any network call
    #[error("Arguments required: {0}")]
    ArgumentsRequired(String),

    #[error("Invalid nonce: {0}")]
    InvalidNonce(String),

    #[error("Request timeout: {0}")]
    RequestTimeout(String),

    /// Venue refused the operation in its current state (limits, permissions)
    #[error("Operation rejected: {0}")]
    OperationRejected(String),

    /// Venue accepted the call but could not complete it
    #[error("Operation failed: {0}")]
    OperationFailed(String),

    /// Venue-side network or server fault
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Connection to exchange failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Invalid or unexpected response from exchange
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Catch-all carrying the raw vendor body for diagnostics
    #[error("Exchange error: {0}")]
    Exchange(String),
}

/// Result type alias for exchange operations
pub type ExchangeResult<T> = std::result::Result<T, ExchangeError>;

// =============================================================================
// Classification tables
// =============================================================================

/// Taxonomy member selected by an error table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Authentication,
    PermissionDenied,
    AccountSuspended,
    InsufficientFunds,
    InvalidOrder,
    BadRequest,
    BadSymbol,
    OrderNotFound,
    RateLimitExceeded,
    OnMaintenance,
    ExchangeNotAvailable,
    NotSupported,
    InvalidNonce,
    RequestTimeout,
    OperationRejected,
    OperationFailed,
    NetworkError,
    Exchange,
}

impl ErrorKind {
    /// Build the concrete error carrying `feedback`
    pub fn into_error(self, feedback: impl Into<String>) -> ExchangeError {
        let feedback = feedback.into();
        match self {
            ErrorKind::Authentication => ExchangeError::AuthenticationError(feedback),
            ErrorKind::PermissionDenied => ExchangeError::PermissionDenied(feedback),
            ErrorKind::AccountSuspended => ExchangeError::AccountSuspended(feedback),
            ErrorKind::InsufficientFunds => ExchangeError::InsufficientFunds(feedback),
            ErrorKind::InvalidOrder => ExchangeError::InvalidOrder(feedback),
            ErrorKind::BadRequest => ExchangeError::BadRequest(feedback),
            ErrorKind::BadSymbol => ExchangeError::BadSymbol(feedback),
            ErrorKind::OrderNotFound => ExchangeError::OrderNotFound(feedback),
            ErrorKind::RateLimitExceeded => ExchangeError::RateLimitExceeded(feedback),
            ErrorKind::OnMaintenance => ExchangeError::OnMaintenance(feedback),
            ErrorKind::ExchangeNotAvailable => ExchangeError::ExchangeNotAvailable(feedback),
            ErrorKind::NotSupported => ExchangeError::NotSupported(feedback),
            ErrorKind::InvalidNonce => ExchangeError::InvalidNonce(feedback),
            ErrorKind::RequestTimeout => ExchangeError::RequestTimeout(feedback),
            ErrorKind::OperationRejected => ExchangeError::OperationRejected(feedback),
            ErrorKind::OperationFailed => ExchangeError::OperationFailed(feedback),
            ErrorKind::NetworkError => ExchangeError::NetworkError(feedback),
            ErrorKind::Exchange => ExchangeError::Exchange(feedback),
        }
    }
}

/// Per-exchange vendor error lookup.
///
/// `exact` keys are compared for equality against vendor codes and messages,
/// `broad` keys are searched for as substrings of the vendor message, in
/// declaration order.
#[derive(Debug, Clone, Copy)]
pub struct ErrorTable {
    pub exact: &'static [(&'static str, ErrorKind)],
    pub broad: &'static [(&'static str, ErrorKind)],
}

impl ErrorTable {
    pub const EMPTY: ErrorTable = ErrorTable { exact: &[], broad: &[] };

    pub fn exact_match(&self, key: &str) -> Option<ErrorKind> {
        self.exact
            .iter()
            .find(|(candidate, _)| *candidate == key)
            .map(|(_, kind)| *kind)
    }

    pub fn broad_match(&self, message: &str) -> Option<ErrorKind> {
        self.broad
            .iter()
            .find(|(needle, _)| message.contains(needle))
            .map(|(_, kind)| *kind)
    }

    /// Classify a vendor error.
    ///
    /// Every key in `exact_keys` (codes first, then the message) is tried
    /// against the exact table before the message is tried against the broad
    /// table. Unmatched errors become `ExchangeError::Exchange(feedback)`.
    pub fn classify(&self, exact_keys: &[&str], message: &str, feedback: &str) -> ExchangeError {
        let kind = exact_keys
            .iter()
            .filter(|key| !key.is_empty())
            .find_map(|key| self.exact_match(key))
            .or_else(|| {
                if message.is_empty() {
                    None
                } else {
                    self.broad_match(message)
                }
            });
        match kind {
            Some(kind) => kind.into_error(feedback),
            None => ExchangeError::Exchange(feedback.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TABLE: ErrorTable = ErrorTable {
        exact: &[
            ("429", ErrorKind::RateLimitExceeded),
            ("ORDER_NOT_FOUND", ErrorKind::OrderNotFound),
        ],
        broad: &[
            ("ORDER_NOT_FOUND", ErrorKind::InvalidOrder),
            ("INSUFFICIENT", ErrorKind::InsufficientFunds),
        ],
    };

    #[test]
    fn test_display_carries_feedback() {
        let err = ExchangeError::Exchange("pacifica {\"error\":\"boom\"}".to_string());
        assert_eq!(err.to_string(), "Exchange error: pacifica {\"error\":\"boom\"}");
    }

    #[test]
    fn test_exact_wins_over_broad() {
        let err = TABLE.classify(&["ORDER_NOT_FOUND"], "ORDER_NOT_FOUND", "x");
        assert_eq!(err, ExchangeError::OrderNotFound("x".into()));
    }

    #[test]
    fn test_exact_code_wins_over_broad_message() {
        let err = TABLE.classify(&["429", "INSUFFICIENT_BALANCE"], "INSUFFICIENT_BALANCE", "x");
        assert_eq!(err, ExchangeError::RateLimitExceeded("x".into()));
    }

    #[test]
    fn test_broad_substring_match() {
        let err = TABLE.classify(&["1"], "account has INSUFFICIENT margin", "x");
        assert_eq!(err, ExchangeError::InsufficientFunds("x".into()));
    }

    #[test]
    fn test_unmatched_falls_back_to_generic_with_body() {
        let err = TABLE.classify(&["777"], "something odd", "toobit {\"code\":777}");
        assert_eq!(err, ExchangeError::Exchange("toobit {\"code\":777}".into()));
    }

    #[test]
    fn test_empty_keys_are_ignored() {
        assert_eq!(ErrorTable::EMPTY.classify(&[""], "", "f"), ExchangeError::Exchange("f".into()));
    }

    proptest! {
        #[test]
        fn prop_exact_match_never_skipped(suffix in "[a-z ]{0,12}") {
            let message = format!("ORDER_NOT_FOUND {}", suffix);
            let err = TABLE.classify(&["ORDER_NOT_FOUND", &message], &message, "f");
            prop_assert_eq!(err, ExchangeError::OrderNotFound("f".into()));
        }
    }
}
