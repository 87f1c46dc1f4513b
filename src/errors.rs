//! Typed error hierarchy.
//!
//! Each failure category from the error-handling design has its own
//! `thiserror` enum; `ExchangeError` composes them so a caller that doesn't
//! care about the category can still match on one type. Every variant maps
//! to exactly one canonical error code (see `ErrorCode`).

use thiserror::Error;

/// Canonical error codes returned across the external interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    MarketClosed,
    InvalidInstrument,
    UnknownInstrument,
    PositionLimit,
    RateLimitExceeded,
    ServiceOverloaded,
    ServiceShutdown,
    Timeout,
    InvalidQuantity,
    InvalidPrice,
    UnauthorizedCancel,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MarketClosed => "MARKET_CLOSED",
            ErrorCode::InvalidInstrument => "INVALID_INSTRUMENT",
            ErrorCode::UnknownInstrument => "UNKNOWN_INSTRUMENT",
            ErrorCode::PositionLimit => "MM_POS_LIMIT",
            ErrorCode::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ErrorCode::ServiceOverloaded => "SERVICE_OVERLOADED",
            ErrorCode::ServiceShutdown => "SERVICE_SHUTDOWN",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::InvalidQuantity => "INVALID_QUANTITY",
            ErrorCode::InvalidPrice => "INVALID_PRICE",
            ErrorCode::UnauthorizedCancel => "UNAUTHORIZED_CANCEL",
        }
    }
}

/// Errors raised while validating an order before it reaches the venue.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("invalid price: {0}")]
    InvalidPrice(String),

    #[error("instrument not allowed for this role: {0}")]
    InstrumentNotAllowed(String),

    #[error("{0}")]
    PositionLimit(String),

    #[error("rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("unknown constraint kind: {0}")]
    UnknownConstraintKind(String),
}

impl ValidationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ValidationError::InvalidQuantity(_) => ErrorCode::InvalidQuantity,
            ValidationError::InvalidPrice(_) => ErrorCode::InvalidPrice,
            ValidationError::InstrumentNotAllowed(_) => ErrorCode::InvalidInstrument,
            ValidationError::PositionLimit(_) => ErrorCode::PositionLimit,
            ValidationError::RateLimitExceeded(_) => ErrorCode::RateLimitExceeded,
            ValidationError::UnknownConstraintKind(_) => ErrorCode::InvalidInstrument,
        }
    }
}

/// Errors raised by the venue while executing a submission.
#[derive(Debug, Error)]
pub enum MatchingError {
    #[error("unknown instrument: {0}")]
    UnknownInstrument(String),

    #[error("market closed")]
    MarketClosed,

    #[error("unauthorized cancel")]
    UnauthorizedCancel,

    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
}

impl MatchingError {
    pub fn code(&self) -> ErrorCode {
        match self {
            MatchingError::UnknownInstrument(_) => ErrorCode::UnknownInstrument,
            MatchingError::MarketClosed => ErrorCode::MarketClosed,
            MatchingError::UnauthorizedCancel => ErrorCode::UnauthorizedCancel,
            MatchingError::InvariantViolation(_) => ErrorCode::InvalidInstrument,
        }
    }
}

/// Errors raised by the response coordinator.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("service overloaded: {pending}/{capacity} pending requests")]
    ServiceOverloaded { pending: usize, capacity: usize },

    #[error("service shutting down")]
    ShuttingDown,
}

impl CoordinatorError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CoordinatorError::ServiceOverloaded { .. } => ErrorCode::ServiceOverloaded,
            CoordinatorError::ShuttingDown => ErrorCode::ServiceShutdown,
        }
    }
}

/// Top-level error composing every category.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Matching(#[from] MatchingError),

    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),
}

impl ExchangeError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ExchangeError::Validation(e) => e.code(),
            ExchangeError::Matching(e) => e.code(),
            ExchangeError::Coordinator(e) => e.code(),
        }
    }
}
