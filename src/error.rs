//! Error types for the coupon service.
//!
//! Three layers, matching how failures are handled:
//! - [`DomainError`]: business-rule violations. Never retried, never trigger fallback.
//! - [`BackendError`]: infrastructure failures. Drive the remote -> local fallback.
//! - [`CouponError`]: what service operations return to callers.
//!
//! [`AppError`] maps the above onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Business-rule violations. These are correctness results, not availability
/// problems, so they short-circuit the dual-backend policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Coupon already claimed")]
    AlreadyClaimed,
    #[error("Coupon already redeemed")]
    AlreadyRedeemed,
    #[error("Coupon must be claimed before redemption")]
    NotClaimed,
    #[error("Only the issuing merchant can redeem this coupon")]
    Unauthorized,
    #[error("Coupon has expired")]
    Expired,
    #[error("Account is deactivated")]
    Inactive,
    #[error("{0}")]
    Forbidden(String),
    #[error("A merchant application already exists for this address")]
    ApplicationExists,
    #[error("Application has already been reviewed")]
    AlreadyReviewed,
}

impl DomainError {
    /// Stable machine-readable code, returned alongside the message over HTTP.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::AlreadyClaimed => "ALREADY_CLAIMED",
            Self::AlreadyRedeemed => "ALREADY_REDEEMED",
            Self::NotClaimed => "NOT_CLAIMED",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Expired => "EXPIRED",
            Self::Inactive => "INACTIVE",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::ApplicationExists => "APPLICATION_EXISTS",
            Self::AlreadyReviewed => "ALREADY_REVIEWED",
        }
    }
}

/// Infrastructure failures from either persistence backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend has no store behind it (e.g. no database configured).
    #[error("backend not configured")]
    NotConfigured,
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("database error: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Error returned by service operations.
#[derive(Debug, Error)]
pub enum CouponError {
    /// Malformed input, caught before any persistence attempt.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Both the remote and the local store failed.
    #[error("{operation} failed: {source}")]
    OperationFailed {
        operation: &'static str,
        #[source]
        source: BackendError,
    },
}

impl CouponError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// The domain error, if this is one.
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CouponError>;

pub type ApiResult<T> = std::result::Result<T, AppError>;

/// HTTP-facing error.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{1}")]
    Conflict(&'static str, String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(..) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CouponError> for AppError {
    fn from(err: CouponError) -> Self {
        match err {
            CouponError::Validation(msg) => AppError::BadRequest(msg),
            CouponError::Domain(domain) => {
                let msg = domain.to_string();
                match domain {
                    DomainError::NotFound(_) => AppError::NotFound(msg),
                    DomainError::Unauthorized
                    | DomainError::Inactive
                    | DomainError::Forbidden(_) => AppError::Forbidden(msg),
                    other => AppError::Conflict(other.code(), msg),
                }
            }
            failed @ CouponError::OperationFailed { .. } => {
                tracing::error!("{}", failed);
                AppError::Internal("Operation failed".into())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Conflict(code, msg) => json!({ "error": msg, "code": code }),
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
