use thiserror::Error;

use crate::domain::entities::webhook_event::EventParseError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid webhook signature: {0}")]
    InvalidSignature(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found")]
    NotFound,

    #[error("Not configured: {0}")]
    NotConfigured(&'static str),

    #[error("Upstream {service} returned {status}: {body}")]
    Upstream {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Clone, Copy, Debug)]
pub enum ErrorCode {
    InvalidSignature,
    InvalidInput,
    NotFound,
    NotConfigured,
    UpstreamError,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidSignature => "INVALID_SIGNATURE",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::NotConfigured => "NOT_CONFIGURED",
            ErrorCode::UpstreamError => "UPSTREAM_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl From<EventParseError> for AppError {
    fn from(e: EventParseError) -> Self {
        AppError::InvalidInput(e.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
