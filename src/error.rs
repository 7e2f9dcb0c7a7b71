use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BookingError>;

/// What exactly was missing when a lookup came back empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    Ticket,
    Room,
    Booking,
}

/// Why a request was rejected on business grounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForbiddenReason {
    RoomFull,
    IneligibleTicket,
    Other,
}

/// Failure taxonomy for the booking workflow.
///
/// The variants carry precise internal reasons; the HTTP boundary collapses
/// them to the two status codes the platform has always exposed: every
/// `NotFound` becomes 404, everything else (capacity, eligibility, store
/// failures) becomes 403.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("{0} not found")]
    NotFound(NotFoundReason),
    #[error("{0}")]
    Forbidden(ForbiddenReason),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFoundReason::Ticket => write!(f, "ticket"),
            NotFoundReason::Room => write!(f, "room"),
            NotFoundReason::Booking => write!(f, "booking"),
        }
    }
}

impl fmt::Display for ForbiddenReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForbiddenReason::RoomFull => write!(f, "room is already at capacity"),
            ForbiddenReason::IneligibleTicket => {
                write!(f, "ticket does not include a hotel stay")
            }
            ForbiddenReason::Other => write!(f, "booking could not be processed"),
        }
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        if let BookingError::Database(e) = &self {
            tracing::error!("store error reached the boundary: {:?}", e);
        }

        let status = match self {
            BookingError::NotFound(_) => StatusCode::NOT_FOUND,
            BookingError::Forbidden(_) | BookingError::Database(_) => StatusCode::FORBIDDEN,
        };

        let message = match &self {
            // Never echo driver errors to the client.
            BookingError::Database(_) => "booking could not be processed".to_string(),
            other => other.to_string(),
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
