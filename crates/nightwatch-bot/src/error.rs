//! Nightwatch bot: error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use nightwatch_core::error::DomainError;
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the bot process.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `DomainError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DomainError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            DomainError::NotEligible(_) => StatusCode::FORBIDDEN,
            DomainError::InsufficientPlayers { .. }
            | DomainError::ProposalNotOpen
            | DomainError::CommandNotPermitted { .. } => StatusCode::CONFLICT,
            DomainError::NotificationDeliveryFailed { .. } => StatusCode::BAD_GATEWAY,
            DomainError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorBody {
            error: self.0.code(),
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use nightwatch_core::player::PlayerId;

    fn status_of(err: DomainError) -> StatusCode {
        let response = ApiError(err).into_response();
        response.status()
    }

    #[test]
    fn test_invalid_argument_maps_to_400() {
        assert_eq!(
            status_of(DomainError::InvalidArgument("bad count".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_not_eligible_maps_to_403() {
        assert_eq!(
            status_of(DomainError::NotEligible(PlayerId::new("zed"))),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_state_conflicts_map_to_409() {
        assert_eq!(
            status_of(DomainError::InsufficientPlayers {
                players: 1,
                slots: 3,
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(DomainError::ProposalNotOpen),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(DomainError::CommandNotPermitted {
                command: "join",
                phase: "night".into(),
            }),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_delivery_failure_maps_to_502() {
        assert_eq!(
            status_of(DomainError::NotificationDeliveryFailed {
                player: PlayerId::new("amy"),
                reason: "blocked".into(),
            }),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_infrastructure_maps_to_500() {
        assert_eq!(
            status_of(DomainError::Infrastructure("actor gone".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
