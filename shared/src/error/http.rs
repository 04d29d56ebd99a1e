//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::SellerNotFound
            | Self::OrderNotFound
            | Self::CartItemNotFound
            | Self::CartSellerNotFound
            | Self::ProductNotFound
            | Self::LocationNotFound
            | Self::LikeNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists | Self::AlreadyLiked => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated | Self::TokenExpired | Self::TokenInvalid => {
                StatusCode::UNAUTHORIZED
            }

            // 403 Forbidden
            Self::PermissionDenied
            | Self::RoleRequired
            | Self::AdminRequired
            | Self::ReviewNotAllowed => StatusCode::FORBIDDEN,

            // 422 Unprocessable Entity (business rule rejections)
            Self::InvalidStatusTransition
            | Self::CrossSellerOrder
            | Self::OutOfServiceArea
            | Self::SellerUnavailable
            | Self::SellerLocationMissing
            | Self::ProductUnavailable
            | Self::ProductOutOfStock
            | Self::StaleVariant
            | Self::ProductNotOwned
            | Self::CannotLikeSelf => StatusCode::UNPROCESSABLE_ENTITY,

            // 503 Service Unavailable (transient errors, client can retry)
            Self::NetworkError | Self::TimeoutError | Self::ServiceUnavailable => {
                StatusCode::SERVICE_UNAVAILABLE
            }

            // 500 Internal Server Error
            Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::ClientDisconnected
            | Self::Unknown => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
