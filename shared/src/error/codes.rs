//! Unified error codes for the marketplace
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Seller errors
//! - 4xxx: Order errors
//! - 5xxx: Cart errors
//! - 6xxx: Product errors
//! - 7xxx: Location / delivery errors
//! - 8xxx: Engagement errors (reviews, likes)
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility with the mobile clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,
    /// Admin role required
    AdminRequired = 2003,

    // ==================== 3xxx: Seller ====================
    /// Seller not found (or not a seller)
    SellerNotFound = 3001,
    /// Seller is closed, inactive or deleted
    SellerUnavailable = 3002,
    /// Seller has no location to deliver from
    SellerLocationMissing = 3003,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has no lines
    OrderEmpty = 4007,
    /// Status transition is not in the lifecycle table
    InvalidStatusTransition = 4010,
    /// Lines belong to more than one seller
    CrossSellerOrder = 4011,

    // ==================== 5xxx: Cart ====================
    /// Cart line not found
    CartItemNotFound = 5001,
    /// Seller group not present in cart
    CartSellerNotFound = 5002,
    /// Quantity must be at least one
    InvalidQuantity = 5003,

    // ==================== 6xxx: Product ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Product is deleted
    ProductUnavailable = 6002,
    /// Product is out of stock
    ProductOutOfStock = 6003,
    /// Referenced size/topping variant no longer exists
    StaleVariant = 6004,
    /// Product belongs to another seller
    ProductNotOwned = 6005,

    // ==================== 7xxx: Location ====================
    /// Location not found
    LocationNotFound = 7001,
    /// Delivery distance exceeds the service radius
    OutOfServiceArea = 7002,
    /// Latitude/longitude out of range
    InvalidCoordinates = 7003,
    /// Neither a delivery location nor an address reference was given
    DeliveryLocationRequired = 7004,

    // ==================== 8xxx: Engagement ====================
    /// Review not allowed (no unreviewed purchase)
    ReviewNotAllowed = 8001,
    /// Rating outside 1..=5
    InvalidRating = 8002,
    /// Seller already liked
    AlreadyLiked = 8101,
    /// Sellers cannot like themselves
    CannotLikeSelf = 8102,
    /// Like not found
    LikeNotFound = 8103,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timed out
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Shutting down or otherwise not accepting work
    ServiceUnavailable = 9006,
    /// Client disconnected
    ClientDisconnected = 9301,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the default message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Specific role is required",
            ErrorCode::AdminRequired => "Administrator role is required",

            // Seller
            ErrorCode::SellerNotFound => "Seller not found",
            ErrorCode::SellerUnavailable => "Seller is not accepting orders",
            ErrorCode::SellerLocationMissing => "Seller has no delivery address",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderEmpty => "Order is empty",
            ErrorCode::InvalidStatusTransition => "Invalid order status transition",
            ErrorCode::CrossSellerOrder => "An order can only contain products of one seller",

            // Cart
            ErrorCode::CartItemNotFound => "Cart item not found",
            ErrorCode::CartSellerNotFound => "Seller group not found in cart",
            ErrorCode::InvalidQuantity => "Quantity must be between 1 and 999",

            // Product
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductUnavailable => "Product is no longer available",
            ErrorCode::ProductOutOfStock => "Product is out of stock",
            ErrorCode::StaleVariant => "Selected variant no longer exists",
            ErrorCode::ProductNotOwned => "Product belongs to another seller",

            // Location
            ErrorCode::LocationNotFound => "Location not found",
            ErrorCode::OutOfServiceArea => "Delivery address is outside the service area",
            ErrorCode::InvalidCoordinates => "Invalid coordinates",
            ErrorCode::DeliveryLocationRequired => "A delivery location is required",

            // Engagement
            ErrorCode::ReviewNotAllowed => "Purchase the product before reviewing it",
            ErrorCode::InvalidRating => "Rating must be between 1 and 5",
            ErrorCode::AlreadyLiked => "Seller already liked",
            ErrorCode::CannotLikeSelf => "Cannot like yourself",
            ErrorCode::LikeNotFound => "Like not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::ServiceUnavailable => "Service is unavailable",
            ErrorCode::ClientDisconnected => "Client disconnected",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::RoleRequired),
            2003 => Ok(ErrorCode::AdminRequired),

            // Seller
            3001 => Ok(ErrorCode::SellerNotFound),
            3002 => Ok(ErrorCode::SellerUnavailable),
            3003 => Ok(ErrorCode::SellerLocationMissing),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4007 => Ok(ErrorCode::OrderEmpty),
            4010 => Ok(ErrorCode::InvalidStatusTransition),
            4011 => Ok(ErrorCode::CrossSellerOrder),

            // Cart
            5001 => Ok(ErrorCode::CartItemNotFound),
            5002 => Ok(ErrorCode::CartSellerNotFound),
            5003 => Ok(ErrorCode::InvalidQuantity),

            // Product
            6001 => Ok(ErrorCode::ProductNotFound),
            6002 => Ok(ErrorCode::ProductUnavailable),
            6003 => Ok(ErrorCode::ProductOutOfStock),
            6004 => Ok(ErrorCode::StaleVariant),
            6005 => Ok(ErrorCode::ProductNotOwned),

            // Location
            7001 => Ok(ErrorCode::LocationNotFound),
            7002 => Ok(ErrorCode::OutOfServiceArea),
            7003 => Ok(ErrorCode::InvalidCoordinates),
            7004 => Ok(ErrorCode::DeliveryLocationRequired),

            // Engagement
            8001 => Ok(ErrorCode::ReviewNotAllowed),
            8002 => Ok(ErrorCode::InvalidRating),
            8101 => Ok(ErrorCode::AlreadyLiked),
            8102 => Ok(ErrorCode::CannotLikeSelf),
            8103 => Ok(ErrorCode::LikeNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9006 => Ok(ErrorCode::ServiceUnavailable),
            9301 => Ok(ErrorCode::ClientDisconnected),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::SellerNotFound.code(), 3001);
        assert_eq!(ErrorCode::OrderNotFound.code(), 4001);
        assert_eq!(ErrorCode::InvalidStatusTransition.code(), 4010);
        assert_eq!(ErrorCode::CartItemNotFound.code(), 5001);
        assert_eq!(ErrorCode::StaleVariant.code(), 6004);
        assert_eq!(ErrorCode::OutOfServiceArea.code(), 7002);
        assert_eq!(ErrorCode::ReviewNotAllowed.code(), 8001);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::Unknown.is_success());
        assert!(!ErrorCode::OrderNotFound.is_success());
    }

    #[test]
    fn test_try_from_roundtrip() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::ValidationFailed,
            ErrorCode::TokenExpired,
            ErrorCode::SellerLocationMissing,
            ErrorCode::CrossSellerOrder,
            ErrorCode::InvalidQuantity,
            ErrorCode::ProductNotOwned,
            ErrorCode::DeliveryLocationRequired,
            ErrorCode::LikeNotFound,
            ErrorCode::ClientDisconnected,
        ];
        for code in codes {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(4999), Err(InvalidErrorCode(4999)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::OutOfServiceArea).unwrap();
        assert_eq!(json, "7002");
        let code: ErrorCode = serde_json::from_str("4011").unwrap();
        assert_eq!(code, ErrorCode::CrossSellerOrder);
        assert!(serde_json::from_str::<ErrorCode>("12345").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::OrderNotFound), "4001");
        assert_eq!(
            format!("{}", InvalidErrorCode(42)),
            "invalid error code: 42"
        );
    }
}
