//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 2xxx: Permission errors
/// - 3xxx: Seller errors
/// - 4xxx: Order errors
/// - 5xxx: Cart errors
/// - 6xxx: Product errors
/// - 7xxx: Location errors
/// - 8xxx: Engagement errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Seller errors (3xxx)
    Seller,
    /// Order errors (4xxx)
    Order,
    /// Cart errors (5xxx)
    Cart,
    /// Product errors (6xxx)
    Product,
    /// Location errors (7xxx)
    Location,
    /// Review / like errors (8xxx)
    Engagement,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Seller,
            4000..5000 => Self::Order,
            5000..6000 => Self::Cart,
            6000..7000 => Self::Product,
            7000..8000 => Self::Location,
            8000..9000 => Self::Engagement,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Seller => "seller",
            Self::Order => "order",
            Self::Cart => "cart",
            Self::Product => "product",
            Self::Location => "location",
            Self::Engagement => "engagement",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1001), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_code(2001), ErrorCategory::Permission);
        assert_eq!(ErrorCategory::from_code(3001), ErrorCategory::Seller);
        assert_eq!(ErrorCategory::from_code(4001), ErrorCategory::Order);
        assert_eq!(ErrorCategory::from_code(5001), ErrorCategory::Cart);
        assert_eq!(ErrorCategory::from_code(6001), ErrorCategory::Product);
        assert_eq!(ErrorCategory::from_code(7001), ErrorCategory::Location);
        assert_eq!(ErrorCategory::from_code(8001), ErrorCategory::Engagement);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(10000), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::TokenExpired.category(), ErrorCategory::Auth);
        assert_eq!(
            ErrorCode::SellerLocationMissing.category(),
            ErrorCategory::Seller
        );
        assert_eq!(
            ErrorCode::InvalidStatusTransition.category(),
            ErrorCategory::Order
        );
        assert_eq!(ErrorCode::StaleVariant.category(), ErrorCategory::Product);
        assert_eq!(
            ErrorCode::OutOfServiceArea.category(),
            ErrorCategory::Location
        );
        assert_eq!(ErrorCode::DatabaseError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_serialize() {
        let json = serde_json::to_string(&ErrorCategory::Engagement).unwrap();
        assert_eq!(json, "\"engagement\"");
        let category: ErrorCategory = serde_json::from_str("\"cart\"").unwrap();
        assert_eq!(category, ErrorCategory::Cart);
    }
}
