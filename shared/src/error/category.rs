//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 2xxx: Permission errors
/// - 3xxx: Client errors
/// - 4xxx: Order errors
/// - 5xxx: Closure errors
/// - 6xxx: Material errors
/// - 7xxx: Vehicle errors
/// - 8xxx: User errors
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
    /// Client errors (3xxx)
    Client,
    /// Order errors (4xxx)
    Order,
    /// Closure errors (5xxx)
    Closure,
    /// Material errors (6xxx)
    Material,
    /// Vehicle errors (7xxx)
    Vehicle,
    /// User errors (8xxx)
    User,
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
            3000..4000 => Self::Client,
            4000..5000 => Self::Order,
            5000..6000 => Self::Closure,
            6000..7000 => Self::Material,
            7000..8000 => Self::Vehicle,
            8000..9000 => Self::User,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Client => "client",
            Self::Order => "order",
            Self::Closure => "closure",
            Self::Material => "material",
            Self::Vehicle => "vehicle",
            Self::User => "user",
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
        assert_eq!(ErrorCategory::from_code(3001), ErrorCategory::Client);
        assert_eq!(ErrorCategory::from_code(4001), ErrorCategory::Order);
        assert_eq!(ErrorCategory::from_code(5001), ErrorCategory::Closure);
        assert_eq!(ErrorCategory::from_code(6001), ErrorCategory::Material);
        assert_eq!(ErrorCategory::from_code(7001), ErrorCategory::Vehicle);
        assert_eq!(ErrorCategory::from_code(8001), ErrorCategory::User);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(10000), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::NotFound.category(), ErrorCategory::General);
        assert_eq!(ErrorCode::NotAuthenticated.category(), ErrorCategory::Auth);
        assert_eq!(ErrorCode::ClientNotFound.category(), ErrorCategory::Client);
        assert_eq!(ErrorCode::OrderNotFound.category(), ErrorCategory::Order);
        assert_eq!(ErrorCode::ClosureEmpty.category(), ErrorCategory::Closure);
        assert_eq!(
            ErrorCode::MaterialNotFound.category(),
            ErrorCategory::Material
        );
        assert_eq!(
            ErrorCode::VehicleNotFound.category(),
            ErrorCategory::Vehicle
        );
        assert_eq!(ErrorCode::UserNotFound.category(), ErrorCategory::User);
        assert_eq!(ErrorCode::InternalError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_serialize() {
        let json = serde_json::to_string(&ErrorCategory::Closure).unwrap();
        assert_eq!(json, "\"closure\"");

        let category: ErrorCategory = serde_json::from_str("\"vehicle\"").unwrap();
        assert_eq!(category, ErrorCategory::Vehicle);
    }
}
