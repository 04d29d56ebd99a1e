//! User Model
//!
//! A seller is a user with `role == seller`; open flag, status and location
//! only matter for that role.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 用户角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Seller,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Seller => "seller",
            Role::Customer => "customer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "seller" => Ok(Role::Seller),
            "customer" => Ok(Role::Customer),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// 账户状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

/// User entity (customers, sellers and admins)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub status: UserStatus,
    /// Seller accepts orders
    #[serde(default)]
    pub is_open: bool,
    #[serde(default)]
    pub is_deleted: bool,
    /// Current Location record
    #[serde(default)]
    pub location_id: Option<String>,
    /// Expo device token for push delivery
    #[serde(default)]
    pub expo_push_token: Option<String>,
    #[serde(default)]
    pub created_at: i64,
}

impl User {
    pub fn is_seller(&self) -> bool {
        self.role == Role::Seller
    }

    /// Eligibility filter: seller role, open, active, not deleted
    pub fn is_eligible_seller(&self) -> bool {
        self.is_seller() && self.is_open && self.status == UserStatus::Active && !self.is_deleted
    }
}
