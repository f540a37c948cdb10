//! User accounts as returned by the auth service.

use serde::{Deserialize, Serialize};

use crate::favorites::Favorites;
use crate::types::{Email, UserId};

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A diner browsing vendors.
    #[default]
    User,
    /// A business owner who registers carts.
    Vendor,
}

impl Role {
    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Vendor => "vendor",
        }
    }
}

/// A signed-in account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: Email,
    #[serde(default)]
    pub role: Role,
    /// Vendors this user has saved. Older backend records omit the field.
    #[serde(default)]
    pub saved_vendors: Favorites,
}

impl User {
    /// First name for greetings ("Hi, Sarah").
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}
