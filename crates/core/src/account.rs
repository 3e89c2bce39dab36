//! Marketplace accounts and authentication payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Email, UserId, timestamp};

/// A marketplace user as returned by `GET /auth/me` and embedded in products
/// as the seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    #[serde(default)]
    pub full_name: Option<String>,
    pub is_admin: bool,
    pub is_active: bool,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Name shown in the navbar: the full name when set, otherwise the username.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.username)
    }

    /// "Administrator" or "Regular User".
    #[must_use]
    pub const fn account_type(&self) -> &'static str {
        if self.is_admin {
            "Administrator"
        } else {
            "Regular User"
        }
    }

    /// "Active" or "Inactive".
    #[must_use]
    pub const fn status_label(&self) -> &'static str {
        if self.is_active { "Active" } else { "Inactive" }
    }

    /// Membership date, e.g. "March 1, 2024".
    #[must_use]
    pub fn member_since(&self) -> String {
        self.created_at.format("%B %-d, %Y").to_string()
    }
}

/// Bearer token returned by `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: Email,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub password: String,
}
