//! Form drafts and their validation.
//!
//! Drafts hold exactly what the browser submitted (strings, unparsed).
//! `validate()` either produces the API request body or the first
//! [`ValidationError`] encountered, whose message is shown to the user.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::account::{LoginRequest, RegisterRequest};
use crate::catalog::{NewCategory, NewProduct};
use crate::types::{CategoryId, Email, Price};

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// A form field failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Category name is required")]
    CategoryNameRequired,
    #[error("Product name is required")]
    ProductNameRequired,
    #[error("Valid price is required")]
    InvalidPrice,
    #[error("Valid stock quantity is required")]
    InvalidStock,
    #[error("Please select a category")]
    CategoryRequired,
    #[error("Image URL must start with http:// or https://")]
    InvalidImageUrl,
    #[error("Email and password are required")]
    CredentialsRequired,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Username is required")]
    UsernameRequired,
    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    PasswordTooShort,
    #[error("Passwords do not match")]
    PasswordMismatch,
}

/// Trim and turn an empty string into `None`.
fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn optional_image_url(value: &str) -> Result<Option<String>, ValidationError> {
    match optional(value) {
        Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
            Err(ValidationError::InvalidImageUrl)
        }
        other => Ok(other),
    }
}

// =============================================================================
// Admin: Add Category
// =============================================================================

/// Fields of the "Add Category" modal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
}

impl CategoryDraft {
    /// Validate into a `POST /categories` body.
    ///
    /// # Errors
    ///
    /// Returns the first field that fails validation.
    pub fn validate(&self) -> Result<NewCategory, ValidationError> {
        let name = optional(&self.name).ok_or(ValidationError::CategoryNameRequired)?;
        let image_url = optional_image_url(&self.image_url)?;

        Ok(NewCategory {
            name,
            description: optional(&self.description),
            image_url,
        })
    }
}

// =============================================================================
// Admin: Add Product
// =============================================================================

/// Fields of the "Add Product" modal.
///
/// `is_featured` is an HTML checkbox: present (any value) when ticked,
/// absent otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub stock_quantity: String,
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub is_featured: Option<String>,
}

impl ProductDraft {
    /// Whether the "Featured Product" checkbox was ticked.
    #[must_use]
    pub const fn is_featured(&self) -> bool {
        self.is_featured.is_some()
    }

    /// Whether `category_id` is the currently selected option.
    #[must_use]
    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn is_selected(&self, category_id: &CategoryId) -> bool {
        self.category_id.trim() == category_id.to_string()
    }

    /// Validate into a `POST /products` body.
    ///
    /// Checks run in the order the form shows them: name, price, stock,
    /// category.
    ///
    /// # Errors
    ///
    /// Returns the first field that fails validation.
    pub fn validate(&self) -> Result<NewProduct, ValidationError> {
        let name = optional(&self.name).ok_or(ValidationError::ProductNameRequired)?;

        let price = Decimal::from_str(self.price.trim())
            .ok()
            .map(Price::new)
            .filter(Price::is_positive)
            .ok_or(ValidationError::InvalidPrice)?;

        let stock_quantity = self
            .stock_quantity
            .trim()
            .parse::<i32>()
            .ok()
            .filter(|stock| *stock >= 0)
            .ok_or(ValidationError::InvalidStock)?;

        let category_id = self
            .category_id
            .parse::<CategoryId>()
            .map_err(|_| ValidationError::CategoryRequired)?;

        let image_url = optional_image_url(&self.image_url)?;

        Ok(NewProduct {
            name,
            description: optional(&self.description),
            price,
            stock_quantity,
            category_id,
            image_url,
            is_featured: self.is_featured(),
        })
    }
}

// =============================================================================
// Auth
// =============================================================================

/// Fields of the login form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginDraft {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginDraft {
    /// Validate into a `POST /auth/login` body.
    ///
    /// # Errors
    ///
    /// Fails when either field is blank.
    pub fn validate(&self) -> Result<LoginRequest, ValidationError> {
        let email = self.email.trim();
        if email.is_empty() || self.password.is_empty() {
            return Err(ValidationError::CredentialsRequired);
        }
        Ok(LoginRequest {
            email: email.to_owned(),
            password: self.password.clone(),
        })
    }
}

/// Fields of the registration form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterDraft {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
}

impl RegisterDraft {
    /// Validate into a `POST /auth/register` body.
    ///
    /// # Errors
    ///
    /// Returns the first field that fails validation.
    pub fn validate(&self) -> Result<RegisterRequest, ValidationError> {
        let email = Email::parse(&self.email).map_err(|_| ValidationError::InvalidEmail)?;
        let username = optional(&self.username).ok_or(ValidationError::UsernameRequired)?;

        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::PasswordTooShort);
        }
        if self.password != self.password_confirm {
            return Err(ValidationError::PasswordMismatch);
        }

        Ok(RegisterRequest {
            email,
            username,
            full_name: optional(&self.full_name),
            password: self.password.clone(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product_draft() -> ProductDraft {
        ProductDraft {
            name: "RC Racing Car".to_string(),
            description: "  4WD  ".to_string(),
            price: "79.99".to_string(),
            stock_quantity: "18".to_string(),
            category_id: "6".to_string(),
            image_url: String::new(),
            is_featured: Some("on".to_string()),
        }
    }

    #[test]
    fn test_category_requires_name() {
        let draft = CategoryDraft {
            name: "   ".to_string(),
            ..CategoryDraft::default()
        };
        assert_eq!(draft.validate(), Err(ValidationError::CategoryNameRequired));
    }

    #[test]
    fn test_category_blank_optionals_become_none() {
        let draft = CategoryDraft {
            name: " Plush Toys ".to_string(),
            description: String::new(),
            image_url: "  ".to_string(),
        };
        let category = draft.validate().unwrap();
        assert_eq!(category.name, "Plush Toys");
        assert_eq!(category.description, None);
        assert_eq!(category.image_url, None);
    }

    #[test]
    fn test_category_rejects_non_http_image() {
        let draft = CategoryDraft {
            name: "Kites".to_string(),
            image_url: "javascript:alert(1)".to_string(),
            ..CategoryDraft::default()
        };
        assert_eq!(draft.validate(), Err(ValidationError::InvalidImageUrl));
    }

    #[test]
    fn test_product_valid() {
        let product = product_draft().validate().unwrap();
        assert_eq!(product.price, Price::from_cents(7999));
        assert_eq!(product.stock_quantity, 18);
        assert_eq!(product.category_id, CategoryId::new(6));
        assert_eq!(product.description.as_deref(), Some("4WD"));
        assert!(product.is_featured);
    }

    #[test]
    fn test_product_requires_name_first() {
        let draft = ProductDraft {
            name: String::new(),
            price: String::new(),
            ..product_draft()
        };
        assert_eq!(draft.validate(), Err(ValidationError::ProductNameRequired));
    }

    #[test]
    fn test_product_rejects_bad_prices() {
        for price in ["", "abc", "0", "0.00", "-5"] {
            let draft = ProductDraft {
                price: price.to_string(),
                ..product_draft()
            };
            assert_eq!(draft.validate(), Err(ValidationError::InvalidPrice), "{price:?}");
        }
    }

    #[test]
    fn test_product_stock_zero_allowed_negative_rejected() {
        let zero = ProductDraft {
            stock_quantity: "0".to_string(),
            ..product_draft()
        };
        assert_eq!(zero.validate().unwrap().stock_quantity, 0);

        for stock in ["", "-1", "two"] {
            let draft = ProductDraft {
                stock_quantity: stock.to_string(),
                ..product_draft()
            };
            assert_eq!(draft.validate(), Err(ValidationError::InvalidStock), "{stock:?}");
        }
    }

    #[test]
    fn test_product_requires_category() {
        let draft = ProductDraft {
            category_id: String::new(),
            ..product_draft()
        };
        assert_eq!(draft.validate(), Err(ValidationError::CategoryRequired));
    }

    #[test]
    fn test_product_checkbox_absent_is_not_featured() {
        let draft = ProductDraft {
            is_featured: None,
            ..product_draft()
        };
        assert!(!draft.validate().unwrap().is_featured);
    }

    #[test]
    fn test_product_is_selected() {
        let draft = product_draft();
        assert!(draft.is_selected(&CategoryId::new(6)));
        assert!(!draft.is_selected(&CategoryId::new(1)));
    }

    #[test]
    fn test_login_requires_both_fields() {
        let draft = LoginDraft {
            email: "user@toysmarketplace.com".to_string(),
            password: String::new(),
        };
        assert_eq!(draft.validate().unwrap_err(), ValidationError::CredentialsRequired);

        let draft = LoginDraft {
            email: " user@toysmarketplace.com ".to_string(),
            password: "user123".to_string(),
        };
        assert_eq!(draft.validate().unwrap().email, "user@toysmarketplace.com");
    }

    #[test]
    fn test_register_validation_order() {
        let mut draft = RegisterDraft {
            email: "nope".to_string(),
            username: String::new(),
            full_name: String::new(),
            password: "abc".to_string(),
            password_confirm: "abd".to_string(),
        };
        assert_eq!(draft.validate().unwrap_err(), ValidationError::InvalidEmail);

        draft.email = "kid@example.com".to_string();
        assert_eq!(draft.validate().unwrap_err(), ValidationError::UsernameRequired);

        draft.username = "kid".to_string();
        assert_eq!(draft.validate().unwrap_err(), ValidationError::PasswordTooShort);

        draft.password = "user123".to_string();
        assert_eq!(draft.validate().unwrap_err(), ValidationError::PasswordMismatch);

        draft.password_confirm = "user123".to_string();
        let request = draft.validate().unwrap();
        assert_eq!(request.username, "kid");
        assert_eq!(request.full_name, None);
    }
}
