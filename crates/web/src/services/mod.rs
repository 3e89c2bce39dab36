//! Client-state flows that sit between the route handlers and the API.
//!
//! # Services
//!
//! - `auth` - Login, registration and logout against the marketplace API
//! - `cart` - Cart loading, mutations and the navbar badge count
//!
//! Both follow the same contract: API failures become toasts on the
//! [`ClientSession`](crate::middleware::ClientSession), a 401 tears the
//! session down, and only session-store faults surface as errors.

pub mod auth;
pub mod cart;
