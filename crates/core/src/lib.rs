//! Toys Marketplace Core - Shared domain types.
//!
//! This crate provides the types and pure logic used by every Toys
//! Marketplace component:
//! - `web` - Server-rendered web client for the marketplace REST API
//! - `cli` - Operator tooling (health checks, catalog seeding)
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no sessions. Everything here can be unit tested without a
//! running API.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails and timestamps
//! - [`account`] - Users, tokens and auth request bodies
//! - [`catalog`] - Categories, products and client-side filtering
//! - [`cart`] - Cart items and order summary arithmetic
//! - [`forms`] - Validation of the login, register and admin forms
//! - [`navigation`] - Route access policy, sidebar items and page tabs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod account;
pub mod cart;
pub mod catalog;
pub mod forms;
pub mod navigation;
pub mod types;

pub use account::{LoginRequest, RegisterRequest, Token, User};
pub use cart::{CartItem, CartItemUpdate, CartSummary, NewCartItem};
pub use catalog::{Category, NewCategory, NewProduct, Product, ProductQuery};
pub use navigation::{Access, AccessPolicy, Viewer};
pub use types::*;
