//! Types stored in the per-visitor session.

pub mod session;

pub use session::{AccessToken, Toast, ToastKind, keys as session_keys};
