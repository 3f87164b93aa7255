//! Domain models for admin.
//!
//! Catalog, order and account types come from `nikola_core`; this module
//! only holds what the admin keeps in its own session.

pub mod session;

pub use session::{CurrentAdmin, keys as session_keys};
