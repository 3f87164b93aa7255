//! Session-held models for the storefront.
//!
//! The backend owns products, orders and accounts. What a visitor carries
//! between requests (cart, wishlist, toasts, promo progress) lives in the
//! session under the keys in [`session_keys`].

pub mod session;

pub use session::{
    CurrentCustomer, Toast, ToastKind, load, push_toast, session_keys, store, take_toasts,
};
