//! Nikola Core - shared domain library.
//!
//! This crate provides the types and rules used by every Nikola component:
//! - `storefront` - Customer-facing shop (port 3000)
//! - `admin` - Back-office panel (port 3001)
//! - `cli` - Session-store migrations and holiday-mode control
//!
//! # Architecture
//!
//! All store data lives behind the backend REST API. The core crate holds
//! only the shapes of that data and the pure rules applied to it: no I/O,
//! no HTTP clients, no clock reads. Callers pass "now" in.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, and statuses
//! - [`catalog`] - Products, categories, related-product picks
//! - [`cart`] - Cart lines, merge rules, totals and shipping
//! - [`wishlist`] - Saved products
//! - [`checkout`] - Shipping details, order drafts, payment card checks
//! - [`order`] - Orders as stored by the backend, admin pagination
//! - [`review`] - Product reviews, replies, and store testimonials
//! - [`account`] - Login, registration, profiles
//! - [`contact`] - Support tickets and newsletter steps
//! - [`promo`] - Christmas promotions
//! - [`admin`] - Back-office forms

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod account;
pub mod admin;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod contact;
pub mod order;
pub mod promo;
pub mod review;
pub mod types;
pub mod wishlist;

pub use types::*;
