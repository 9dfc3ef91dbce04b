//! Tienda API Library
//!
//! Backend of a bilingual (Spanish/English) storefront: catalog, cart,
//! checkout with inventory reservation, PSE and Stripe payments, and the
//! admin back office.

pub mod api;
pub mod application;
pub mod auth;
pub mod config;
pub mod domain;
pub mod infrastructure;
