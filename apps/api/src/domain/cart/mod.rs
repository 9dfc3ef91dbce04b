#![allow(clippy::module_inception)]
pub mod cart;

pub use cart::{Cart, CartItem, MAX_LINE_QUANTITY};
