// User domain module
// Accounts, roles and the customer address book

pub mod address;
pub mod value_objects;

pub use address::{Address, NewAddress};
pub use value_objects::{Email, UserRole};
