// Payment domain module
// Payment attempts, PSE status mapping and the gateway port

#![allow(clippy::module_inception)]

pub mod gateway;
pub mod payment;
pub mod value_objects;

pub use gateway::{PseBank, PseGateway, PseTransaction, PseTransactionRequest};
pub use payment::{Payment, PaymentUpdate};
pub use value_objects::{DocumentType, PaymentMethod, PaymentStatus, PersonType, PsePayer, PseStatus};
