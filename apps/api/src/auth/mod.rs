// Authentication helpers
// Password hashing and JWT tokens

pub mod jwt;
pub mod password;
