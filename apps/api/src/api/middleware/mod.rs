// Request extractors

pub mod auth;
pub mod locale;

pub use auth::{AdminUser, AuthUser};
pub use locale::RequestLocale;
