// Payment provider adapters

pub mod pse_client;
pub mod signature;
pub mod stripe_stub;

pub use pse_client::PseHttpClient;
pub use stripe_stub::{StripeStub, StubIntent};
