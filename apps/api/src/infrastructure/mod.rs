// Infrastructure layer module
// Database adapters and payment provider integrations

pub mod payments;
pub mod repositories;
