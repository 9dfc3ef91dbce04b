// Stripe placeholder
// Issues local payment intent ids; no request leaves the process

use uuid::Uuid;

/// Locally generated stand-in for a Stripe PaymentIntent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubIntent {
    pub id: String,
    pub client_secret: String,
}

#[derive(Debug, Default, Clone)]
pub struct StripeStub;

impl StripeStub {
    pub fn new() -> Self {
        Self
    }

    pub fn create_intent(&self) -> StubIntent {
        let id = format!("pi_stub_{}", Uuid::new_v4().simple());
        let client_secret = format!("{}_secret_{}", id, Uuid::new_v4().simple());
        StubIntent { id, client_secret }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intents_are_unique_stub_ids() {
        let stub = StripeStub::new();
        let a = stub.create_intent();
        let b = stub.create_intent();
        assert!(a.id.starts_with("pi_stub_"));
        assert!(a.client_secret.starts_with(&a.id));
        assert_ne!(a.id, b.id);
    }
}
