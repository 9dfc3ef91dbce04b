use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::value_objects::PsePayer;
use crate::domain::errors::DomainResult;

/// Bank offered by the PSE network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PseBank {
    pub code: String,
    pub name: String,
}

/// Data sent to the gateway to open a transfer
#[derive(Debug, Clone)]
pub struct PseTransactionRequest {
    pub reference: String,
    pub amount: Decimal,
    pub currency: String,
    pub description: String,
    pub payer: PsePayer,
    pub buyer_email: String,
    pub buyer_name: String,
    pub return_url: String,
}

/// Gateway answer to a new transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PseTransaction {
    pub transaction_id: String,
    pub bank_url: String,
    pub status_code: String,
}

/// Port to the PSE payment gateway
#[async_trait]
pub trait PseGateway: Send + Sync {
    /// Banks available for transfers
    async fn list_banks(&self) -> DomainResult<Vec<PseBank>>;

    /// Opens a transfer and returns the bank redirect URL
    async fn create_transaction(&self, request: &PseTransactionRequest) -> DomainResult<PseTransaction>;

    /// Current status code of a transfer
    async fn transaction_status(&self, transaction_id: &str) -> DomainResult<String>;
}
