//! HTTP client for the PSE bank transfer gateway.
//!
//! Every call carries `Authorization: Bearer <key>`; a non-2xx answer or an
//! unreadable body surfaces as [`DomainError::PaymentGateway`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::PseConfig;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::payment::{PseBank, PseGateway, PseTransaction, PseTransactionRequest};

pub struct PseHttpClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Serialize)]
struct CreateTransactionBody<'a> {
    reference: &'a str,
    amount: Decimal,
    currency: &'a str,
    description: &'a str,
    bank_code: &'a str,
    person_type: &'static str,
    document_type: &'static str,
    document_number: &'a str,
    buyer_email: &'a str,
    buyer_name: &'a str,
    return_url: &'a str,
}

#[derive(Deserialize)]
struct CreateTransactionResponse {
    transaction_id: String,
    bank_url: String,
    status: String,
}

#[derive(Deserialize)]
struct StatusResponse {
    status: String,
}

impl PseHttpClient {
    /// Builds a client for `base_url` (trailing slashes are ignored)
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> DomainResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("tienda-api/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DomainError::PaymentGateway(format!("client construction failed: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    pub fn from_config(config: &PseConfig) -> DomainResult<Self> {
        Self::new(&config.api_url, &config.api_key, config.timeout_secs)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, context: &str) -> DomainResult<T> {
        let response = request
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| DomainError::PaymentGateway(format!("{context}: request failed: {e}")))?;

        let response = Self::check_status(response, context).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| DomainError::PaymentGateway(format!("{context}: invalid response: {e}")))
    }

    async fn check_status(response: Response, context: &str) -> DomainResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(%status, context, body = %body, "PSE gateway returned an error");
        Err(DomainError::PaymentGateway(format!(
            "{context}: gateway returned status {status}"
        )))
    }
}

#[async_trait]
impl PseGateway for PseHttpClient {
    async fn list_banks(&self) -> DomainResult<Vec<PseBank>> {
        self.send(self.client.get(self.url("banks")), "list banks").await
    }

    async fn create_transaction(&self, request: &PseTransactionRequest) -> DomainResult<PseTransaction> {
        let body = CreateTransactionBody {
            reference: &request.reference,
            amount: request.amount,
            currency: &request.currency,
            description: &request.description,
            bank_code: request.payer.bank_code.trim(),
            person_type: request.payer.person_type.code(),
            document_type: request.payer.document_type.code(),
            document_number: request.payer.document_number.trim(),
            buyer_email: &request.buyer_email,
            buyer_name: &request.buyer_name,
            return_url: &request.return_url,
        };

        let created: CreateTransactionResponse = self
            .send(
                self.client.post(self.url("transactions")).json(&body),
                "create transaction",
            )
            .await?;

        Ok(PseTransaction {
            transaction_id: created.transaction_id,
            bank_url: created.bank_url,
            status_code: created.status,
        })
    }

    async fn transaction_status(&self, transaction_id: &str) -> DomainResult<String> {
        let path = format!("transactions/{transaction_id}");
        let status: StatusResponse = self
            .send(self.client.get(self.url(&path)), "transaction status")
            .await?;
        Ok(status.status)
    }
}
