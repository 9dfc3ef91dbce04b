//! Integration tests for `PseHttpClient` using wiremock HTTP mocks.

use rust_decimal::Decimal;
use serde_json::json;
use tienda_api::domain::errors::DomainError;
use tienda_api::domain::payment::{
    DocumentType, PersonType, PseGateway, PsePayer, PseTransactionRequest,
};
use tienda_api::infrastructure::payments::PseHttpClient;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> PseHttpClient {
    // Trailing slash must not produce a double slash in request paths
    PseHttpClient::new(&format!("{}/", base_url), "test-key", 5)
        .expect("client construction should not fail")
}

fn request() -> PseTransactionRequest {
    PseTransactionRequest {
        reference: "ORD-20260101-ABCDEF12".to_string(),
        amount: Decimal::new(119100, 0),
        currency: "COP".to_string(),
        description: "Pedido ORD-20260101-ABCDEF12".to_string(),
        payer: PsePayer {
            bank_code: "1007".to_string(),
            person_type: PersonType::Juridica,
            document_type: DocumentType::Nit,
            document_number: "900123456".to_string(),
        },
        buyer_email: "compras@empresa.co".to_string(),
        buyer_name: "Empresa SAS".to_string(),
        return_url: "http://localhost:3000/checkout/resultado".to_string(),
    }
}

#[tokio::test]
async fn list_banks_sends_bearer_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/banks"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "code": "1007", "name": "Bancolombia" },
            { "code": "1051", "name": "Davivienda" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let banks = test_client(&server.uri())
        .list_banks()
        .await
        .expect("should parse banks");

    assert_eq!(banks.len(), 2);
    assert_eq!(banks[1].code, "1051");
    assert_eq!(banks[1].name, "Davivienda");
}

#[tokio::test]
async fn create_transaction_posts_gateway_codes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/transactions"))
        .and(body_partial_json(json!({
            "reference": "ORD-20260101-ABCDEF12",
            "bank_code": "1007",
            "person_type": "J",
            "document_type": "NIT",
            "document_number": "900123456",
            "buyer_email": "compras@empresa.co"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "transaction_id": "tx-778899",
            "bank_url": "https://registro.desarrollo.pse.com.co/PSENF/index.html?enc=abc",
            "status": "PENDING"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transaction = test_client(&server.uri())
        .create_transaction(&request())
        .await
        .expect("should create transaction");

    assert_eq!(transaction.transaction_id, "tx-778899");
    assert!(transaction.bank_url.contains("pse.com.co"));
    assert_eq!(transaction.status_code, "PENDING");
}

#[tokio::test]
async fn transaction_status_reads_status_field() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/transactions/tx-778899"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "transaction_id": "tx-778899",
            "status": "APPROVED"
        })))
        .mount(&server)
        .await;

    let status = test_client(&server.uri())
        .transaction_status("tx-778899")
        .await
        .expect("should read status");

    assert_eq!(status, "APPROVED");
}

#[tokio::test]
async fn non_success_status_is_gateway_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/transactions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .create_transaction(&request())
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::PaymentGateway(_)));
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn malformed_body_is_gateway_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/banks"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = test_client(&server.uri()).list_banks().await.unwrap_err();
    assert!(matches!(err, DomainError::PaymentGateway(_)));
}
