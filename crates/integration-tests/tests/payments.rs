//! Payment routes: validation before sending and status-agnostic passthrough.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use autopecas_client::{ApiError, Identification, Payer, PaymentData, Session};
use autopecas_core::{OrderId, PaymentStatus};
use autopecas_integration_tests::{MockBackend, MockRoute};
use rust_decimal::Decimal;
use serde_json::json;

fn card_payment() -> PaymentData {
    PaymentData {
        transaction_amount: Some(Decimal::new(25_990, 2)),
        description: Some("Pedido AP-42".to_string()),
        token: Some("card-token-123".to_string()),
        payment_method_id: Some("visa".to_string()),
        installments: Some(3),
        order_id: Some(OrderId::new(42)),
        payer: Payer {
            email: Some("cliente@exemplo.com".to_string()),
            identification: Some(Identification::cpf("52998224725")),
            ..Payer::default()
        },
        ..PaymentData::default()
    }
}

fn pix_payment() -> PaymentData {
    PaymentData {
        transaction_amount: Some(Decimal::new(9_990, 2)),
        description: Some("Pedido AP-43".to_string()),
        payer: Payer {
            email: Some("empresa@exemplo.com".to_string()),
            first_name: Some("Maria".to_string()),
            last_name: Some("Souza".to_string()),
            identification: Some(Identification::cnpj("11222333000181")),
        },
        ..PaymentData::default()
    }
}

#[tokio::test]
async fn test_card_payment_is_forwarded_with_token() {
    let mock = MockBackend::start(vec![MockRoute::json(
        "POST",
        "/api/payments/process_payment",
        201,
        json!({"success": true, "paymentId": 1_234_567_u64, "status": "approved", "statusDetail": "accredited"}),
    )])
    .await
    .unwrap();
    let client = mock.client(Session::in_memory()).unwrap();
    client.set_token("abc").unwrap();

    let response = client.create_card_payment(&card_payment()).await.unwrap();
    assert!(response.success());
    assert!(response.is_approved());
    assert_eq!(response.payment_id().as_deref(), Some("1234567"));

    let request = mock.last_request().unwrap();
    assert_eq!(request.authorization.as_deref(), Some("Bearer abc"));
    let body = request.body.unwrap();
    assert_eq!(body["transaction_amount"], json!(259.9));
    assert_eq!(body["payer"]["identification"]["type"], "CPF");
    assert_eq!(body["order_id"], 42);
}

#[tokio::test]
async fn test_declined_payment_is_returned_not_raised() {
    let body = json!({"success": false, "error": "Pagamento recusado", "status": "rejected", "statusDetail": "cc_rejected_insufficient_amount"});
    let mock = MockBackend::start(vec![MockRoute::json(
        "POST",
        "/api/payments/process_payment",
        402,
        body.clone(),
    )])
    .await
    .unwrap();
    let client = mock.client(Session::in_memory()).unwrap();

    let response = client.create_card_payment(&card_payment()).await.unwrap();
    assert!(!response.success());
    assert_eq!(response.status(), Some(PaymentStatus::Rejected));
    assert_eq!(response.error(), Some("Pagamento recusado"));
    assert_eq!(response.as_value(), &body);
}

#[tokio::test]
async fn test_server_error_body_is_passed_through() {
    let mock = MockBackend::start(vec![MockRoute::json(
        "POST",
        "/api/payments/process_pix",
        500,
        json!({"success": false, "message": "Erro ao comunicar com o processador"}),
    )])
    .await
    .unwrap();
    let client = mock.client(Session::in_memory()).unwrap();

    let response = client.create_pix_payment(&pix_payment()).await.unwrap();
    assert!(!response.success());
    assert_eq!(response.error(), Some("Erro ao comunicar com o processador"));
}

#[tokio::test]
async fn test_pix_defaults_method_and_exposes_qr_code() {
    let mock = MockBackend::start(vec![MockRoute::json(
        "POST",
        "/api/payments/process_pix",
        201,
        json!({
            "success": true,
            "data": {
                "paymentId": "98765",
                "status": "pending",
                "qrCode": "00020126580014br.gov.bcb.pix",
                "qrCodeBase64": "iVBORw0KGgo=",
                "ticketUrl": "https://pagamento.exemplo.com/pix/98765"
            }
        }),
    )])
    .await
    .unwrap();
    let client = mock.client(Session::in_memory()).unwrap();

    let response = client.create_pix_payment(&pix_payment()).await.unwrap();
    assert_eq!(response.payment_id().as_deref(), Some("98765"));
    assert_eq!(response.status(), Some(PaymentStatus::Pending));
    assert_eq!(response.qr_code(), Some("00020126580014br.gov.bcb.pix"));
    assert_eq!(
        response.ticket_url(),
        Some("https://pagamento.exemplo.com/pix/98765")
    );

    let body = mock.last_request().unwrap().body.unwrap();
    assert_eq!(body["payment_method_id"], "pix");
    assert_eq!(body["payer"]["identification"]["type"], "CNPJ");
}

#[tokio::test]
async fn test_invalid_payment_sends_nothing() {
    let mock = MockBackend::start(Vec::new()).await.unwrap();
    let client = mock.client(Session::in_memory()).unwrap();

    let mut data = card_payment();
    data.token = None;
    data.payer.identification = Some(Identification::cpf("52998224724"));

    let problems = match client.create_card_payment(&data).await.unwrap_err() {
        ApiError::InvalidPayment(problems) => problems,
        other => panic!("expected InvalidPayment, got {other:?}"),
    };
    assert_eq!(
        problems,
        vec![
            "payer identification number is not a valid CPF".to_string(),
            "card token is required".to_string(),
        ]
    );
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_payment_status_lookup() {
    let mock = MockBackend::start(vec![
        MockRoute::json(
            "GET",
            "/api/payments/98765",
            200,
            json!({"success": true, "data": {"id": 98_765, "status": "approved"}}),
        ),
        MockRoute::json(
            "GET",
            "/api/payments/methods",
            200,
            json!({"success": true, "data": [{"id": "pix"}, {"id": "visa"}]}),
        ),
    ])
    .await
    .unwrap();
    let client = mock.client(Session::in_memory()).unwrap();

    let status = client.get_payment_status("98765").await.unwrap();
    assert!(status.is_approved());
    assert_eq!(status.payment_id().as_deref(), Some("98765"));

    let unknown = client.get_payment_status("0").await.unwrap();
    assert!(!unknown.success());
    assert_eq!(unknown.error(), Some("Not found"));

    let methods = client.get_payment_methods().await.unwrap();
    assert_eq!(methods["data"][1]["id"], "visa");
}
