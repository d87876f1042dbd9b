//! Resource service tests against the in-memory transport.

use std::sync::Arc;

use chrono::NaiveDate;
use finboard_api::mock::MockTransport;
use finboard_api::transport::{MultipartPart, RequestBody};
use finboard_api::{
    ApiClient, ApiConfig, ApiError, BillService, CategoryService, CreditCardService,
    InvoiceService, TransportError, UnifiedService,
};
use finboard_core::bills::{BillFilter, NewBill};
use finboard_core::categories::CategoryFilter;
use finboard_core::invoices::{InvoiceFilter, InvoicePayment};
use finboard_core::models::PageRequest;
use finboard_core::unified::DuplicateStrategy;
use rust_decimal_macros::dec;
use serde_json::json;

fn client(mock: &MockTransport) -> ApiClient {
    ApiClient::with_transport(ApiConfig::default(), Arc::new(mock.clone()))
}

fn bill_json(id: i64, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "executionDate": "2024-12-31",
        "totalAmount": 300.0,
        "numberOfInstallments": 3,
        "category": {"id": 2, "name": "Casa"},
        "recurring": false
    })
}

fn page_json(items: Vec<serde_json::Value>) -> serde_json::Value {
    let len = items.len();
    json!({
        "content": items,
        "totalElements": len,
        "totalPages": 1,
        "number": 0,
        "size": 10
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Lists
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_all_sends_defaults_and_drops_absent_keys() {
    let mock = MockTransport::new();
    mock.respond_json("GET", "/bills", 200, page_json(vec![bill_json(1, "Aluguel")]));

    let page = BillService::new(client(&mock))
        .get_all(&BillFilter::default())
        .await
        .unwrap();

    assert_eq!(page.content.len(), 1);
    assert_eq!(page.content[0].execution_date, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());

    let request = mock.last_request().unwrap();
    assert_eq!(request.query_value("page"), Some("0"));
    assert_eq!(request.query_value("size"), Some("10"));
    assert_eq!(request.query_value("sort"), Some("executionDate,desc"));
    assert_eq!(request.query_value("name"), None);
    assert!(request.query.iter().all(|(_, v)| v != "undefined" && !v.is_empty()));
}

#[tokio::test]
async fn explicit_sort_and_filters_are_sent() {
    let mock = MockTransport::new();
    mock.respond_json("GET", "/bills", 200, page_json(Vec::new()));

    let filter = BillFilter::default()
        .with_name("mercado")
        .with_category(4)
        .with_page(PageRequest::new(2, 25).with_sort("totalAmount,asc"));
    BillService::new(client(&mock)).get_all(&filter).await.unwrap();

    let request = mock.last_request().unwrap();
    assert_eq!(request.query_value("name"), Some("mercado"));
    assert_eq!(request.query_value("categoryId"), Some("4"));
    assert_eq!(request.query_value("page"), Some("2"));
    assert_eq!(request.query_value("sort"), Some("totalAmount,asc"));
}

#[tokio::test]
async fn each_entity_has_its_default_sort() {
    let mock = MockTransport::new();
    mock.respond_json("GET", "/categories", 200, page_json(Vec::new()));
    mock.respond_json("GET", "/invoices", 200, page_json(Vec::new()));

    let client = client(&mock);
    CategoryService::new(client.clone())
        .get_all(&CategoryFilter::default())
        .await
        .unwrap();
    assert_eq!(mock.last_request().unwrap().query_value("sort"), Some("name,asc"));

    InvoiceService::new(client)
        .get_all(&InvoiceFilter::for_card(7))
        .await
        .unwrap();
    let request = mock.last_request().unwrap();
    assert_eq!(request.query_value("sort"), Some("referenceMonth,desc"));
    assert_eq!(request.query_value("creditCardId"), Some("7"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Single records and mutations
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_by_id_maps_404_to_not_found() {
    let mock = MockTransport::new();
    mock.respond_json("GET", "/bills/42", 404, json!({"message": "Conta não encontrada"}));

    let err = BillService::new(client(&mock)).get_by_id(42).await.unwrap_err();
    match err {
        ApiError::NotFound { resource, id, message } => {
            assert_eq!(resource, "Bill");
            assert_eq!(id, 42);
            assert_eq!(message, "Conta não encontrada");
        }
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn create_posts_camel_case_payload() {
    let mock = MockTransport::new();
    mock.respond_json("POST", "/bills", 201, bill_json(9, "Notebook"));

    let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
    let mut payload = NewBill::new("Notebook", date, dec!(300));
    payload.number_of_installments = 3;
    let bill = BillService::new(client(&mock)).create(&payload).await.unwrap();
    assert_eq!(bill.id, 9);
    assert_eq!(bill.installment_amount(), dec!(100));

    let request = mock.last_request().unwrap();
    let RequestBody::Json(body) = request.body else {
        panic!("expected a JSON body");
    };
    assert_eq!(body["executionDate"], "2024-12-31");
    assert_eq!(body["numberOfInstallments"], 3);
    assert!(body.get("categoryId").is_none());
}

#[tokio::test]
async fn invalid_payload_never_reaches_the_network() {
    let mock = MockTransport::new();
    let payload = NewBill::new("  ", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), dec!(10));

    let err = BillService::new(client(&mock)).create(&payload).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn server_errors_keep_status_and_message() {
    let mock = MockTransport::new();
    mock.respond_json("PUT", "/bills/3", 422, json!({"message": "Valor inválido"}));

    let payload = NewBill::new("Luz", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), dec!(10));
    let err = BillService::new(client(&mock)).update(3, &payload).await.unwrap_err();
    assert_eq!(err.status(), 422);
    assert_eq!(err.message(), "Valor inválido");
}

#[tokio::test]
async fn network_failures_carry_status_zero() {
    let mock = MockTransport::new();
    mock.fail("DELETE", "/categories/5", TransportError::connect("refused"));

    let err = CategoryService::new(client(&mock)).delete(5).await.unwrap_err();
    assert_eq!(err.status(), 0);
    assert!(matches!(
        err,
        ApiError::Network { cause: TransportError::Connect(_), .. }
    ));
}

// ─────────────────────────────────────────────────────────────────────────────
// Entity-specific endpoints
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn available_limit_endpoint() {
    let mock = MockTransport::new();
    mock.respond_json(
        "GET",
        "/credit-cards/7/available-limit",
        200,
        json!({
            "creditCardId": 7,
            "creditLimit": 5000.0,
            "usedLimit": 1250.0,
            "availableLimit": 3750.0
        }),
    );

    let limit = CreditCardService::new(client(&mock)).available_limit(7).await.unwrap();
    assert_eq!(limit.available_limit, dec!(3750));
    assert_eq!(limit.usage_percent(), dec!(25));
}

#[tokio::test]
async fn pay_invoice_posts_amount() {
    let mock = MockTransport::new();
    mock.respond_json(
        "POST",
        "/invoices/11/pay",
        200,
        json!({
            "id": 11,
            "creditCardId": 7,
            "referenceMonth": "2024-03",
            "totalAmount": 800.0,
            "paid": true
        }),
    );

    let invoice = InvoiceService::new(client(&mock))
        .pay(11, &InvoicePayment::new(dec!(800)))
        .await
        .unwrap();
    assert!(invoice.paid);

    let RequestBody::Json(body) = mock.last_request().unwrap().body else {
        panic!("expected a JSON body");
    };
    assert_eq!(body["amount"], 800.0);

    let err = InvoiceService::new(client(&mock))
        .pay(11, &InvoicePayment::new(dec!(0)))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn import_uploads_file_and_strategy() {
    let mock = MockTransport::new();
    mock.respond_json(
        "POST",
        "/unified/import",
        200,
        json!({"bills": {"processed": 2, "created": 2, "skipped": 0, "errors": 0}}),
    );

    let result = UnifiedService::new(client(&mock))
        .import_data("backup.json", b"{}".to_vec(), DuplicateStrategy::CreateDuplicate)
        .await
        .unwrap();
    assert_eq!(result.total_created(), 2);

    let RequestBody::Multipart(parts) = mock.last_request().unwrap().body else {
        panic!("expected a multipart body");
    };
    assert!(parts.iter().any(|p| matches!(
        p,
        MultipartPart::File { name, file_name, .. } if name == "file" && file_name == "backup.json"
    )));
    assert!(parts.iter().any(|p| matches!(
        p,
        MultipartPart::Text { name, value }
            if name == "duplicateStrategy" && value == "CREATE_DUPLICATE"
    )));
}

#[tokio::test]
async fn empty_import_is_rejected_locally() {
    let mock = MockTransport::new();
    let err = UnifiedService::new(client(&mock))
        .import_data("empty.json", Vec::new(), DuplicateStrategy::Skip)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(_)));
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn export_reads_every_dataset() {
    let mock = MockTransport::new();
    mock.respond_json(
        "GET",
        "/unified/export",
        200,
        json!({
            "categories": [{"id": 2, "name": "Casa"}],
            "bills": [bill_json(1, "Aluguel")],
            "exportedAt": "2024-12-31T10:00:00Z"
        }),
    );

    let export = UnifiedService::new(client(&mock)).export_data().await.unwrap();
    assert_eq!(export.categories.len(), 1);
    assert_eq!(export.bills[0].category_name(), Some("Casa"));
    assert!(export.invoices.is_empty());
}
