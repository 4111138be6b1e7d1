mod common;

use std::str::FromStr;

use axum::http::{Method, StatusCode};
use common::{json_body, TestApp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

async fn define(app: &TestApp, table: &str, name: &str, kind: &str, extra: Value) -> Value {
    let mut body = json!({
        "table_name": table,
        "field_name": name,
        "field_label": name,
        "field_type": kind,
    });
    if let (Some(body), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
        body.extend(extra.clone());
    }
    app.data(
        Method::POST,
        "/api/custom-fields",
        Some(body),
        StatusCode::CREATED,
    )
    .await
}

fn form_field<'a>(form: &'a Value, name: &str) -> Option<&'a Value> {
    form["sections"]
        .as_array()?
        .iter()
        .flat_map(|s| s["fields"].as_array().into_iter().flatten())
        .find(|f| f["field_name"] == name)
}

fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).expect("decimal string"),
        other => Decimal::from_str(&other.to_string()).expect("decimal number"),
    }
}

#[tokio::test]
async fn custom_data_round_trips_through_the_store() {
    let app = TestApp::new().await;
    define(&app, "customers", "Loyalty Tier", "text", json!({})).await;
    define(&app, "customers", "Visits", "number", json!({})).await;
    define(&app, "customers", "VIP", "boolean", json!({})).await;
    define(&app, "customers", "Birthday", "date", json!({})).await;

    let bag = json!({
        "loyalty_tier": "Gold",
        "visits": 3,
        "vip": true,
        "birthday": "1990-05-01",
    });
    let created = app
        .data(
            Method::POST,
            "/api/customers",
            Some(json!({"name": "Ada Lovelace", "email": "ada@example.com", "custom_data": bag})),
            StatusCode::CREATED,
        )
        .await;
    assert_eq!(created["custom_data"], bag);
    assert_eq!(created["version"], 1);

    let fetched = app
        .data(
            Method::GET,
            &format!("/api/customers/{}", created["id"].as_str().unwrap()),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(fetched["custom_data"], bag);
}

#[tokio::test]
async fn serial_number_appears_in_the_phone_form_and_is_prefilled() {
    let app = TestApp::new().await;
    define(&app, "phones", "Serial Number", "text", json!({})).await;

    let blank = app
        .data(Method::GET, "/api/forms/phones", None, StatusCode::OK)
        .await;
    let serial = form_field(&blank, "serial_number").expect("serial number in blank form");
    assert_eq!(serial["control"]["type"], "text_input");
    assert_eq!(serial["is_system"], false);
    assert_eq!(serial["value"], Value::Null);

    let phone = app
        .data(
            Method::POST,
            "/api/phones",
            Some(json!({
                "brand": "Apple",
                "model": "iPhone 13",
                "price": 450,
                "custom_data": {"serial_number": "SN12345"},
            })),
            StatusCode::CREATED,
        )
        .await;
    assert_eq!(phone["custom_data"]["serial_number"], "SN12345");

    let form = app
        .data(
            Method::GET,
            &format!("/api/forms/phones/{}", phone["id"].as_str().unwrap()),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(form["record_id"], phone["id"]);
    assert_eq!(form_field(&form, "serial_number").unwrap()["value"], "SN12345");
    assert_eq!(form_field(&form, "brand").unwrap()["value"], "Apple");

    let sections: Vec<&str> = form["sections"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|s| s["name"].as_str())
        .collect();
    assert_eq!(sections, vec!["Device", "Pricing", "Details", "General"]);
}

#[tokio::test]
async fn select_values_must_be_one_of_the_options() {
    let app = TestApp::new().await;
    define(
        &app,
        "orders",
        "Warranty Tier",
        "select",
        json!({"options": ["Basic", "Extended"]}),
    )
    .await;

    let order = app
        .data(
            Method::POST,
            "/api/orders",
            Some(json!({"custom_data": {"warranty_tier": "Extended"}})),
            StatusCode::CREATED,
        )
        .await;
    assert_eq!(order["custom_data"]["warranty_tier"], "Extended");

    let (status, body) = app
        .call(
            Method::POST,
            "/api/orders",
            Some(json!({"custom_data": {"warranty_tier": "Premium"}})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("warranty_tier"));

    let form = app
        .data(
            Method::GET,
            &format!("/api/forms/orders/{}", order["id"].as_str().unwrap()),
            None,
            StatusCode::OK,
        )
        .await;
    let tier = form_field(&form, "warranty_tier").unwrap();
    assert_eq!(tier["control"]["type"], "select");
    assert_eq!(tier["control"]["options"], json!(["Basic", "Extended"]));
    assert_eq!(tier["value"], "Extended");
}

#[tokio::test]
async fn strict_mode_rejects_unknown_keys_and_missing_required_fields() {
    let app = TestApp::new().await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/inquiries",
            Some(json!({
                "name": "Grace",
                "message": "Do you have a Pixel 7?",
                "custom_data": {"budget": 300},
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("budget"));

    define(&app, "inquiries", "Budget", "number", json!({"required": true})).await;

    let (status, _) = app
        .call(
            Method::POST,
            "/api/inquiries",
            Some(json!({"name": "Grace", "message": "Do you have a Pixel 7?"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(
            Method::POST,
            "/api/inquiries",
            Some(json!({
                "name": "Grace",
                "message": "Do you have a Pixel 7?",
                "custom_data": {"budget": "a lot"},
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    app.data(
        Method::POST,
        "/api/inquiries",
        Some(json!({
            "name": "Grace",
            "message": "Do you have a Pixel 7?",
            "custom_data": {"budget": 300},
        })),
        StatusCode::CREATED,
    )
    .await;
}

#[tokio::test]
async fn lenient_mode_keeps_unknown_keys() {
    let app = TestApp::with_strict(false).await;

    let customer = app
        .data(
            Method::POST,
            "/api/customers",
            Some(json!({
                "name": "Linus",
                "custom_data": {"legacy_ref": "C-0042"},
            })),
            StatusCode::CREATED,
        )
        .await;
    assert_eq!(customer["custom_data"], json!({"legacy_ref": "C-0042"}));
}

#[tokio::test]
async fn update_replaces_the_bag_and_honours_the_version_token() {
    let app = TestApp::new().await;
    define(&app, "customers", "Loyalty Tier", "text", json!({})).await;
    define(&app, "customers", "Visits", "number", json!({})).await;

    let customer = app
        .data(
            Method::POST,
            "/api/customers",
            Some(json!({
                "name": "Ada",
                "custom_data": {"loyalty_tier": "Gold", "visits": 1},
            })),
            StatusCode::CREATED,
        )
        .await;
    let uri = format!("/api/customers/{}", customer["id"].as_str().unwrap());

    let updated = app
        .data(
            Method::PUT,
            &uri,
            Some(json!({"version": 1, "custom_data": {"visits": 2}})),
            StatusCode::OK,
        )
        .await;
    assert_eq!(updated["version"], 2);
    assert_eq!(updated["name"], "Ada");
    assert_eq!(updated["custom_data"], json!({"visits": 2}));

    let (status, body) = app
        .call(
            Method::PUT,
            &uri,
            Some(json!({"version": 1, "notes": "stale edit"})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Conflict");

    let untouched = app
        .data(
            Method::PUT,
            &uri,
            Some(json!({"notes": "last write wins"})),
            StatusCode::OK,
        )
        .await;
    assert_eq!(untouched["version"], 3);
    assert_eq!(untouched["custom_data"], json!({"visits": 2}));
}

#[tokio::test]
async fn order_total_defaults_to_phone_price_times_quantity() {
    let app = TestApp::new().await;
    let phone = app
        .data(
            Method::POST,
            "/api/phones",
            Some(json!({"brand": "Samsung", "model": "Galaxy S21", "price": "300.00"})),
            StatusCode::CREATED,
        )
        .await;
    let customer = app
        .data(
            Method::POST,
            "/api/customers",
            Some(json!({"name": "Ada"})),
            StatusCode::CREATED,
        )
        .await;

    let order = app
        .data(
            Method::POST,
            "/api/orders",
            Some(json!({
                "customer_id": customer["id"],
                "phone_id": phone["id"],
                "quantity": 2,
            })),
            StatusCode::CREATED,
        )
        .await;
    assert_eq!(decimal(&order["total_amount"]), dec!(600));
    assert_eq!(order["status"], "pending");

    let (status, _) = app
        .call(
            Method::POST,
            "/api/orders",
            Some(json!({"customer_id": uuid::Uuid::new_v4()})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let listed = app
        .data(
            Method::GET,
            &format!("/api/orders?customer_id={}", customer["id"].as_str().unwrap()),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(listed["total"], 1);
}

#[tokio::test]
async fn phone_list_filters_and_paginates() {
    let app = TestApp::new().await;
    for (brand, model, status) in [
        ("Apple", "iPhone 12", "available"),
        ("Apple", "iPhone 13", "sold"),
        ("Apple", "iPhone 14", "available"),
        ("Google", "Pixel 7", "available"),
    ] {
        app.data(
            Method::POST,
            "/api/phones",
            Some(json!({"brand": brand, "model": model, "price": 200, "status": status})),
            StatusCode::CREATED,
        )
        .await;
    }

    let page = app
        .data(
            Method::GET,
            "/api/phones?brand=Apple&limit=2",
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(page["total"], 3);
    assert_eq!(page["total_pages"], 2);
    assert_eq!(page["items"].as_array().unwrap().len(), 2);

    let available = app
        .data(
            Method::GET,
            "/api/phones?search=iPhone&status=available",
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(available["total"], 2);

    let (status, _) = app
        .call(Method::GET, "/api/phones?status=lost", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleted_records_are_gone() {
    let app = TestApp::new().await;
    let inquiry = app
        .data(
            Method::POST,
            "/api/inquiries",
            Some(json!({"name": "Grace", "message": "Trade-in price for a Pixel 6?"})),
            StatusCode::CREATED,
        )
        .await;
    let id = inquiry["id"].as_str().unwrap();

    app.data(
        Method::DELETE,
        &format!("/api/inquiries/{}", id),
        None,
        StatusCode::OK,
    )
    .await;

    let (status, _) = app
        .call(Method::GET, &format!("/api/inquiries/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .call(Method::GET, &format!("/api/forms/inquiries/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .call(Method::DELETE, &format!("/api/inquiries/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn hidden_fields_leave_the_form_but_keep_their_data() {
    let app = TestApp::new().await;
    define(&app, "phones", "Serial Number", "text", json!({})).await;
    let serial = app.config_id("phones", "serial_number").await;

    app.data(
        Method::PATCH,
        &format!("/api/field-config/{}", serial),
        Some(json!({"is_visible": false})),
        StatusCode::OK,
    )
    .await;

    let phone = app
        .data(
            Method::POST,
            "/api/phones",
            Some(json!({
                "brand": "Apple",
                "model": "iPhone 11",
                "price": 180,
                "custom_data": {"serial_number": "SN999"},
            })),
            StatusCode::CREATED,
        )
        .await;
    let form = app
        .data(
            Method::GET,
            &format!("/api/forms/phones/{}", phone["id"].as_str().unwrap()),
            None,
            StatusCode::OK,
        )
        .await;
    assert!(form_field(&form, "serial_number").is_none());
    assert_eq!(phone["custom_data"]["serial_number"], "SN999");
}

#[tokio::test]
async fn hidden_required_fields_do_not_block_creates() {
    let app = TestApp::new().await;
    define(&app, "phones", "Serial Number", "text", json!({"required": true})).await;
    let phone = json!({"brand": "Google", "model": "Pixel 7", "price": 320});

    let (status, body) = app
        .call(Method::POST, "/api/phones", Some(phone.clone()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Serial Number"));

    let serial = app.config_id("phones", "serial_number").await;
    app.data(
        Method::PATCH,
        &format!("/api/field-config/{}", serial),
        Some(json!({"is_visible": false})),
        StatusCode::OK,
    )
    .await;

    let form = app
        .data(Method::GET, "/api/forms/phones", None, StatusCode::OK)
        .await;
    assert!(form_field(&form, "serial_number").is_none());

    let created = app
        .data(Method::POST, "/api/phones", Some(phone), StatusCode::CREATED)
        .await;
    assert_eq!(created["custom_data"], json!({}));
}

#[tokio::test]
async fn order_totals_that_overflow_are_rejected() {
    let app = TestApp::new().await;

    let (status, _) = app
        .call(
            Method::POST,
            "/api/phones",
            Some(json!({"brand": "Apple", "model": "iPhone 15", "price": "100000000000000000000"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let phone = app
        .data(
            Method::POST,
            "/api/phones",
            Some(json!({"brand": "Apple", "model": "iPhone 15", "price": "9999999999.99"})),
            StatusCode::CREATED,
        )
        .await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/orders",
            Some(json!({"phone_id": phone["id"], "quantity": 2})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);

    let (status, _) = app
        .call(
            Method::POST,
            "/api/orders",
            Some(json!({"phone_id": phone["id"], "quantity": 1_000_000_000})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let listed = app
        .data(Method::GET, "/api/orders", None, StatusCode::OK)
        .await;
    assert_eq!(listed["total"], 0);
}

#[tokio::test]
async fn health_and_request_ids() {
    let app = TestApp::new().await;

    let (status, body) = app.call(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "up");

    let (status, body) = app.call(Method::GET, "/health/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["details"]["database"]["status"], "up");

    let response = app
        .request(
            Method::GET,
            &format!("/api/phones/{}", uuid::Uuid::new_v4()),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let header = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .expect("request id header");
    let body = json_body(response).await;
    assert_eq!(body["request_id"], header);
}
