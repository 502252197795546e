use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use chrono::Utc;
use serde_json::{json, Value};
use wappi_engine::{
    db_types::{ImportData, ImportRecord},
    notifications::NotificationHub,
    traits::SettingsApiError,
    ImportApi,
    OrderFlowApi,
    SettingsApi,
};

use super::{
    helpers::{
        authenticated_request,
        customer_token,
        delete_request,
        get_request,
        manager_token,
        patch_request,
        post_request,
    },
    mocks::{order, settings, MockDatabase, ORDER_ID},
};
use crate::routes::{
    AllOrdersRoute,
    DeleteImportRecordRoute,
    DeleteImportRecordsRoute,
    DeliveryFeeRoute,
    ImportRecordsRoute,
    SettingsRoute,
    UpdateOrderRoute,
    UpdateSettingsRoute,
    UploadImportRoute,
};

fn record(name: &str, price: &str) -> ImportRecord {
    let data: ImportData = [
        ("Nombre".to_string(), Value::String(name.into())),
        ("Precio".to_string(), Value::String(price.into())),
    ]
    .into_iter()
    .collect();
    ImportRecord {
        id: format!("rec-{name}"),
        data,
        profile_id: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn configure_imports(cfg: &mut ServiceConfig) {
    let mut db = MockDatabase::new();
    db.expect_fetch_import_records().returning(|| Ok(vec![record("Pan", "1.200"), record("Leche", "4500")]));
    db.expect_delete_import_record().returning(|id| Ok(id == "rec-Pan"));
    db.expect_delete_all_import_records().returning(|| Ok(2));
    db.expect_insert_import_record().times(0);
    cfg.service(ImportRecordsRoute::<MockDatabase>::new())
        .service(DeleteImportRecordsRoute::<MockDatabase>::new())
        .service(UploadImportRoute::<MockDatabase>::new())
        .service(DeleteImportRecordRoute::<MockDatabase>::new())
        .app_data(web::Data::new(ImportApi::new(db)));
}

#[actix_web::test]
async fn managers_list_import_records() {
    let _ = env_logger::try_init();
    let (status, body) = get_request(&manager_token(), "/admin/imports", configure_imports).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let records: Vec<ImportRecord> = serde_json::from_str(&body).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].data["Nombre"], "Pan");
}

#[actix_web::test]
async fn customers_cannot_list_import_records() {
    let _ = env_logger::try_init();
    let err = get_request(&customer_token("alice"), "/admin/imports", configure_imports)
        .await
        .expect_err("Expected error");
    assert!(err.contains("Insufficient permissions"));
}

#[actix_web::test]
async fn deleting_import_records() {
    let _ = env_logger::try_init();
    let (status, _) = delete_request(&manager_token(), "/admin/imports/rec-Pan", configure_imports).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let (status, body) = delete_request(&manager_token(), "/admin/imports/rec-Nada", configure_imports).await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["code"], "import:not-found");
    let (status, body) = delete_request(&manager_token(), "/admin/imports", configure_imports).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({"deleted": 2}));
}

#[actix_web::test]
async fn uploads_that_are_not_workbooks_are_rejected() {
    let _ = env_logger::try_init();
    let req = TestRequest::post()
        .uri("/admin/imports/upload?profile_id=panaderia")
        .insert_header(("content-type", "application/octet-stream"))
        .set_payload("this is not a spreadsheet");
    let (status, body) = authenticated_request(req, &manager_token(), configure_imports).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["code"], "import:file-parse-error");
}

#[actix_web::test]
async fn empty_uploads_are_rejected() {
    let _ = env_logger::try_init();
    let req = TestRequest::post().uri("/admin/imports/upload");
    let (status, _) = authenticated_request(req, &manager_token(), configure_imports).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

fn configure_admin_orders(cfg: &mut ServiceConfig) {
    let mut db = MockDatabase::new();
    db.expect_fetch_orders().returning(|| Ok(vec![order(Some("alice")), order(None)]));
    db.expect_update_order().returning(|_, update| {
        let mut updated = order(Some("alice"));
        if let Some(eta) = update.eta {
            updated.eta = Some(eta);
        }
        Ok(Some(updated))
    });
    let hub = NotificationHub::new(4);
    cfg.service(AllOrdersRoute::<MockDatabase>::new())
        .service(UpdateOrderRoute::<MockDatabase>::new())
        .app_data(web::Data::new(OrderFlowApi::new(db, hub.handle(), "http://localhost:5173")));
}

#[actix_web::test]
async fn managers_list_every_order() {
    let _ = env_logger::try_init();
    let (status, body) = get_request(&manager_token(), "/admin/orders", configure_admin_orders).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let orders: Vec<Value> = serde_json::from_str(&body).unwrap();
    assert_eq!(orders.len(), 2);
}

#[actix_web::test]
async fn admin_order_updates() {
    let _ = env_logger::try_init();
    let path = format!("/admin/orders/{ORDER_ID}");
    let (status, body) =
        patch_request(&manager_token(), &path, json!({"eta": "10 min"}), configure_admin_orders).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["eta"], "10 min");

    let (status, body) = patch_request(&manager_token(), &path, json!({}), configure_admin_orders).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["code"], "order:empty-update");
}

fn configure_settings(cfg: &mut ServiceConfig) {
    let mut db = MockDatabase::new();
    db.expect_fetch_settings().returning(|| Ok(settings()));
    db.expect_update_settings().returning(|update| {
        let mut current = settings();
        if let Some(name) = update.business_name {
            current.business_name = name;
        }
        Ok(current)
    });
    cfg.service(SettingsRoute::<MockDatabase>::new())
        .service(UpdateSettingsRoute::<MockDatabase>::new())
        .service(DeliveryFeeRoute::<MockDatabase>::new())
        .app_data(web::Data::new(SettingsApi::new(db)));
}

fn configure_missing_settings(cfg: &mut ServiceConfig) {
    let mut db = MockDatabase::new();
    db.expect_fetch_settings().returning(|| Err(SettingsApiError::SettingsNotFound));
    cfg.service(SettingsRoute::<MockDatabase>::new()).app_data(web::Data::new(SettingsApi::new(db)));
}

#[actix_web::test]
async fn managers_read_and_update_settings() {
    let _ = env_logger::try_init();
    let (status, body) = get_request(&manager_token(), "/admin/settings", configure_settings).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["default_map_zoom"], 13);

    let update = json!({"business_name": "Panadería La Esquina"});
    let (status, body) = patch_request(&manager_token(), "/admin/settings", update, configure_settings).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["business_name"], "Panadería La Esquina");
}

#[actix_web::test]
async fn invalid_settings_are_rejected() {
    let _ = env_logger::try_init();
    let update = json!({"delivery_base_price": -100.0});
    let (status, body) = patch_request(&manager_token(), "/admin/settings", update, configure_settings).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["code"], "settings:invalid");
}

#[actix_web::test]
async fn missing_settings_are_not_found() {
    let _ = env_logger::try_init();
    let (status, _) = get_request(&manager_token(), "/admin/settings", configure_missing_settings).await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn anyone_signed_in_can_quote_a_delivery_fee() {
    let _ = env_logger::try_init();
    // Delivering to the business itself leaves the base price plus the weight charge
    let body = json!({
        "location": { "latitude": 4.711, "longitude": -74.0721 },
        "items": [{ "name": "Harina", "price": 5000.0, "quantity": 2, "weight": 3 }]
    });
    let (status, body) =
        post_request(&customer_token("alice"), "/delivery_fee", body, configure_settings).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["fee"], 6000.0);
}

#[actix_web::test]
async fn fee_quotes_reject_bad_input() {
    let _ = env_logger::try_init();
    let off_the_map = json!({ "location": { "latitude": 120.0, "longitude": -74.0721 }, "items": [] });
    let (status, body) =
        post_request(&customer_token("alice"), "/delivery_fee", off_the_map, configure_settings).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["code"], "delivery:invalid");

    let negative = json!({
        "location": { "latitude": 4.711, "longitude": -74.0721 },
        "items": [{ "name": "Harina", "price": 5000.0, "quantity": -50 }]
    });
    let (status, body) =
        post_request(&customer_token("alice"), "/delivery_fee", negative, configure_settings).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["code"], "delivery:invalid");
}
