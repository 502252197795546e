use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{Duration, Utc};
use log::*;
use serde_json::{json, Value};
use wappi_engine::{db_types::Order, notifications::NotificationHub, OrderFlowApi};

use super::{
    helpers::{customer_token, get_request, issue_token, manager_token, patch_request, post_request},
    mocks::{order, MockDatabase, ORDER_ID},
};
use crate::{
    auth::{JwtClaims, Role},
    routes::{CreateOrderRoute, MyOrdersRoute, OrderByIdRoute, UpdateStatusRoute},
};

fn orders_api(db: MockDatabase) -> OrderFlowApi<MockDatabase> {
    // The hub is not running, so notifications are dropped with a warning
    let hub = NotificationHub::new(4);
    OrderFlowApi::new(db, hub.handle(), "http://localhost:5173")
}

fn configure_my_orders(cfg: &mut ServiceConfig) {
    let mut db = MockDatabase::new();
    db.expect_fetch_orders_for_user().returning(|user_id| Ok(vec![order(Some(user_id)), order(Some(user_id))]));
    cfg.service(MyOrdersRoute::<MockDatabase>::new()).app_data(web::Data::new(orders_api(db)));
}

#[actix_web::test]
async fn fetch_my_orders_without_a_token() {
    let _ = env_logger::try_init();
    let err = get_request("", "/orders/mine", configure_my_orders).await.expect_err("Expected error");
    info!("Error: {err}");
}

#[actix_web::test]
async fn fetch_my_orders_with_an_expired_token() {
    let _ = env_logger::try_init();
    let token = issue_token(JwtClaims::new("alice", &[Role::User]), Utc::now() - Duration::hours(1));
    let err = get_request(&token, "/orders/mine", configure_my_orders).await.expect_err("Expected error");
    info!("Error: {err}");
}

#[actix_web::test]
async fn fetch_my_orders() {
    let _ = env_logger::try_init();
    let token = customer_token("alice");
    let (status, body) = get_request(&token, "/orders/mine", configure_my_orders).await.expect("Failed to get orders");
    assert_eq!(status, StatusCode::OK);
    let orders: Vec<Order> = serde_json::from_str(&body).expect("Failed to parse orders");
    assert_eq!(orders.len(), 2);
    assert!(orders.iter().all(|o| o.user_id.as_deref() == Some("alice")));
}

fn configure_order_by_id(cfg: &mut ServiceConfig) {
    let mut db = MockDatabase::new();
    db.expect_fetch_order().returning(|_| Ok(Some(order(Some("alice")))));
    cfg.service(OrderByIdRoute::<MockDatabase>::new()).app_data(web::Data::new(orders_api(db)));
}

#[actix_web::test]
async fn customers_see_their_own_order() {
    let _ = env_logger::try_init();
    let path = format!("/orders/{ORDER_ID}");
    let (status, body) = get_request(&customer_token("alice"), &path, configure_order_by_id).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let order: Order = serde_json::from_str(&body).unwrap();
    assert_eq!(order.id.as_str(), ORDER_ID);
}

#[actix_web::test]
async fn customers_cannot_see_other_orders() {
    let _ = env_logger::try_init();
    let path = format!("/orders/{ORDER_ID}");
    let (status, body) = get_request(&customer_token("bob"), &path, configure_order_by_id).await.unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("auth:forbidden"));
}

#[actix_web::test]
async fn managers_see_any_order() {
    let _ = env_logger::try_init();
    let path = format!("/orders/{ORDER_ID}");
    let (status, _) = get_request(&manager_token(), &path, configure_order_by_id).await.unwrap();
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn malformed_order_ids_are_rejected() {
    let _ = env_logger::try_init();
    let (status, body) = get_request(&manager_token(), "/orders/not-a-uuid", configure_order_by_id).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["code"], "order:invalid-id");
}

fn configure_create_order(cfg: &mut ServiceConfig) {
    let mut db = MockDatabase::new();
    db.expect_insert_order().returning(|new_order| {
        let mut stored = order(None);
        stored.user_id = new_order.user_id;
        stored.data.items = new_order.items;
        Ok(stored)
    });
    cfg.service(CreateOrderRoute::<MockDatabase>::new()).app_data(web::Data::new(orders_api(db)));
}

#[actix_web::test]
async fn customers_create_orders_for_themselves() {
    let _ = env_logger::try_init();
    let body = json!({
        "user_id": "mallory",
        "items": [{ "name": "Pan", "price": 1200.0, "quantity": 3 }]
    });
    let (status, body) = post_request(&customer_token("alice"), "/orders", body, configure_create_order).await.unwrap();
    assert_eq!(status, StatusCode::CREATED);
    let order: Order = serde_json::from_str(&body).unwrap();
    assert_eq!(order.user_id.as_deref(), Some("alice"));
    assert_eq!(order.data.items[0].quantity, 3);
}

#[actix_web::test]
async fn managers_create_orders_on_behalf_of_customers() {
    let _ = env_logger::try_init();
    let body = json!({
        "user_id": "carol",
        "items": [{ "name": "Leche", "price": 4500.0 }]
    });
    let (status, body) = post_request(&manager_token(), "/orders", body, configure_create_order).await.unwrap();
    assert_eq!(status, StatusCode::CREATED);
    let order: Order = serde_json::from_str(&body).unwrap();
    assert_eq!(order.user_id.as_deref(), Some("carol"));
}

fn configure_update_status(cfg: &mut ServiceConfig) {
    let mut db = MockDatabase::new();
    db.expect_update_order_status().returning(|_, status| {
        let mut updated = order(Some("alice"));
        updated.status = status;
        Ok(Some(updated))
    });
    cfg.service(UpdateStatusRoute::<MockDatabase>::new()).app_data(web::Data::new(orders_api(db)));
}

#[actix_web::test]
async fn managers_move_orders_along() {
    let _ = env_logger::try_init();
    let path = format!("/orders/{ORDER_ID}/status");
    let (status, body) =
        patch_request(&manager_token(), &path, json!({"status": "ON_THE_WAY"}), configure_update_status).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["status"], "ON_THE_WAY");
}

#[actix_web::test]
async fn unknown_statuses_are_rejected() {
    let _ = env_logger::try_init();
    let path = format!("/orders/{ORDER_ID}/status");
    let (status, body) =
        patch_request(&manager_token(), &path, json!({"status": "LOST"}), configure_update_status).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["code"], "order:invalid-status");
}

#[actix_web::test]
async fn customers_cannot_change_status() {
    let _ = env_logger::try_init();
    let path = format!("/orders/{ORDER_ID}/status");
    let err = patch_request(&customer_token("alice"), &path, json!({"status": "DELIVERED"}), configure_update_status)
        .await
        .expect_err("Expected error");
    assert!(err.contains("Insufficient permissions"));
}
