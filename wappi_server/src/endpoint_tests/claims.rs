use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use mockall::Sequence;
use serde_json::{json, Value};
use wappi_engine::{
    db_types::Order,
    notifications::{HubClient, NotificationHub},
    order_objects::{ClaimInfo, OrderWithLink},
    OrderFlowApi,
    OrderFlowError,
};

use super::{
    helpers::{customer_token, get_auth_config, manager_token, post_request, public_request},
    mocks::{claim_token, order, MockDatabase, ORDER_ID},
};
use crate::{
    auth::TokenVerifier,
    config::ServerOptions,
    routes::{ClaimInfoRoute, ClaimOrderRoute, CreateOrderWithLinkRoute},
    ws::websocket,
};

fn orders_api(db: MockDatabase) -> OrderFlowApi<MockDatabase> {
    let hub = NotificationHub::new(4);
    OrderFlowApi::new(db, hub.handle(), "https://wappi.example/")
}

fn with_claimable_order(db: &mut MockDatabase, owner: Option<&'static str>) {
    db.expect_fetch_claim_token().returning(|token| Ok((token == "good-token").then(|| claim_token(token))));
    db.expect_fetch_order().returning(move |_| Ok(Some(order(owner))));
}

fn configure_unclaimed(cfg: &mut ServiceConfig) {
    let mut db = MockDatabase::new();
    with_claimable_order(&mut db, None);
    db.expect_assign_user().times(1).returning(|_, _| Ok(true));
    cfg.service(ClaimInfoRoute::<MockDatabase>::new())
        .service(ClaimOrderRoute::<MockDatabase>::new())
        .app_data(web::Data::new(orders_api(db)));
}

fn configure_claimed_by_alice(cfg: &mut ServiceConfig) {
    let mut db = MockDatabase::new();
    with_claimable_order(&mut db, Some("alice"));
    db.expect_assign_user().times(0);
    cfg.service(ClaimInfoRoute::<MockDatabase>::new())
        .service(ClaimOrderRoute::<MockDatabase>::new())
        .app_data(web::Data::new(orders_api(db)));
}

#[actix_web::test]
async fn claim_info_is_public() {
    let _ = env_logger::try_init();
    let req = TestRequest::get().uri("/api/claim/good-token");
    let (status, body) = public_request(req, configure_unclaimed).await;
    assert_eq!(status, StatusCode::OK);
    let info: ClaimInfo = serde_json::from_str(&body).unwrap();
    assert_eq!(info.order_id, ORDER_ID);
    assert!(!info.is_claimed);
}

#[actix_web::test]
async fn unknown_claim_tokens_are_not_found() {
    let _ = env_logger::try_init();
    let req = TestRequest::get().uri("/api/claim/bad-token");
    let (status, body) = public_request(req, configure_unclaimed).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["code"], "order:claim-not-found");
}

#[actix_web::test]
async fn first_claim_assigns_the_order() {
    let _ = env_logger::try_init();
    let token = customer_token("alice");
    let (status, body) =
        post_request(&token, "/orders/claim/good-token", json!({}), configure_unclaimed).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    // The mock store always hands back the unclaimed order, so only the status is meaningful here
    let _order: Order = serde_json::from_str(&body).unwrap();
}

#[actix_web::test]
async fn claiming_your_own_order_again_is_fine() {
    let _ = env_logger::try_init();
    let token = customer_token("alice");
    let (status, body) =
        post_request(&token, "/orders/claim/good-token", json!({}), configure_claimed_by_alice).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let order: Order = serde_json::from_str(&body).unwrap();
    assert_eq!(order.user_id.as_deref(), Some("alice"));
}

#[actix_web::test]
async fn claiming_someone_elses_order_conflicts() {
    let _ = env_logger::try_init();
    let token = customer_token("bob");
    let (status, body) =
        post_request(&token, "/orders/claim/good-token", json!({}), configure_claimed_by_alice).await.unwrap();
    assert_eq!(status, StatusCode::CONFLICT);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["code"], "order:already-claimed");
}

/// The order looks unclaimed when read, but bob's claim lands before ours does.
fn claim_race_lost_to_bob() -> MockDatabase {
    let mut db = MockDatabase::new();
    let mut seq = Sequence::new();
    db.expect_fetch_claim_token().returning(|token| Ok(Some(claim_token(token))));
    db.expect_fetch_order().times(1).in_sequence(&mut seq).returning(|_| Ok(Some(order(None))));
    db.expect_assign_user().times(1).in_sequence(&mut seq).returning(|_, _| Ok(false));
    db.expect_fetch_order().times(1).in_sequence(&mut seq).returning(|_| Ok(Some(order(Some("bob")))));
    db
}

fn configure_claim_race(cfg: &mut ServiceConfig) {
    cfg.service(ClaimOrderRoute::<MockDatabase>::new()).app_data(web::Data::new(orders_api(claim_race_lost_to_bob())));
}

#[actix_web::test]
async fn losing_a_claim_race_conflicts_without_notifying() {
    let _ = env_logger::try_init();
    let hub = NotificationHub::new(4);
    let handle = hub.handle();
    tokio::spawn(hub.run());
    let (dashboard, mut rx) = HubClient::new(None, true, 4);
    handle.register(dashboard).await;

    let api = OrderFlowApi::new(claim_race_lost_to_bob(), handle.clone(), "https://wappi.example/");
    let err = api.claim_order("good-token", "alice").await.unwrap_err();
    assert!(matches!(err, OrderFlowError::AlreadyClaimed(_)));
    // The hub handles commands in order, so any notification would already be queued
    assert_eq!(handle.client_count().await, 1);
    assert!(rx.try_recv().is_err());
}

#[actix_web::test]
async fn losing_a_claim_race_is_reported_as_conflict() {
    let _ = env_logger::try_init();
    let token = customer_token("alice");
    let (status, body) =
        post_request(&token, "/orders/claim/good-token", json!({}), configure_claim_race).await.unwrap();
    assert_eq!(status, StatusCode::CONFLICT);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["code"], "order:already-claimed");
}

fn configure_create_with_link(cfg: &mut ServiceConfig) {
    let mut db = MockDatabase::new();
    db.expect_insert_order().returning(|new_order| {
        let mut stored = order(None);
        stored.data.items = new_order.items;
        Ok(stored)
    });
    db.expect_insert_claim_token().returning(|token, _| Ok(claim_token(token)));
    cfg.service(CreateOrderWithLinkRoute::<MockDatabase>::new()).app_data(web::Data::new(orders_api(db)));
}

#[actix_web::test]
async fn managers_create_claim_links() {
    let _ = env_logger::try_init();
    let body = json!({ "user_id": "ignored", "items": [{ "name": "Pan", "price": 1200.0 }] });
    let (status, body) = post_request(&manager_token(), "/orders/link", body, configure_create_with_link).await.unwrap();
    assert_eq!(status, StatusCode::CREATED);
    let result: OrderWithLink = serde_json::from_str(&body).unwrap();
    assert_eq!(result.link, format!("https://wappi.example/claim/{}", result.token));
    assert!(result.order.user_id.is_none());
}

#[actix_web::test]
async fn customers_cannot_create_claim_links() {
    let _ = env_logger::try_init();
    let body = json!({ "items": [] });
    let err = post_request(&customer_token("alice"), "/orders/link", body, configure_create_with_link)
        .await
        .expect_err("Expected error");
    assert!(err.contains("Insufficient permissions"));
}

fn configure_websocket(cfg: &mut ServiceConfig) {
    let hub = NotificationHub::new(4);
    cfg.service(websocket)
        .app_data(web::Data::new(hub.handle()))
        .app_data(web::Data::new(TokenVerifier::new(&get_auth_config())))
        .app_data(web::Data::new(ServerOptions::default()));
}

#[actix_web::test]
async fn websocket_requires_a_token() {
    let _ = env_logger::try_init();
    let (status, body) = public_request(TestRequest::get().uri("/ws"), configure_websocket).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("auth:invalid-token"));
}

#[actix_web::test]
async fn websocket_rejects_forged_tokens() {
    let _ = env_logger::try_init();
    let (status, _) = public_request(TestRequest::get().uri("/ws?token=abc.def.ghi"), configure_websocket).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn websocket_needs_an_upgrade_request() {
    let _ = env_logger::try_init();
    let uri = format!("/ws?token={}", manager_token());
    let (status, _) = public_request(TestRequest::get().uri(&uri), configure_websocket).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
