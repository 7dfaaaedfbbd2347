use std::sync::Arc;

use actix_web::{http::StatusCode, web, web::ServiceConfig};
use sales_common::Secret;
use sales_engine::{
    db_types::ARP_COMMERCE,
    helpers::LocalClock,
    live::{Broadcaster, ConnectionRegistry},
    test_utils::{
        prepare_env::{drop_database, prepare_test_env, random_db_path},
        ScriptedFeed,
    },
    FetchError,
    IntegrationStore,
    OrderStore,
    SqliteDatabase,
    SyncApi,
};
use serde_json::{json, Value};

use super::helpers::{at, post_request};
use crate::routes::SyncNowRoute;

pub type TestSyncApi = SyncApi<SqliteDatabase, ScriptedFeed>;

pub struct TestBackend {
    pub url: String,
    pub db: SqliteDatabase,
    pub feed: ScriptedFeed,
    pub api: Arc<TestSyncApi>,
}

impl TestBackend {
    pub async fn new() -> Self {
        let url = random_db_path();
        let db = prepare_test_env(&url).await;
        db.save_integration(7, ARP_COMMERCE, &Secret::from("session-7")).await.unwrap();
        let feed = ScriptedFeed::new();
        let broadcaster = Arc::new(Broadcaster::new(Arc::new(ConnectionRegistry::new(4))));
        let api = Arc::new(SyncApi::new(db.clone(), feed.clone(), broadcaster, LocalClock::frozen_at(at(10, 12, 0))));
        Self { url, db, feed, api }
    }

    pub async fn tear_down(mut self) {
        self.db.close().await.unwrap();
        drop_database(&self.url).await;
    }
}

fn configure(api: Arc<TestSyncApi>) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::from(api)).service(SyncNowRoute::<SqliteDatabase, ScriptedFeed>::new());
    }
}

fn sale(order_id: &str, total_value: f64) -> Value {
    json!({
        "order": order_id,
        "sku": "SKU-1",
        "quantity": 1,
        "total_value": total_value,
        "payment_date": "2024-06-10 14:00:00",
        "status": "paid",
        "store": "loja",
    })
}

#[actix_web::test]
async fn sync_stores_the_feed_and_reports_the_count() {
    let _ = env_logger::try_init().ok();
    let backend = TestBackend::new().await;
    backend.feed.push_response(Ok(json!({ "cart-1": [sale("A1", 10.0), sale("A2", 20.0)] })));
    let (status, body) = post_request(Some(7), "/sync", configure(backend.api.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let summary: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(summary["inserted_count"], 2);
    assert_eq!(summary["range"]["start"], "2024-06-10");
    assert_eq!(backend.db.fetch_orders(7, &"2024-06-10".parse().unwrap()).await.unwrap().len(), 2);
    backend.tear_down().await;
}

#[actix_web::test]
async fn sync_with_an_explicit_date_is_shifted() {
    let _ = env_logger::try_init().ok();
    let backend = TestBackend::new().await;
    let (status, body) = post_request(Some(7), "/sync?data=01/06/2024", configure(backend.api.clone())).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let (_, range) = backend.feed.calls()[0];
    assert_eq!(range.to_string(), "2024-06-02");
    backend.tear_down().await;
}

#[actix_web::test]
async fn sync_with_a_bad_date() {
    let _ = env_logger::try_init().ok();
    let backend = TestBackend::new().await;
    let (status, body) = post_request(Some(7), "/sync?data=2024-06-01", configure(backend.api.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("DD/MM/YYYY"), "{body}");
    assert!(backend.feed.calls().is_empty());
    backend.tear_down().await;
}

#[actix_web::test]
async fn sync_without_an_integration() {
    let _ = env_logger::try_init().ok();
    let backend = TestBackend::new().await;
    let (status, body) = post_request(Some(8), "/sync", configure(backend.api.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"User #8 has no active ARP Commerce integration"}"#);
    backend.tear_down().await;
}

#[actix_web::test]
async fn sync_when_the_feed_is_down() {
    let _ = env_logger::try_init().ok();
    let backend = TestBackend::new().await;
    backend.feed.push_response(Err(FetchError::Upstream { status: 503, message: "maintenance".into() }));
    let (status, body) = post_request(Some(7), "/sync", configure(backend.api.clone())).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("maintenance"), "{body}");
    backend.tear_down().await;
}

#[actix_web::test]
async fn sync_needs_an_identity() {
    let _ = env_logger::try_init().ok();
    let backend = TestBackend::new().await;
    let (status, _) = post_request(None, "/sync", configure(backend.api.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(backend.feed.calls().is_empty());
    backend.tear_down().await;
}
