use actix_web::{http::StatusCode, web, web::ServiceConfig};
use sales_engine::{helpers::LocalClock, ReportApi, StoreError};
use serde_json::Value;

use super::{
    helpers::{at, get_request, order_record},
    mocks::MockOrderStorage,
};
use crate::routes::{DailyReportRoute, OrdersRoute, ReportRoute};

fn configure(store: MockOrderStorage) -> impl FnOnce(&mut ServiceConfig) {
    let api = ReportApi::new(store, LocalClock::frozen_at(at(10, 12, 0)));
    move |cfg| {
        cfg.app_data(web::Data::new(api))
            .service(ReportRoute::<MockOrderStorage>::new())
            .service(DailyReportRoute::<MockOrderStorage>::new())
            .service(OrdersRoute::<MockOrderStorage>::new());
    }
}

fn store_with_two_orders() -> MockOrderStorage {
    let mut store = MockOrderStorage::new();
    store.expect_fetch_orders().returning(|_, _| {
        Ok(vec![order_record(1, "SKU-1", 100.0, 20.0, at(10, 9, 0)), order_record(2, "SKU-2", 50.0, -5.0, at(10, 11, 0))])
    });
    store
}

#[actix_web::test]
async fn daily_report_without_identity() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(None, "/reports/daily", configure(MockOrderStorage::new())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        r#"{"error":"The request does not identify a user. The X-Authenticated-User header is missing"}"#
    );
}

#[actix_web::test]
async fn daily_report() {
    let _ = env_logger::try_init().ok();
    let mut store = MockOrderStorage::new();
    store
        .expect_fetch_orders()
        .withf(|user_id, range| *user_id == 7 && range.to_string() == "2024-06-10")
        .times(1)
        .returning(|_, _| Ok(vec![order_record(1, "SKU-1", 100.0, 20.0, at(10, 9, 0))]));
    let (status, body) = get_request(Some(7), "/reports/daily", configure(store)).await;
    assert_eq!(status, StatusCode::OK);
    let report: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(report["kpis_gerais"]["total_pedidos"], 1);
    assert_eq!(report["kpis_gerais"]["faturamento_total"], 100.0);
    assert_eq!(report["periodo"]["inicio"], "2024-06-10");
}

#[actix_web::test]
async fn range_report() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        get_request(Some(7), "/reports?start=2024-06-01&end=2024-06-10", configure(store_with_two_orders())).await;
    assert_eq!(status, StatusCode::OK);
    let report: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(report["kpis_gerais"]["total_pedidos"], 2);
    assert_eq!(report["kpis_gerais"]["lucro_liquido_total"], 15.0);
    assert_eq!(report["periodo"]["dias_totais"], 10);
}

#[actix_web::test]
async fn report_for_a_range_without_orders() {
    let _ = env_logger::try_init().ok();
    let mut store = MockOrderStorage::new();
    store.expect_fetch_orders().returning(|_, _| Ok(vec![]));
    let (status, body) = get_request(Some(7), "/reports?start=2024-05-01", configure(store)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("There are no orders for user #7 in 2024-05-01"), "{body}");
}

#[actix_web::test]
async fn report_with_an_inverted_range() {
    let _ = env_logger::try_init().ok();
    let (status, _) =
        get_request(Some(7), "/reports?start=2024-06-10&end=2024-06-01", configure(MockOrderStorage::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn report_with_a_malformed_date() {
    let _ = env_logger::try_init().ok();
    let (status, _) = get_request(Some(7), "/reports?start=10/06/2024", configure(MockOrderStorage::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn store_failures_are_server_errors() {
    let _ = env_logger::try_init().ok();
    let mut store = MockOrderStorage::new();
    store.expect_fetch_orders().returning(|_, _| Err(StoreError::DatabaseError("database is locked".into())));
    let (status, body) = get_request(Some(7), "/reports/daily", configure(store)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("database is locked"));
}

#[actix_web::test]
async fn orders_are_listed_most_recent_first() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(Some(7), "/orders", configure(store_with_two_orders())).await;
    assert_eq!(status, StatusCode::OK);
    let orders: Vec<Value> = serde_json::from_str(&body).unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["order_id"], "ORD-2");
    assert_eq!(orders[1]["order_id"], "ORD-1");
    assert_eq!(orders[0]["niche"], "Cozinha");
}
