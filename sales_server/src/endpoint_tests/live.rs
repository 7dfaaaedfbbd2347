use std::{future::pending, time::Duration};

use actix_web::{http::StatusCode, web, web::ServiceConfig, App};
use awc::ws;
use futures::{SinkExt, Stream, StreamExt};
use sales_common::DateRange;
use sales_engine::{test_utils::ScriptedFeed, SqliteDatabase};
use serde_json::{json, Value};

use super::{
    helpers::{at, get_request},
    sync::{TestBackend, TestSyncApi},
};
use crate::{identity::USER_HEADER, routes::DailyReportWsRoute, workers::PollerSpawner};

fn idle_pollers() -> PollerSpawner {
    PollerSpawner::new(|_| tokio::spawn(pending::<()>()))
}

fn configure(api: std::sync::Arc<TestSyncApi>) -> impl FnOnce(&mut ServiceConfig) {
    let pollers = idle_pollers();
    move |cfg| {
        cfg.app_data(web::Data::from(api))
            .app_data(web::Data::new(pollers))
            .service(DailyReportWsRoute::<SqliteDatabase, ScriptedFeed>::new());
    }
}

async fn next_json<S>(socket: &mut S) -> Value
where S: Stream<Item = Result<ws::Frame, awc::error::WsProtocolError>> + Unpin {
    loop {
        match socket.next().await {
            Some(Ok(ws::Frame::Text(text))) => return serde_json::from_slice(&text).unwrap(),
            Some(Ok(ws::Frame::Ping(_))) => continue,
            other => panic!("Expected a text frame, got {other:?}"),
        }
    }
}

#[actix_web::test]
async fn live_reports_need_an_identity() {
    let _ = env_logger::try_init().ok();
    let backend = TestBackend::new().await;
    let (status, _) = get_request(None, "/ws/daily_report", configure(backend.api.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(backend.api.broadcaster().registry().connection_count(7), 0);
    backend.tear_down().await;
}

#[actix_web::test]
async fn plain_requests_are_not_upgraded() {
    let _ = env_logger::try_init().ok();
    let backend = TestBackend::new().await;
    let (status, _) = get_request(Some(7), "/ws/daily_report", configure(backend.api.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!backend.api.broadcaster().registry().has_poller(7));
    backend.tear_down().await;
}

#[actix_web::test]
async fn a_live_session_gets_the_initial_report_and_later_pushes() {
    let _ = env_logger::try_init().ok();
    let backend = TestBackend::new().await;
    backend.feed.push_response(Ok(json!([{
        "order": "A1",
        "sku": "SKU-1",
        "quantity": 1,
        "total_value": 120.0,
        "payment_date": "2024-06-10 14:00:00",
        "status": "paid",
        "store": "loja",
        "profit": 30.0,
    }])));
    backend.api.sync_user(7, &DateRange::single(at(10, 0, 0).date())).await.unwrap();

    let api = backend.api.clone();
    let pollers = idle_pollers();
    let mut srv = actix_test::start(move || {
        App::new()
            .app_data(web::Data::from(api.clone()))
            .app_data(web::Data::new(pollers.clone()))
            .service(DailyReportWsRoute::<SqliteDatabase, ScriptedFeed>::new())
    });
    let (_, mut socket) =
        awc::Client::new().ws(srv.url("/ws/daily_report")).set_header(USER_HEADER, "7").connect().await.unwrap();

    let initial = next_json(&mut socket).await;
    assert_eq!(initial["type"], "daily_report_initial");
    assert_eq!(initial["data"]["kpis_gerais"]["total_pedidos"], 1);
    let registry = backend.api.broadcaster().registry().clone();
    assert_eq!(registry.connection_count(7), 1);
    assert!(registry.has_poller(7));

    assert!(backend.api.publish_daily(7).await.is_some_and(|o| o.was_pushed()));
    let update = next_json(&mut socket).await;
    assert_eq!(update["type"], "daily_report");
    assert_eq!(update["data"]["kpis_gerais"]["lucro_liquido_total"], 30.0);

    socket.send(ws::Message::Close(None)).await.unwrap();
    for _ in 0..100 {
        if !registry.has_poller(7) {
            break;
        }
        actix_web::rt::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(!registry.has_poller(7));
    assert_eq!(registry.connection_count(7), 0);

    srv.stop().await;
    backend.tear_down().await;
}
