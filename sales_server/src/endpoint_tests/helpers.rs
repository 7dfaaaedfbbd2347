use actix_web::{http::StatusCode, test, test::TestRequest, web::ServiceConfig, App};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use log::debug;
use sales_engine::db_types::{OrderId, OrderRecord};

use crate::identity::USER_HEADER;

pub async fn get_request<C>(user: Option<i64>, path: &str, configure: C) -> (StatusCode, String)
where C: FnOnce(&mut ServiceConfig) {
    call(TestRequest::get(), user, path, configure).await
}

pub async fn post_request<C>(user: Option<i64>, path: &str, configure: C) -> (StatusCode, String)
where C: FnOnce(&mut ServiceConfig) {
    call(TestRequest::post(), user, path, configure).await
}

async fn call<C>(req: TestRequest, user: Option<i64>, path: &str, configure: C) -> (StatusCode, String)
where C: FnOnce(&mut ServiceConfig) {
    let mut req = req.uri(path);
    if let Some(id) = user {
        req = req.insert_header((USER_HEADER, id.to_string()));
    }
    let app = test::init_service(App::new().configure(configure)).await;
    debug!("Making request to {path}");
    let res = test::call_service(&app, req.to_request()).await;
    let status = res.status();
    let body = String::from_utf8_lossy(&test::read_body(res).await).into_owned();
    (status, body)
}

pub fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, day).unwrap().and_hms_opt(hour, minute, 0).unwrap()
}

pub fn order_record(id: i64, sku: &str, total_value: f64, profit: f64, paid_at: NaiveDateTime) -> OrderRecord {
    OrderRecord {
        id,
        order_id: OrderId::from(format!("ORD-{id}")),
        user_id: 7,
        cart_id: None,
        ad: format!("MLB-{sku}"),
        sku: sku.to_string(),
        title: format!("Product {sku}"),
        quantity: 1,
        total_value,
        payment_timestamp: paid_at,
        status: "paid".to_string(),
        cost: total_value / 2.0,
        gross_profit: profit + 5.0,
        taxes: 1.0,
        freight: 2.0,
        committee: 0.0,
        fraction: 1.0,
        profitability: 0.0,
        rentability: 0.0,
        store: "loja".to_string(),
        profit,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        niche: Some("Cozinha".to_string()),
    }
}
