use chrono::NaiveDate;
use cucumber::{gherkin::Step, then, when};
use sales_common::DateRange;
use sales_engine::{db_types::OrderId, live::PushKind, FetchError, OrderStore};
use serde_json::{json, Value};

use crate::cucumber::SalesWorld;

/// Turns a table with the columns `order | sku | quantity | total_value | profit | payment_date` into feed entries.
fn sales_from_table(step: &Step) -> Vec<Value> {
    let table = step.table.as_ref().expect("This step needs a table of sales");
    table
        .rows
        .iter()
        .skip(1)
        .map(|row| {
            json!({
                "order": row[0],
                "ad": format!("MLB-{}", row[1]),
                "sku": row[1],
                "title": format!("Product {}", row[1]),
                "quantity": row[2].parse::<i64>().expect("quantity must be an integer"),
                "total_value": row[3].parse::<f64>().expect("total_value must be a number"),
                "profit": row[4].parse::<f64>().expect("profit must be a number"),
                "payment_date": row[5],
                "status": "paid",
                "store": "loja",
            })
        })
        .collect()
}

fn parse_day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("Use the YYYY-MM-DD format")
}

#[when(expr = "the sales feed returns")]
async fn feed_returns(world: &mut SalesWorld, step: &Step) {
    let sales = sales_from_table(step);
    world.system().feed.push_response(Ok(Value::Array(sales)));
}

#[when(expr = "the sales feed always returns")]
async fn feed_always_returns(world: &mut SalesWorld, step: &Step) {
    let sales = sales_from_table(step);
    world.system().feed.set_fallback(Ok(Value::Array(sales)));
}

#[when(expr = "the sales feed is unreachable")]
async fn feed_is_down(world: &mut SalesWorld) {
    let err = Err(FetchError::Transport("connection refused".into()));
    world.system().feed.push_response(err.clone());
    world.system().feed.set_fallback(err);
}

#[when(expr = "user {int} syncs {string}")]
async fn sync_range(world: &mut SalesWorld, user_id: i64, dates: String) {
    let result = world.api().sync_now(user_id, Some(dates.as_str())).await;
    world.last_error = result.err().map(|e| e.to_string());
}

#[when(expr = "user {int} syncs today")]
async fn sync_today(world: &mut SalesWorld, user_id: i64) {
    let result = world.api().sync_now(user_id, None).await;
    world.last_error = result.err().map(|e| e.to_string());
}

#[when(expr = "user {int} opens a live connection")]
async fn open_connection(world: &mut SalesWorld, user_id: i64) {
    let subscription = world.system().registry.connect(user_id, || tokio::spawn(std::future::pending::<()>()));
    world.subscriptions.push(subscription);
}

#[when(expr = "the live connections are closed")]
async fn close_connections(world: &mut SalesWorld) {
    let registry = world.system().registry.clone();
    for sub in world.subscriptions.drain(..) {
        registry.disconnect(sub.id);
    }
}

#[when(expr = "the scheduler runs a cycle")]
async fn scheduler_cycle(world: &mut SalesWorld) {
    world.api().run_scheduled_cycle().await;
}

#[when(expr = "the poller for user {int} runs")]
async fn poller_runs(world: &mut SalesWorld, user_id: i64) {
    world.api().refresh_user(user_id).await;
}

#[then(expr = "the sync fails with {string}")]
async fn sync_failed(world: &mut SalesWorld, message: String) {
    let err = world.last_error.as_deref().expect("The last sync did not fail");
    assert!(err.contains(&message), "Expected '{message}' in '{err}'");
}

#[then(expr = "user {int} has {int} stored orders")]
async fn stored_order_count(world: &mut SalesWorld, user_id: i64, count: i64) {
    let stored = world.system().db.count_orders(user_id).await.expect("Error counting orders");
    assert_eq!(stored, count);
}

#[then(expr = "order {word} of user {int} has a total value of {float}")]
async fn order_value(world: &mut SalesWorld, order_id: String, user_id: i64, value: f64) {
    let order = world
        .system()
        .db
        .fetch_order(user_id, &OrderId::from(order_id))
        .await
        .expect("Error fetching order")
        .expect("Order does not exist");
    assert!((order.total_value - value).abs() < 1e-9, "Expected {value}, got {}", order.total_value);
}

#[then(expr = "order {word} of user {int} was paid at {string}")]
async fn order_paid_at(world: &mut SalesWorld, order_id: String, user_id: i64, at: String) {
    let order = world.system().db.fetch_order(user_id, &OrderId::from(order_id)).await.unwrap().unwrap();
    assert_eq!(order.payment_timestamp.format("%Y-%m-%d %H:%M:%S").to_string(), at);
}

#[then(expr = "the report of user {int} for {string} has {int} orders and a net profit of {float}")]
async fn report_totals(world: &mut SalesWorld, user_id: i64, day: String, orders: i64, profit: f64) {
    let range = DateRange::single(parse_day(&day));
    let report = world.api().reports().compute(user_id, &range).await.expect("Error computing report");
    assert_eq!(report.kpis.order_count, orders);
    assert!((report.kpis.net_profit - profit).abs() < 1e-9, "Expected {profit}, got {}", report.kpis.net_profit);
}

#[then(expr = "the report of user {int} for {string} lists {word} as unmapped")]
async fn unmapped_sku(world: &mut SalesWorld, user_id: i64, day: String, sku: String) {
    let range = DateRange::single(parse_day(&day));
    let report = world.api().reports().compute(user_id, &range).await.unwrap();
    assert!(report.kpis.unmapped_skus.contains(&sku), "{sku} is not in {:?}", report.kpis.unmapped_skus);
}

#[then(expr = "the top niche of user {int} for {string} is {string}")]
async fn top_niche(world: &mut SalesWorld, user_id: i64, day: String, niche: String) {
    let range = DateRange::single(parse_day(&day));
    let report = world.api().reports().compute(user_id, &range).await.unwrap();
    assert_eq!(report.rankings.top_nichos.first().map(|n| n.niche.as_str()), Some(niche.as_str()));
}

#[then(expr = "the live connection {int} received {int} report(s)")]
async fn received_reports(world: &mut SalesWorld, index: usize, count: usize) {
    let sub = world.subscriptions.get_mut(index - 1).expect("No such connection");
    let mut received = 0;
    while let Ok(msg) = sub.receiver.try_recv() {
        assert_eq!(msg.kind, PushKind::DailyReport);
        received += 1;
    }
    assert_eq!(received, count);
}

#[then(expr = "user {int} is {word}")]
async fn user_liveness(world: &mut SalesWorld, user_id: i64, state: String) {
    let registry = &world.system().registry;
    match state.as_str() {
        "live" => {
            assert!(registry.connection_count(user_id) > 0);
            assert!(registry.has_poller(user_id));
        },
        "offline" => {
            assert_eq!(registry.connection_count(user_id), 0);
            assert!(!registry.has_poller(user_id));
        },
        other => panic!("Unknown state {other}"),
    }
}
