use chrono::NaiveDate;
use log::*;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use super::SqliteDatabaseError;
use crate::{
    db_types::{NewOrderRecord, OrderId, OrderRecord},
    helpers::to_local_time,
};

const ORDER_COLUMNS: &str = r#"
    SELECT
        o.id, o.order_id, o.user_id, o.cart_id, o.ad, o.sku, o.title, o.quantity, o.total_value,
        o.payment_timestamp, o.status, o.cost, o.gross_profit, o.taxes, o.freight, o.committee, o.fraction,
        o.profitability, o.rentability, o.store, o.profit, o.created_at, o.updated_at,
        n.niche AS niche
    FROM orders o
    LEFT JOIN sku_niches n ON n.sku = o.sku AND n.user_id = o.user_id
"#;

/// Inserts the order, or overwrites every field of the existing `(order_id, user_id)` row. The row keeps its `id` and
/// `created_at`.
///
/// This is not atomic on its own. Pass `&mut *tx` to run it inside a transaction.
pub async fn upsert_order(
    user_id: i64,
    order: &NewOrderRecord,
    conn: &mut SqliteConnection,
) -> Result<(), SqliteDatabaseError> {
    let payment_timestamp = to_local_time(order.payment_timestamp);
    sqlx::query(
        r#"
            INSERT INTO orders (
                order_id, user_id, cart_id, ad, sku, title, quantity, total_value, payment_timestamp, status,
                cost, gross_profit, taxes, freight, committee, fraction, profitability, rentability, store, profit
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (order_id, user_id) DO UPDATE SET
                cart_id = excluded.cart_id,
                ad = excluded.ad,
                sku = excluded.sku,
                title = excluded.title,
                quantity = excluded.quantity,
                total_value = excluded.total_value,
                payment_timestamp = excluded.payment_timestamp,
                status = excluded.status,
                cost = excluded.cost,
                gross_profit = excluded.gross_profit,
                taxes = excluded.taxes,
                freight = excluded.freight,
                committee = excluded.committee,
                fraction = excluded.fraction,
                profitability = excluded.profitability,
                rentability = excluded.rentability,
                store = excluded.store,
                profit = excluded.profit,
                updated_at = CURRENT_TIMESTAMP;
        "#,
    )
    .bind(&order.order_id)
    .bind(user_id)
    .bind(order.resolved_cart_id())
    .bind(&order.ad)
    .bind(&order.sku)
    .bind(&order.title)
    .bind(order.quantity)
    .bind(order.total_value)
    .bind(payment_timestamp)
    .bind(&order.status)
    .bind(order.cost)
    .bind(order.gross_profit)
    .bind(order.taxes)
    .bind(order.freight)
    .bind(order.committee)
    .bind(order.fraction)
    .bind(order.profitability)
    .bind(order.rentability)
    .bind(&order.store)
    .bind(order.profit)
    .execute(conn)
    .await?;
    trace!("🗃️ Order {} for user #{user_id} saved", order.order_id);
    Ok(())
}

/// Selects a user's orders, joined with their niche mapping.
#[derive(Debug, Clone)]
pub struct OrderQuery {
    user_id: i64,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    order_id: Option<OrderId>,
    limit: Option<i64>,
}

impl OrderQuery {
    pub fn for_user(user_id: i64) -> Self {
        Self { user_id, from: None, to: None, order_id: None, limit: None }
    }

    /// Local payment dates from `from` to `to`, both included.
    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    pub fn with_order_id(mut self, order_id: OrderId) -> Self {
        self.order_id = Some(order_id);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Fetches orders matching the query, ordered by payment time and then by row id.
pub async fn fetch_orders(query: OrderQuery, conn: &mut SqliteConnection) -> Result<Vec<OrderRecord>, SqliteDatabaseError> {
    let mut builder = QueryBuilder::<Sqlite>::new(ORDER_COLUMNS);
    builder.push(" WHERE o.user_id = ");
    builder.push_bind(query.user_id);
    if let Some(from) = query.from {
        builder.push(" AND date(o.payment_timestamp) >= ");
        builder.push_bind(from);
    }
    if let Some(to) = query.to {
        builder.push(" AND date(o.payment_timestamp) <= ");
        builder.push_bind(to);
    }
    if let Some(order_id) = query.order_id {
        builder.push(" AND o.order_id = ");
        builder.push_bind(order_id);
    }
    builder.push(" ORDER BY o.payment_timestamp ASC, o.id ASC");
    if let Some(limit) = query.limit {
        builder.push(" LIMIT ");
        builder.push_bind(limit);
    }
    trace!("🗃️ Executing query: {}", builder.sql());
    let orders = builder.build_query_as::<OrderRecord>().fetch_all(conn).await?;
    trace!("🗃️ Result of fetch_orders: {}", orders.len());
    Ok(orders)
}

pub async fn fetch_order(
    user_id: i64,
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<OrderRecord>, SqliteDatabaseError> {
    let query = OrderQuery::for_user(user_id).with_order_id(order_id.clone()).limit(1);
    Ok(fetch_orders(query, conn).await?.pop())
}

pub async fn count_orders(user_id: i64, conn: &mut SqliteConnection) -> Result<i64, SqliteDatabaseError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(conn)
        .await?;
    Ok(count)
}
