use mockall::mock;
use sales_common::DateRange;
use sales_engine::{
    db_types::{NewOrderRecord, OrderId, OrderRecord},
    OrderStore,
    StoreError,
    UpsertSummary,
};

mock! {
    pub OrderStorage {}
    impl OrderStore for OrderStorage {
        async fn upsert_orders(&self, user_id: i64, records: &[NewOrderRecord]) -> Result<UpsertSummary, StoreError>;
        async fn fetch_orders(&self, user_id: i64, range: &DateRange) -> Result<Vec<OrderRecord>, StoreError>;
        async fn fetch_order(&self, user_id: i64, order_id: &OrderId) -> Result<Option<OrderRecord>, StoreError>;
    }
}
