use std::sync::Arc;

use chrono::NaiveDateTime;
use cucumber::World;
use log::*;
use sales_engine::{
    helpers::LocalClock,
    live::{Broadcaster, ConnectionRegistry, Subscription},
    test_utils::{
        prepare_env::{prepare_test_env, random_db_path},
        ScriptedFeed,
    },
    SqliteDatabase,
    SyncApi,
};

pub const HOUSE_USER: i64 = 1;

#[derive(Default, Debug, World)]
pub struct SalesWorld {
    pub system: Option<SalesSystem>,
    pub subscriptions: Vec<Subscription>,
    pub last_error: Option<String>,
}

#[derive(Debug)]
pub struct SalesSystem {
    pub db_path: String,
    pub db: SqliteDatabase,
    pub feed: ScriptedFeed,
    pub registry: Arc<ConnectionRegistry>,
    pub api: SyncApi<SqliteDatabase, ScriptedFeed>,
}

impl SalesWorld {
    pub fn system(&self) -> &SalesSystem {
        self.system.as_ref().expect("The system has not been set up")
    }

    pub fn api(&self) -> &SyncApi<SqliteDatabase, ScriptedFeed> {
        &self.system().api
    }
}

impl SalesSystem {
    pub async fn new(now: NaiveDateTime) -> Self {
        let db_path = random_db_path();
        let db = prepare_test_env(&db_path).await;
        debug!("Created database: {db_path}");
        let feed = ScriptedFeed::new();
        let registry = Arc::new(ConnectionRegistry::new(16));
        let broadcaster = Arc::new(Broadcaster::new(registry.clone()));
        let api = SyncApi::new(db.clone(), feed.clone(), broadcaster, LocalClock::frozen_at(now))
            .with_house_user(Some(HOUSE_USER));
        Self { db_path, db, feed, registry, api }
    }
}
