use std::{sync::Arc, time::Duration};

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use arp_tools::ArpApi;
use log::*;
use sales_engine::{
    helpers::LocalClock,
    live::{Broadcaster, ConnectionRegistry, RefreshQueue},
    SqliteDatabase,
    SyncApi,
};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::arp::ArpSalesFeed,
    routes::{health, DailyReportRoute, DailyReportWsRoute, OrdersRoute, ReportRoute, SyncNowRoute},
    workers::{start_sync_scheduler, start_user_poller, PollerSpawner},
};

/// The sync API as the server runs it.
pub type LiveSyncApi = SyncApi<SqliteDatabase, ArpSalesFeed>;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let arp = ArpApi::new(config.arp.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let feed = ArpSalesFeed::new(arp);
    let clock = LocalClock::with_offset_hours(config.local_utc_offset);
    let registry = Arc::new(ConnectionRegistry::new(config.push_buffer));
    let broadcaster = Arc::new(Broadcaster::new(Arc::clone(&registry)));
    let (refresh_queue, refresh_requests) = RefreshQueue::new(config.refresh_queue);
    let api = Arc::new(
        SyncApi::new(db.clone(), feed, broadcaster, clock)
            .with_house_user(config.house_user_id)
            .with_refresh_queue(refresh_queue),
    );

    let worker_api = Arc::clone(&api);
    let refresh_worker = tokio::spawn(async move { worker_api.run_refresh_worker(refresh_requests).await });
    let cycle_api = Arc::clone(&api);
    let scheduler = start_sync_scheduler(config.sync_interval, move || {
        let api = Arc::clone(&cycle_api);
        async move { api.run_scheduled_cycle().await }
    });
    let pollers = poller_spawner(Arc::clone(&api), config.poll_interval);

    let srv = create_server_instance(config, api, pollers)?;
    let result = srv.await.map_err(|e| ServerError::Unspecified(e.to_string()));
    info!("🚀️ Server stopped. Shutting down background tasks.");
    scheduler.abort();
    refresh_worker.abort();
    registry.shutdown();
    result
}

fn poller_spawner(api: Arc<LiveSyncApi>, interval: Duration) -> PollerSpawner {
    PollerSpawner::new(move |user_id| {
        let api = Arc::clone(&api);
        start_user_poller(user_id, interval, move |user_id| {
            let api = Arc::clone(&api);
            async move {
                api.refresh_user(user_id).await;
            }
        })
    })
}

pub fn create_server_instance(
    config: ServerConfig,
    api: Arc<LiveSyncApi>,
    pollers: PollerSpawner,
) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let report_api = api.reports().clone();
        let api_scope = web::scope("/api")
            .service(SyncNowRoute::<SqliteDatabase, ArpSalesFeed>::new())
            .service(ReportRoute::<SqliteDatabase>::new())
            .service(DailyReportRoute::<SqliteDatabase>::new())
            .service(OrdersRoute::<SqliteDatabase>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("sales::access_log"))
            .app_data(web::Data::new(report_api))
            .app_data(web::Data::from(Arc::clone(&api)))
            .app_data(web::Data::new(pollers.clone()))
            .service(health)
            .service(api_scope)
            .service(DailyReportWsRoute::<SqliteDatabase, ArpSalesFeed>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
