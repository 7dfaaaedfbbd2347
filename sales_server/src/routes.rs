//! Request handler definitions
//!
//! Define each route and its handler here. Handlers that are more than a few lines go into a separate module.
//!
//! Every handler is async. Report computation and syncing do database and network I/O, and a handler that blocks the
//! worker thread stalls every other request on that worker.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use log::*;
use sales_engine::{OrderStore, ReportApi, SalesDatabase, SalesFeed, SyncApi};

use crate::{
    data_objects::{RangeParams, SyncParams},
    errors::ServerError,
    identity::AuthenticatedUser,
    live_session::start_live_session,
    workers::PollerSpawner,
};

// Actix cannot register generic handlers directly, so each generic route is wrapped in a service factory by `route!`.
// The backend type parameters are named after their trait bounds, in order.
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Sync  ----------------------------------------------------
route!(sync_now => Post "/sync" impl SalesDatabase, SalesFeed);
/// Route handler for the manual sync endpoint.
///
/// Pulls the caller's sales from ARP Commerce and stores them. The optional `data` query parameter selects the days
/// (`DD/MM/YYYY` or `DD/MM/YYYY/DD/MM/YYYY`); without it, the current adjusted day is synced. The response carries
/// `inserted_count`. The caller's live connections get a refreshed daily report in the background.
pub async fn sync_now<B: SalesDatabase, F: SalesFeed>(
    user: AuthenticatedUser,
    params: web::Query<SyncParams>,
    api: web::Data<SyncApi<B, F>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST sync for user #{} ({:?})", user.id(), params.data);
    let summary = api.sync_now(user.id(), params.data.as_deref()).await.map_err(|e| {
        debug!("💻️ Manual sync for user #{} failed. {e}", user.id());
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Ok().json(summary))
}

//----------------------------------------------   Reports  ----------------------------------------------------
route!(report => Get "/reports" impl OrderStore);
/// Route handler for the range report.
///
/// `start` and `end` are `YYYY-MM-DD` and inclusive. Without them, today's report is returned. A range without any
/// orders is a 404.
pub async fn report<B: OrderStore>(
    user: AuthenticatedUser,
    params: web::Query<RangeParams>,
    api: web::Data<ReportApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let range = params.to_range(api.clock().today())?;
    debug!("💻️ GET report for user #{} over {range}", user.id());
    let snapshot = api.compute(user.id(), &range).await?;
    Ok(HttpResponse::Ok().json(snapshot))
}

route!(daily_report => Get "/reports/daily" impl OrderStore);
pub async fn daily_report<B: OrderStore>(
    user: AuthenticatedUser,
    api: web::Data<ReportApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET daily report for user #{}", user.id());
    let snapshot = api.compute_daily(user.id()).await?;
    Ok(HttpResponse::Ok().json(snapshot))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(orders => Get "/orders" impl OrderStore);
/// The caller's orders in the range, most recent first. The range defaults to today.
pub async fn orders<B: OrderStore>(
    user: AuthenticatedUser,
    params: web::Query<RangeParams>,
    api: web::Data<ReportApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let range = params.to_range(api.clock().today())?;
    debug!("💻️ GET orders for user #{} over {range}", user.id());
    let orders = api.list_orders(user.id(), &range).await?;
    Ok(HttpResponse::Ok().json(orders))
}

//----------------------------------------------   Live reports  ----------------------------------------------------
route!(daily_report_ws => Get "/ws/daily_report" impl SalesDatabase, SalesFeed);
/// Upgrades the request to a WebSocket that streams the caller's daily report.
///
/// The first message is `daily_report_initial` with the current report (if there are any sales today). After that a
/// `daily_report` message arrives whenever the report changes.
pub async fn daily_report_ws<B, F>(
    req: HttpRequest,
    body: web::Payload,
    user: AuthenticatedUser,
    api: web::Data<SyncApi<B, F>>,
    pollers: web::Data<PollerSpawner>,
) -> Result<HttpResponse, ServerError>
where
    B: SalesDatabase + 'static,
    F: SalesFeed + 'static,
{
    debug!("💻️ Live report connection requested by user #{}", user.id());
    let (response, session, stream) = actix_ws::handle(&req, body).map_err(|e| {
        debug!("💻️ WebSocket handshake failed for user #{}. {e}", user.id());
        ServerError::InvalidRequest(e.to_string())
    })?;
    start_live_session(api.into_inner(), pollers.get_ref(), user.id(), session, stream);
    Ok(response)
}
