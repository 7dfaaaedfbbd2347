//! The WebSocket side of a live report connection.
use std::sync::Arc;

use actix_ws::{Message, MessageStream, Session};
use futures::StreamExt;
use log::*;
use sales_engine::{
    live::{ConnectionRegistry, PushMessage, Subscription},
    SalesDatabase,
    SalesFeed,
    SyncApi,
};

use crate::workers::PollerSpawner;

/// Registers the connection and runs it on the current worker until either side closes it.
///
/// The first connection of a user starts that user's poller. The session task unregisters the connection when it
/// ends, which stops the poller if it was the last one.
pub fn start_live_session<B, F>(
    api: Arc<SyncApi<B, F>>,
    pollers: &PollerSpawner,
    user_id: i64,
    session: Session,
    stream: MessageStream,
) where
    B: SalesDatabase + 'static,
    F: SalesFeed + 'static,
{
    let registry = Arc::clone(api.broadcaster().registry());
    let subscription = registry.connect(user_id, || pollers.spawn(user_id));
    info!("🔌️ Live session {} opened for user #{user_id}", subscription.id);
    actix_web::rt::spawn(run_live_session(api, registry, subscription, session, stream));
}

async fn run_live_session<B, F>(
    api: Arc<SyncApi<B, F>>,
    registry: Arc<ConnectionRegistry>,
    mut subscription: Subscription,
    mut session: Session,
    mut stream: MessageStream,
) where
    B: SalesDatabase,
    F: SalesFeed,
{
    let id = subscription.id;
    let mut open = match api.initial_message(subscription.user_id).await {
        Some(msg) => send(&mut session, &msg).await,
        None => true,
    };
    while open {
        tokio::select! {
            pushed = subscription.receiver.recv() => match pushed {
                Some(msg) => open = send(&mut session, &msg).await,
                None => {
                    debug!("🔌️ {id} was unregistered. Closing the session.");
                    open = false;
                },
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Ping(bytes))) => open = session.pong(&bytes).await.is_ok(),
                Some(Ok(Message::Close(reason))) => {
                    debug!("🔌️ {id} closed by the client. {reason:?}");
                    open = false;
                },
                Some(Ok(_)) => trace!("🔌️ Ignoring inbound message on {id}"),
                Some(Err(e)) => {
                    warn!("🔌️ Protocol error on {id}. {e}");
                    open = false;
                },
                None => open = false,
            },
        }
    }
    registry.disconnect(id);
    let _ = session.close(None).await;
    info!("🔌️ Live session {id} closed");
}

/// Returns `false` once the session can no longer be written to.
async fn send(session: &mut Session, message: &PushMessage) -> bool {
    let json = match message.to_json() {
        Ok(json) => json,
        Err(e) => {
            error!("🔌️ Could not serialize a report push. {e}");
            return true;
        },
    };
    session.text(json).await.is_ok()
}
