use std::{
    collections::HashMap,
    fmt::Display,
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex,
        MutexGuard,
    },
};

use log::*;
use thiserror::Error;
use tokio::{
    sync::mpsc::{self, error::TrySendError},
    task::JoinHandle,
};

use crate::live::PushMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Connection {0} is closed")]
    Closed(ConnectionId),
    #[error("The push queue of connection {0} is full")]
    Full(ConnectionId),
}

/// The receiving end of a live connection. Everything pushed to the connection arrives on `receiver`.
#[derive(Debug)]
pub struct Subscription {
    pub id: ConnectionId,
    pub user_id: i64,
    pub receiver: mpsc::Receiver<PushMessage>,
}

/// What happened to a push for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    /// Connections whose queue was full. They missed this message but stay registered.
    pub dropped: Vec<ConnectionId>,
    /// Connections found closed. They have been unregistered.
    pub removed: Vec<ConnectionId>,
}

#[derive(Default)]
struct UserConnections {
    connections: HashMap<ConnectionId, mpsc::Sender<PushMessage>>,
    poller: Option<JoinHandle<()>>,
}

#[derive(Default)]
struct RegistryState {
    users: HashMap<i64, UserConnections>,
    owners: HashMap<ConnectionId, i64>,
}

/// Tracks the live connections of every user, and each user's polling task.
///
/// A user has a polling task exactly when it has at least one connection. Both maps live behind a single mutex, so the
/// "first connection" check and the task start are one atomic step, and the lock is never held across an `.await`.
pub struct ConnectionRegistry {
    state: Mutex<RegistryState>,
    next_id: AtomicU64,
    push_buffer: usize,
}

impl std::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ConnectionRegistry ({} live users)", self.lock().users.len())
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new(16)
    }
}

impl ConnectionRegistry {
    /// `push_buffer` is the number of messages each connection can have queued before further pushes are dropped.
    pub fn new(push_buffer: usize) -> Self {
        Self { state: Mutex::new(RegistryState::default()), next_id: AtomicU64::new(1), push_buffer: push_buffer.max(1) }
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(|e| {
            error!("🔌️ Error getting lock on connection registry: {e}");
            e.into_inner()
        })
    }

    /// Registers a new connection for `user_id`.
    ///
    /// If this is the user's first connection, `start_poller` is called to spawn the user's polling task. It is called
    /// while the registry is locked, so it must only spawn the task and return.
    pub fn connect<F>(&self, user_id: i64, start_poller: F) -> Subscription
    where F: FnOnce() -> JoinHandle<()> {
        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (sender, receiver) = mpsc::channel(self.push_buffer);
        let mut state = self.lock();
        state.owners.insert(id, user_id);
        let user = state.users.entry(user_id).or_default();
        user.connections.insert(id, sender);
        if user.poller.is_none() {
            user.poller = Some(start_poller());
            info!("🔌️ User #{user_id} is now live. Polling task started.");
        }
        debug!("🔌️ {id} registered for user #{user_id}. {} connection(s)", user.connections.len());
        Subscription { id, user_id, receiver }
    }

    /// Unregisters a connection. Removing a user's last connection aborts the user's polling task.
    ///
    /// Returns `false` if the connection was not registered.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        let mut state = self.lock();
        let Some(user_id) = state.owners.remove(&id) else {
            return false;
        };
        let Some(user) = state.users.get_mut(&user_id) else {
            return true;
        };
        user.connections.remove(&id);
        debug!("🔌️ {id} of user #{user_id} disconnected. {} connection(s) left", user.connections.len());
        if user.connections.is_empty() {
            if let Some(poller) = state.users.remove(&user_id).and_then(|u| u.poller) {
                poller.abort();
                info!("🔌️ User #{user_id} has no connections left. Polling task stopped.");
            }
        }
        true
    }

    /// Pushes `message` to every connection of `user_id` without waiting. A full queue only affects its own
    /// connection. Closed connections are unregistered.
    pub fn send_to_user(&self, user_id: i64, message: &PushMessage) -> DeliveryReport {
        let senders = {
            let state = self.lock();
            match state.users.get(&user_id) {
                Some(user) => user.connections.iter().map(|(id, s)| (*id, s.clone())).collect::<Vec<_>>(),
                None => Vec::new(),
            }
        };
        let mut report = DeliveryReport::default();
        for (id, sender) in senders {
            match Self::try_push(id, &sender, message.clone()) {
                Ok(()) => report.delivered += 1,
                Err(TransportError::Full(_)) => report.dropped.push(id),
                Err(_) => report.removed.push(id),
            }
        }
        for id in &report.removed {
            self.disconnect(*id);
        }
        trace!("🔌️ Push to user #{user_id}: {report:?}");
        report
    }

    fn try_push(id: ConnectionId, sender: &mpsc::Sender<PushMessage>, message: PushMessage) -> Result<(), TransportError> {
        match sender.try_send(message) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                warn!("🔌️ Push queue of {id} is full. The message is dropped for this connection.");
                Err(TransportError::Full(id))
            },
            Err(TrySendError::Closed(_)) => {
                debug!("🔌️ {id} is closed. It will be removed from the registry.");
                Err(TransportError::Closed(id))
            },
        }
    }

    pub fn connection_count(&self, user_id: i64) -> usize {
        self.lock().users.get(&user_id).map(|u| u.connections.len()).unwrap_or(0)
    }

    pub fn has_poller(&self, user_id: i64) -> bool {
        self.lock().users.get(&user_id).is_some_and(|u| u.poller.is_some())
    }

    /// Drops every connection and aborts every polling task.
    pub fn shutdown(&self) {
        let mut state = self.lock();
        state.owners.clear();
        for (user_id, user) in state.users.drain() {
            if let Some(poller) = user.poller {
                poller.abort();
                debug!("🔌️ Polling task of user #{user_id} aborted");
            }
        }
    }
}
