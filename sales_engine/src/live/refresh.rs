use log::*;
use tokio::sync::mpsc::{self, error::TrySendError};

/// A bounded queue of users whose daily report should be recomputed and pushed in the background.
///
/// Requests are fire-and-forget. When the queue is full the request is dropped, since a refresh is already pending.
#[derive(Debug, Clone)]
pub struct RefreshQueue {
    sender: mpsc::Sender<i64>,
}

impl RefreshQueue {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<i64>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Queues a refresh for `user_id`. Returns `false` if the request was dropped.
    pub fn request(&self, user_id: i64) -> bool {
        match self.sender.try_send(user_id) {
            Ok(()) => {
                trace!("🔁️ Refresh queued for user #{user_id}");
                true
            },
            Err(TrySendError::Full(_)) => {
                warn!("🔁️ Refresh queue is full. Dropping the refresh request for user #{user_id}");
                false
            },
            Err(TrySendError::Closed(_)) => {
                error!("🔁️ Refresh worker has stopped. Cannot refresh user #{user_id}");
                false
            },
        }
    }
}
