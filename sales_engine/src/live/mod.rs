//! Live report delivery.
//!
//! Clients subscribe through the [`ConnectionRegistry`], which also owns the per-user polling task. Freshly computed
//! reports go through the [`Broadcaster`], which only pushes when a report differs from the last one pushed for the
//! same slot in the [`SnapshotCache`].
mod broadcaster;
mod cache;
mod messages;
mod refresh;
mod registry;

pub use broadcaster::{BroadcastOutcome, Broadcaster};
pub use cache::{SnapshotCache, SnapshotKey};
pub use messages::{PushKind, PushMessage};
pub use refresh::RefreshQueue;
pub use registry::{ConnectionId, ConnectionRegistry, DeliveryReport, Subscription, TransportError};
