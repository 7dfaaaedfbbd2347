//! Background tasks: the periodic sync scheduler and the per-user pollers.
//!
//! The workers take the work to do as closures returning `Send` futures. The server builds those closures from the
//! concrete engine types, which keeps the loops themselves free of backend generics.
mod sync_scheduler;
mod user_poller;

pub use sync_scheduler::start_sync_scheduler;
pub use user_poller::{start_user_poller, PollerSpawner};
