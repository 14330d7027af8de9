//! Worker event tools.

pub mod fetch;
pub mod lifecycle;
pub mod stubs;

pub use fetch::{WorkerFetchParams, fetch_impl};
pub use lifecycle::{activate_impl, install_impl, status_impl};
pub use stubs::{WorkerPushParams, WorkerSyncParams, push_impl, sync_impl};
