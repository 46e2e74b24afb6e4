//! pingweave-services — the control plane's two in-memory stores and the
//! task that keeps the pinglist fresh.
//!
//! The stores are guarded by separate locks and no code path takes both.

pub mod address_registry;
pub mod pinglist_store;
pub mod refresh;

pub use address_registry::{
    AddressRegistry, RegisterOutcome, ADDRESS_TTL_SECS, MAX_ADDRESS_ENTRIES, SWEEP_INTERVAL_SECS,
};
pub use pinglist_store::{FileSource, PinglistSource, PinglistStore};
pub use refresh::refresh_loop;
