//! pingweave-core — shared types, configuration, and the wire shapes
//! exchanged between the control plane and its agents.
//! All other pingweave crates depend on this one.

pub mod address;
pub mod clock;
pub mod config;
pub mod pinglist;

pub use address::{AddressRecord, AddressRegistration, ValidationError};
pub use clock::{Clock, ManualClock, SystemClock};
pub use pinglist::{LoadError, Pinglist};
