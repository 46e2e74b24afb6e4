//! HTTP API handlers — exposes the pinglist and address store as JSON.

pub mod address;
pub mod pinglist;

use std::convert::Infallible;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;

use pingweave_core::Clock;
use pingweave_services::{AddressRegistry, PinglistStore};

#[derive(Clone)]
pub struct ApiState {
    pub pinglist: PinglistStore,
    pub addresses: AddressRegistry,
    /// Source of `now` for record stamps and expiry.
    pub clock: Arc<dyn Clock>,
}

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Remote address of the caller, when the server was started with
/// connect info. Only used for logging.
pub struct ClientAddr(pub Option<SocketAddr>);

impl<S: Send + Sync> FromRequestParts<S> for ClientAddr {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientAddr(
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| *addr),
        ))
    }
}

impl fmt::Display for ClientAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(addr) => write!(f, "{}", addr.ip()),
            None => f.write_str("unknown"),
        }
    }
}

// Re-export handler functions for use in router setup.
pub use address::{handle_address_store, handle_post_address};
pub use pinglist::handle_pinglist;
