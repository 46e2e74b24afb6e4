//! /address and /address_store handlers — RDMA endpoint registration.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use bytes::Bytes;
use serde_json::Value;

use pingweave_core::{AddressRecord, AddressRegistration};
use pingweave_services::RegisterOutcome;

use super::{ApiState, ClientAddr};

// ── /address_store (GET) ──────────────────────────────────────────────────────

/// All live records keyed by IP. Stale records are swept first when due.
pub async fn handle_address_store(
    State(state): State<ApiState>,
    client: ClientAddr,
) -> Json<BTreeMap<String, AddressRecord>> {
    let now = state.clock.now();
    let snapshot = state.addresses.snapshot(now).await;
    tracing::debug!(client = %client, entries = snapshot.len(), "(SEND) address_store");
    Json(snapshot)
}

// ── /address (POST) ───────────────────────────────────────────────────────────

/// Register one endpoint.
///
/// The body is parsed by hand rather than through `Json<T>` so that a
/// malformed body maps to 500 and a missing field maps to 400.
pub async fn handle_post_address(
    State(state): State<ApiState>,
    client: ClientAddr,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let value: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!(client = %client, error = %e, "error processing POST");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    };
    let Some(obj) = value.as_object() else {
        tracing::error!(client = %client, "error processing POST: body is not a JSON object");
        return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
    };

    let registration = AddressRegistration::from_json_object(obj);
    let now = state.clock.now();

    match state.addresses.register(registration, now).await {
        Ok(RegisterOutcome::Stored { entries }) => {
            tracing::debug!(client = %client, entries, "(RECV) POST, address store updated");
            (StatusCode::OK, "Address updated")
        }
        Ok(RegisterOutcome::Reset { dropped }) => {
            tracing::warn!(client = %client, dropped, "(RECV) POST accepted, address store was reset");
            (StatusCode::OK, "Address updated")
        }
        Err(e) => {
            tracing::warn!(client = %client, error = %e, "(RECV) incorrect POST format");
            (StatusCode::BAD_REQUEST, "Invalid data")
        }
    }
}
