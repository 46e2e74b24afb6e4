//! /pinglist handler.

use axum::extract::State;
use axum::Json;

use pingweave_core::Pinglist;

use super::{ApiState, ClientAddr};

// ── /pinglist (GET) ───────────────────────────────────────────────────────────

/// Current pinglist. An empty list is a normal response, not an error.
pub async fn handle_pinglist(
    State(state): State<ApiState>,
    client: ClientAddr,
) -> Json<Pinglist> {
    let snapshot = state.pinglist.snapshot().await;
    tracing::debug!(client = %client, entries = snapshot.len(), "(SEND) pinglist");
    Json(snapshot.as_ref().clone())
}
