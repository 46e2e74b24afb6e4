pub mod handlers;

use std::future::Future;
use std::net::SocketAddr;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

pub use handlers::ApiState;

/// The control-plane routes. Panics inside a handler become a 500.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/pinglist", get(handlers::handle_pinglist))
        .route("/address_store", get(handlers::handle_address_store))
        .route("/address", post(handlers::handle_post_address))
        .with_state(state)
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
}

/// Serve on an already-bound listener until `shutdown` resolves.
///
/// In-flight requests are allowed to finish after `shutdown`.
pub async fn serve(
    listener: TcpListener,
    state: ApiState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "pingweave API listening");

    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await?;

    tracing::info!(%addr, "pingweave API stopped");
    Ok(())
}
