use std::{future::IntoFuture, net::SocketAddr, time::Duration};

use axum::{
    http::{header, Method},
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::{auth, auth::extractors::require_auth, health::health, posts, state::AppState, users};

pub fn build_app(state: AppState) -> Router {
    let protected = Router::new()
        .merge(users::router())
        .merge(posts::router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .nest(
            "/api",
            Router::new()
                .route("/health", get(health))
                .merge(auth::router())
                .merge(protected),
        )
        .with_state(state)
        .layer(cors())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::ORIGIN,
        ])
        .expose_headers([header::CONTENT_LENGTH])
        .max_age(Duration::from_secs(24 * 60 * 60))
}

/// Serves until SIGINT/SIGTERM, then gives in-flight requests `grace` to finish.
pub async fn serve(app: Router, addr: SocketAddr, grace: Duration) -> anyhow::Result<()> {
    info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = stop_tx.send(());
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        res = &mut server => res?,
        _ = grace_deadline(stop_rx, grace) => {
            warn!(grace_secs = grace.as_secs(), "shutdown grace period elapsed; abandoning in-flight requests");
        }
    }
    Ok(())
}

/// Resolves `grace` after `stop` fires. Never resolves if the sender is dropped
/// without firing, which happens when the server exits on its own.
async fn grace_deadline(stop: oneshot::Receiver<()>, grace: Duration) {
    match stop.await {
        Ok(()) => tokio::time::sleep(grace).await,
        Err(_) => std::future::pending::<()>().await,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutting down server");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tokio::time::timeout;

    #[tokio::test]
    async fn deadline_waits_grace_after_stop() {
        let (tx, rx) = oneshot::channel();
        let started = Instant::now();
        tx.send(()).unwrap();

        timeout(Duration::from_secs(2), grace_deadline(rx, Duration::from_millis(50)))
            .await
            .expect("deadline should fire once stopped");
        assert!(started.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn deadline_is_idle_until_stop() {
        let (tx, rx) = oneshot::channel::<()>();
        let pending = timeout(Duration::from_millis(50), grace_deadline(rx, Duration::ZERO)).await;
        assert!(pending.is_err());
        drop(tx);
    }

    #[tokio::test]
    async fn dropped_stop_never_fires() {
        let (tx, rx) = oneshot::channel::<()>();
        drop(tx);
        let pending = timeout(Duration::from_millis(50), grace_deadline(rx, Duration::ZERO)).await;
        assert!(pending.is_err());
    }

    #[tokio::test]
    async fn server_that_outlives_grace_is_abandoned() {
        let (tx, rx) = oneshot::channel();
        tx.send(()).unwrap();
        let draining = std::future::pending::<()>();

        let abandoned = tokio::select! {
            _ = draining => false,
            _ = grace_deadline(rx, Duration::from_millis(10)) => true,
        };
        assert!(abandoned);
    }
}
