//! Loopback listener that receives the GitHub OAuth redirect.
//!
//! SYSTEM CONTEXT
//! ==============
//! GitHub redirects the browser to the app's callback URL with `?code=...`.
//! Natively there is no page to land on, so `login` binds the configured
//! callback address, waits for the first request, and hands its full href to
//! [`crate::session::AuthSession::restore`] as the current location.

#[cfg(test)]
#[path = "callback_test.rs"]
mod callback_test;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{OriginalUri, State};
use axum::response::{Html, IntoResponse};
use axum::Router;
use tokio::sync::oneshot;

const LANDING_PAGE: &str = "<!doctype html><html><body><p>Redirect received. You can return to the terminal.</p></body></html>";

#[derive(Debug, thiserror::Error)]
pub enum CallbackError {
    #[error("failed to bind callback listener on {addr}: {source}")]
    Bind { addr: SocketAddr, source: std::io::Error },
    #[error("callback listener failed: {0}")]
    Serve(#[from] std::io::Error),
    #[error("timed out waiting for the OAuth redirect")]
    TimedOut,
    #[error("callback listener stopped before a redirect arrived")]
    Closed,
}

type HrefSlot = Arc<Mutex<Option<oneshot::Sender<String>>>>;

pub struct CallbackListener {
    listener: tokio::net::TcpListener,
    local_addr: SocketAddr,
}

impl CallbackListener {
    /// Bind the loopback address GitHub will redirect to.
    ///
    /// # Errors
    ///
    /// Returns [`CallbackError::Bind`] if the address is unavailable.
    pub async fn bind(addr: SocketAddr) -> Result<Self, CallbackError> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|source| CallbackError::Bind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| CallbackError::Bind { addr, source })?;
        Ok(Self { listener, local_addr })
    }

    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve until the first request arrives, then return its full href.
    ///
    /// # Errors
    ///
    /// Returns [`CallbackError::TimedOut`] if nothing arrives within `timeout`,
    /// or [`CallbackError::Serve`] if the server fails.
    pub async fn wait(self, timeout: Duration) -> Result<String, CallbackError> {
        let (tx, rx) = oneshot::channel::<String>();
        let slot: HrefSlot = Arc::new(Mutex::new(Some(tx)));
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let app = Router::new().fallback(capture).with_state(slot);
        let server = axum::serve(self.listener, app).with_graceful_shutdown(async move {
            let _ = stop_rx.await;
        });
        let server = tokio::spawn(async move { server.await });

        tracing::info!(addr = %self.local_addr, "waiting for OAuth redirect");
        let outcome = tokio::time::timeout(timeout, rx).await;

        let _ = stop_tx.send(());
        match server.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(CallbackError::Serve(e)),
            Err(e) => tracing::warn!(error = %e, "callback server task ended abnormally"),
        }

        let path = match outcome {
            Ok(Ok(path)) => path,
            Ok(Err(_)) => return Err(CallbackError::Closed),
            Err(_) => return Err(CallbackError::TimedOut),
        };
        Ok(format!("http://{}{path}", self.local_addr))
    }
}

async fn capture(State(slot): State<HrefSlot>, OriginalUri(uri): OriginalUri) -> impl IntoResponse {
    let path = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_owned(), |pq| pq.as_str().to_owned());
    let sender = slot
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .take();
    if let Some(sender) = sender {
        let _ = sender.send(path);
    }
    Html(LANDING_PAGE)
}
