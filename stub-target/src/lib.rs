use anyhow::Context;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const INDEX_HTML: &str = "<!DOCTYPE html><html><body><h1>stub target</h1></body></html>";

#[derive(Clone)]
pub struct HitCounter {
    count: Arc<AtomicUsize>,
}

impl HitCounter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            count: Arc::new(AtomicUsize::new(0)),
        }
    }

    #[inline]
    pub fn hit(&self) -> usize {
        self.count.fetch_add(1, Ordering::AcqRel) + 1
    }

    #[inline]
    #[must_use]
    pub fn get(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }
}

impl Default for HitCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
struct StubState {
    status: StatusCode,
    hits: HitCounter,
}

#[must_use]
pub fn router(status: StatusCode, hits: HitCounter) -> axum::Router {
    axum::Router::new()
        .route("/", get(get_index))
        .with_state(StubState { status, hits })
}

async fn get_index(State(state): State<StubState>) -> (StatusCode, &'static str) {
    let hit = state.hits.hit();
    tracing::debug!(hit, status = %state.status, "served index");
    (state.status, INDEX_HTML)
}

/// A target answering `GET /` with a fixed status, serving on a background
/// task until dropped.
pub struct StubTarget {
    addr: SocketAddr,
    hits: HitCounter,
    handle: JoinHandle<()>,
}

impl StubTarget {
    /// Binds an ephemeral port on localhost.
    pub async fn spawn(status: StatusCode) -> anyhow::Result<Self> {
        Self::bind("127.0.0.1:0", status).await
    }

    pub async fn bind(addr: &str, status: StatusCode) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        let addr = listener.local_addr().context("Failed to read local addr")?;
        let hits = HitCounter::new();
        let app = router(status, hits.clone());
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "stub target stopped");
            }
        });
        Ok(Self { addr, hits, handle })
    }

    #[inline]
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    #[inline]
    #[must_use]
    pub fn hits(&self) -> usize {
        self.hits.get()
    }

    pub async fn serve_forever(mut self) -> anyhow::Result<()> {
        (&mut self.handle).await.context("Stub target task failed")
    }
}

impl Drop for StubTarget {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
