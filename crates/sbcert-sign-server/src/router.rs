//! Axum router construction.

use std::sync::Arc;

use axum::routing::{get, put};
use axum::Router;
use sbcert_signer::LocalSigner;

use crate::handlers::{health_handler, sign_handler, verify_handler};

/// Shared state for every handler.
pub type AppState = Arc<LocalSigner>;

/// Build the Axum application router.
pub fn build_router(signer: LocalSigner) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/sign/{key_index}", put(sign_handler))
        .route("/verify/{key_index}", get(verify_handler))
        .with_state(Arc::new(signer))
}
