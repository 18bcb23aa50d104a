//! Handlers for the signing and key verification endpoints.
//!
//! The service returns signatures in the primitive's native byte order;
//! clients put them into device order.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use log::{error, info, warn};
use sbcert_signer::{KeyIndex, SignerError};
use serde::Serialize;

use crate::form::form_field;
use crate::router::AppState;

/// Response body for the health endpoint.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

/// Response body of a successful signing request.
#[derive(Debug, Serialize)]
pub struct SignResponse {
    /// Base64 of the raw signature.
    pub signature: String,
}

/// `GET /healthz`.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

fn parse_index(raw: &str) -> Result<KeyIndex, StatusCode> {
    KeyIndex::new(raw).map_err(|e| {
        warn!("rejected key index: {e}");
        StatusCode::BAD_REQUEST
    })
}

fn status_for(e: &SignerError) -> StatusCode {
    match e {
        SignerError::UnknownKeyIndex(_) | SignerError::MissingKeyFile(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `PUT /sign/{key_index}`: sign the form field `data`.
///
/// # Errors
///
/// `400` for a malformed index or body, `404` for an unknown key and `500`
/// if signing fails.
pub async fn sign_handler(
    State(signer): State<AppState>,
    Path(key_index): Path<String>,
    body: Bytes,
) -> Result<Json<SignResponse>, StatusCode> {
    let key_index = parse_index(&key_index)?;
    let data = form_field(&body, "data").ok_or_else(|| {
        warn!("sign request for key {key_index} without data field");
        StatusCode::BAD_REQUEST
    })?;

    let len = data.len();
    let signature = tokio::task::spawn_blocking({
        let key_index = key_index.clone();
        move || signer.sign_raw(&key_index, &data)
    })
    .await
    .map_err(|e| {
        error!("signing task failed: {e}");
        StatusCode::INTERNAL_SERVER_ERROR
    })?
    .map_err(|e| {
        error!("signing with key {key_index} failed: {e}");
        status_for(&e)
    })?;

    info!("signed {len} bytes with key {key_index}");
    Ok(Json(SignResponse {
        signature: STANDARD.encode(signature),
    }))
}

/// `GET /verify/{key_index}`: `200` if the key resolves, `404` otherwise.
///
/// # Errors
///
/// `400` for a malformed index, `404` for an unresolvable key.
pub async fn verify_handler(
    State(signer): State<AppState>,
    Path(key_index): Path<String>,
) -> Result<StatusCode, StatusCode> {
    let key_index = parse_index(&key_index)?;
    tokio::task::spawn_blocking({
        let key_index = key_index.clone();
        move || signer.check_key(&key_index)
    })
    .await
    .map_err(|e| {
        error!("key check task failed: {e}");
        StatusCode::INTERNAL_SERVER_ERROR
    })?
    .map_err(|e| {
        warn!("key {key_index} unavailable: {e}");
        status_for(&e)
    })?;
    Ok(StatusCode::OK)
}
