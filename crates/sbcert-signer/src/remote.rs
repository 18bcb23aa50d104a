//! Signing through a remote HTTP signing service.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::debug;
use percent_encoding::{percent_encode, NON_ALPHANUMERIC};
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;

use crate::error::SignerError;
use crate::key_index::KeyIndex;
use crate::signer::{BoxFuture, Signer};

/// Timeout applied to every signing service request unless configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
struct SignResponse {
    signature: String,
}

/// [`Signer`] backed by a signing service exposing `PUT /sign/{key_index}`
/// and `GET /verify/{key_index}`.
///
/// Each call issues exactly one request; nothing is retried.
#[derive(Debug, Clone)]
pub struct RemoteSigner {
    base_url: String,
    http: reqwest::Client,
}

impl RemoteSigner {
    /// Create a signer targeting `base_url` with a per-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SignerError> {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, http })
    }

    async fn sign_remote(&self, key_index: &KeyIndex, data: &[u8]) -> Result<Vec<u8>, SignerError> {
        let url = format!("{}/sign/{key_index}", self.base_url);
        debug!("requesting signature of {} bytes from {url}", data.len());

        let form = format!("data={}", percent_encode(data, NON_ALPHANUMERIC));
        let resp = self
            .http
            .put(&url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SignerError::Status {
                status: status.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            });
        }

        let body: SignResponse = resp
            .json()
            .await
            .map_err(|e| SignerError::Decode(e.to_string()))?;
        let mut signature = STANDARD
            .decode(body.signature.as_bytes())
            .map_err(|e| SignerError::Decode(format!("signature is not base64: {e}")))?;
        signature.reverse();
        Ok(signature)
    }

    async fn verify_remote(&self, key_index: &KeyIndex) -> Result<(), SignerError> {
        let url = format!("{}/verify/{key_index}", self.base_url);
        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(SignerError::Status {
                status: status.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            })
        }
    }
}

impl Signer for RemoteSigner {
    fn sign<'a>(
        &'a self,
        key_index: &'a KeyIndex,
        data: &'a [u8],
    ) -> BoxFuture<'a, Result<Vec<u8>, SignerError>> {
        Box::pin(self.sign_remote(key_index, data))
    }

    fn verify_key<'a>(&'a self, key_index: &'a KeyIndex) -> BoxFuture<'a, Result<(), SignerError>> {
        Box::pin(self.verify_remote(key_index))
    }
}
