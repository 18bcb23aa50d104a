use std::path::Path;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sbcert_crypto::{CryptoError, CryptoProvider, PublicKeyParams};
use sbcert_sign_server::router::build_router;
use sbcert_signer::{KeyIndex, KeyTable, LocalSigner, RemoteSigner, Signer};
use tempfile::TempDir;

/// Prefixes the data with the key file's first byte.
struct TagCrypto;

impl CryptoProvider for TagCrypto {
    fn rsa_sign(
        &self,
        data: &[u8],
        key_file: &Path,
        _: Option<&Path>,
    ) -> Result<Vec<u8>, CryptoError> {
        let key = std::fs::read(key_file).map_err(|e| CryptoError::KeyParse {
            path: key_file.to_path_buf(),
            reason: e.to_string(),
        })?;
        if key.is_empty() {
            return Err(CryptoError::Sign("empty key".into()));
        }
        let mut out = vec![key[0]];
        out.extend_from_slice(data);
        Ok(out)
    }

    fn public_params(&self, _: &Path) -> Result<PublicKeyParams, CryptoError> {
        unreachable!("not used by the server")
    }
}

/// Signals when signing starts and holds it until released.
struct GatedCrypto {
    entered: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
}

impl CryptoProvider for GatedCrypto {
    fn rsa_sign(&self, data: &[u8], _: &Path, _: Option<&Path>) -> Result<Vec<u8>, CryptoError> {
        let _ = self.entered.lock().unwrap().send(());
        self.release
            .lock()
            .unwrap()
            .recv_timeout(Duration::from_secs(2))
            .map_err(|e| CryptoError::Sign(e.to_string()))?;
        Ok(data.to_vec())
    }

    fn public_params(&self, _: &Path) -> Result<PublicKeyParams, CryptoError> {
        unreachable!("not used by the server")
    }
}

fn key_table(dir: &TempDir) -> Arc<KeyTable> {
    std::fs::write(dir.path().join("oem.pem"), [0x7E]).unwrap();
    std::fs::write(dir.path().join("broken.pem"), b"").unwrap();
    std::fs::write(
        dir.path().join("keys.toml"),
        "[keys.0]\nfilename = \"oem.pem\"\n\n[keys.1]\nfilename = \"broken.pem\"\n\n[keys.2]\nfilename = \"gone.pem\"\n",
    )
    .unwrap();
    Arc::new(KeyTable::load(&dir.path().join("keys.toml")).unwrap())
}

fn signer(dir: &TempDir) -> LocalSigner {
    LocalSigner::new(key_table(dir), Arc::new(TagCrypto))
}

fn server(dir: &TempDir) -> TestServer {
    TestServer::new(build_router(signer(dir))).unwrap()
}

async fn put_form(server: &TestServer, path: &str, body: &str) -> axum_test::TestResponse {
    server
        .put(path)
        .text(body)
        .content_type("application/x-www-form-urlencoded")
        .await
}

#[tokio::test]
async fn health_returns_ok() {
    let dir = TempDir::new().unwrap();
    let response = server(&dir).get("/healthz").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<serde_json::Value>()["status"], "ok");
}

#[tokio::test]
async fn sign_returns_raw_signature_in_base64() {
    let dir = TempDir::new().unwrap();
    let response = put_form(&server(&dir), "/sign/0", "data=%00%01%FF").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    let signature = STANDARD.decode(body["signature"].as_str().unwrap()).unwrap();
    assert_eq!(signature, [0x7E, 0x00, 0x01, 0xFF]);
}

#[tokio::test]
async fn sign_without_data_is_bad_request() {
    let dir = TempDir::new().unwrap();
    let response = put_form(&server(&dir), "/sign/0", "payload=00").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sign_with_unknown_key_is_not_found() {
    let dir = TempDir::new().unwrap();
    let response = put_form(&server(&dir), "/sign/9", "data=ab").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn signing_failure_is_internal_error() {
    let dir = TempDir::new().unwrap();
    let response = put_form(&server(&dir), "/sign/1", "data=ab").await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn verify_distinguishes_available_keys() {
    let dir = TempDir::new().unwrap();
    let server = server(&dir);
    assert_eq!(server.get("/verify/0").await.status_code(), StatusCode::OK);
    assert_eq!(
        server.get("/verify/2").await.status_code(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        server.get("/verify/9").await.status_code(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn remote_signer_matches_local_signer() {
    let dir = TempDir::new().unwrap();
    let local = signer(&dir);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_router(local.clone());
    tokio::spawn(async move { axum::serve(listener, app).await });

    let remote = RemoteSigner::new(
        format!("http://{addr}/"),
        std::time::Duration::from_secs(5),
    )
    .unwrap();
    let key = KeyIndex::from(0);
    let data: Vec<u8> = (0..=255).collect();

    let expected = local.sign(&key, &data).await.unwrap();
    assert_eq!(remote.sign(&key, &data).await.unwrap(), expected);
    assert_eq!(expected[expected.len() - 1], 0x7E);
    remote.verify_key(&key).await.unwrap();
}

#[tokio::test]
async fn key_check_waits_off_the_runtime_while_signing() {
    let dir = TempDir::new().unwrap();
    let (entered_tx, entered) = channel();
    let (release, gate) = channel();
    let crypto = GatedCrypto {
        entered: Mutex::new(entered_tx),
        release: Mutex::new(gate),
    };
    let server = TestServer::new(build_router(LocalSigner::new(
        key_table(&dir),
        Arc::new(crypto),
    )))
    .unwrap();

    let (signed, verified, ()) = tokio::join!(
        put_form(&server, "/sign/0", "data=ab"),
        async {
            while entered.try_recv().is_err() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            server.get("/verify/0").await
        },
        async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            release.send(()).unwrap();
        }
    );
    assert_eq!(signed.status_code(), StatusCode::OK);
    assert_eq!(verified.status_code(), StatusCode::OK);
}
