//! sbcert signing service entry point.

use std::sync::Arc;

use anyhow::Context;
use sbcert_crypto::RustCryptoProvider;
use sbcert_sign_server::{config::ServerConfig, router::build_router};
use sbcert_signer::{KeyTable, LocalSigner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = ServerConfig::from_env()?;
    let key_table = KeyTable::load(&config.key_table)
        .with_context(|| format!("loading key table {}", config.key_table.display()))?;
    log::info!("serving keys from {}", config.key_table.display());
    let signer = LocalSigner::new(Arc::new(key_table), Arc::new(RustCryptoProvider::new()));
    let app = build_router(signer);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    log::info!("listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
