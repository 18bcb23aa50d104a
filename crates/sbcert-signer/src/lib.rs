//! Signing backends for sbcert: the [`Signer`] capability, its local and
//! remote implementations, and the configuration-driven factory.
#![deny(warnings, clippy::all, clippy::pedantic)]
#![warn(missing_docs)]

pub mod error;
pub mod factory;
pub mod key_index;
pub mod key_table;
pub mod local;
pub mod remote;
pub mod signer;
mod workdir;

pub use error::{ConfigError, SignerError};
pub use factory::{SignerFactory, SignerKind};
pub use key_index::KeyIndex;
pub use key_table::{KeyEntry, KeyTable};
pub use local::LocalSigner;
pub use remote::RemoteSigner;
pub use signer::{BoxFuture, Signer};
