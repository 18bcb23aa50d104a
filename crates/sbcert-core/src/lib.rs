//! Debug certificate chain builder.
//!
//! Certificates are laid out as `Header‖Body‖Signature`:
//!
//! ```text
//! KeyCertificate            -> attests EnablerDebugCertificate key (hash)
//!   EnablerDebugCertificate -> attests DeveloperDebugCertificate key (hash)
//!     DeveloperDebugCertificate (bound to one SoC ID)
//! ```
//!
//! The header records the signed size in words, which always equals the
//! structural size of `Header‖Body` for the certificate kind.
#![deny(warnings, clippy::all, clippy::pedantic)]
#![warn(missing_docs)]

pub mod body;
pub mod certificate;
pub mod chain;
pub mod config;
pub mod error;
pub mod generate;
pub mod header;
pub mod inspect;
pub mod output;
pub mod record;
pub mod types;

pub use body::{DeveloperDebugBody, EnablerDebugBody, KeyCertBody};
pub use certificate::{
    CertBody, Certificate, DeveloperDebugCertificate, EnablerDebugCertificate, KeyCertificate,
    Signature,
};
pub use chain::{ChainAssembler, Envelope, ENVELOPE_MAGIC};
pub use config::{CertConfig, DeveloperCertConfig, EnablerCertConfig, KeyCertConfig};
pub use error::{BuildError, CertError, Stage};
pub use generate::{
    generate_developer_certificate, generate_enabler_certificate, generate_key_certificate,
    load_config, load_signer,
};
pub use header::{CertHeader, CertKind};
pub use inspect::{inspect_chain, ChainEntry, ChainLayout};
pub use output::{hex_dump, write_output};
pub use record::Record;
pub use types::{DebugMask, HbkId, Lcs};
