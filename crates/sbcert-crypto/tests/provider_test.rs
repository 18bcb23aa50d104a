use std::path::Path;
use std::sync::OnceLock;

use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::pss::{Signature, VerifyingKey};
use rsa::signature::Verifier;
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;
use sbcert_crypto::{CryptoError, CryptoProvider, RustCryptoProvider, NP_LEN, N_LEN, SIGNATURE_LEN};
use sha2::Sha256;
use tempfile::TempDir;

fn test_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| RsaPrivateKey::new(&mut rand::thread_rng(), 3072).unwrap())
}

fn write_public(dir: &Path, key: &RsaPrivateKey) -> std::path::PathBuf {
    let path = dir.join("pub.pem");
    let pem = key.to_public_key().to_public_key_pem(LineEnding::LF).unwrap();
    std::fs::write(&path, pem).unwrap();
    path
}

#[test]
fn public_params_encode_modulus_big_endian() {
    let dir = TempDir::new().unwrap();
    let key = test_key();
    let path = write_public(dir.path(), key);

    let params = RustCryptoProvider::new().public_params(&path).unwrap();
    assert_eq!(params.n().as_slice(), key.n().to_bytes_be().as_slice());
    assert_eq!(params.to_bytes().len(), N_LEN + NP_LEN);
    // Np of a full-width 3072-bit modulus is 133 bits wide.
    assert!(params.np()[..3].iter().all(|b| *b == 0));
    assert_ne!(params.np()[3], 0);
}

#[test]
fn hashed_public_params_matches_params_hash() {
    let dir = TempDir::new().unwrap();
    let path = write_public(dir.path(), test_key());
    let provider = RustCryptoProvider::new();
    assert_eq!(
        provider.hashed_public_params(&path).unwrap(),
        provider.public_params(&path).unwrap().hash()
    );
}

#[test]
fn signs_with_encrypted_key_and_passphrase() {
    let dir = TempDir::new().unwrap();
    let key = test_key();
    let key_path = dir.path().join("priv.pem");
    let pass_path = dir.path().join("pass.txt");
    let pem = key
        .to_pkcs8_encrypted_pem(&mut rand::thread_rng(), b"hunter2", LineEnding::LF)
        .unwrap();
    std::fs::write(&key_path, pem.as_bytes()).unwrap();
    std::fs::write(&pass_path, "hunter2\n").unwrap();

    let data = [0u8, 1, 2, 3];
    let sig = RustCryptoProvider::new()
        .rsa_sign(&data, &key_path, Some(&pass_path))
        .unwrap();
    assert_eq!(sig.len(), SIGNATURE_LEN);

    let verifying_key = VerifyingKey::<Sha256>::new(key.to_public_key());
    let sig = Signature::try_from(sig.as_slice()).unwrap();
    assert!(verifying_key.verify(&data, &sig).is_ok());
}

#[test]
fn wrong_passphrase_is_key_parse_error() {
    let dir = TempDir::new().unwrap();
    let key_path = dir.path().join("priv.pem");
    let pass_path = dir.path().join("pass.txt");
    let pem = test_key()
        .to_pkcs8_encrypted_pem(&mut rand::thread_rng(), b"right", LineEnding::LF)
        .unwrap();
    std::fs::write(&key_path, pem.as_bytes()).unwrap();
    std::fs::write(&pass_path, "wrong").unwrap();

    let err = RustCryptoProvider::new()
        .rsa_sign(b"data", &key_path, Some(&pass_path))
        .unwrap_err();
    assert!(matches!(err, CryptoError::KeyParse { .. }), "{err}");
}

#[test]
fn missing_key_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = RustCryptoProvider::new()
        .rsa_sign(b"data", &dir.path().join("absent.pem"), None)
        .unwrap_err();
    assert!(matches!(err, CryptoError::Io { .. }));
}

#[test]
fn rejects_short_modulus() {
    let dir = TempDir::new().unwrap();
    let small = RsaPrivateKey::new(&mut rand::thread_rng(), 1024).unwrap();
    let path = write_public(dir.path(), &small);
    let err = RustCryptoProvider::new().public_params(&path).unwrap_err();
    assert!(matches!(err, CryptoError::ModulusSize { got: 1024, .. }), "{err}");
}
