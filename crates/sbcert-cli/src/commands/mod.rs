/// `key-cert`, `enabler-cert` and `developer-cert`.
pub mod generate;
/// `inspect`.
pub mod inspect;
/// `verify-key`.
pub mod verify_key;
