//! sbcert signing service library.
#![deny(warnings, clippy::all, clippy::pedantic)]
#![warn(missing_docs)]

/// Server configuration from environment variables.
pub mod config;
/// `application/x-www-form-urlencoded` body decoding.
pub mod form;
/// Route handlers.
pub mod handlers;
pub mod router;
