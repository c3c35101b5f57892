//! Secret handling utilities.
//!
//! Re-exports secrecy types so provider credentials stay wrapped until the
//! moment a client is built.

pub use secrecy::{ExposeSecret, SecretString};
