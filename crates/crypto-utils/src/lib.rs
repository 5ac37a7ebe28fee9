//! # crypto-utils
//!
//! Secure random generation and zeroize-on-drop buffers shared by the
//! signing crates.

pub mod error;
pub mod random;
pub mod zeroizing;

pub use error::CryptoError;
