//! [`aws-lc-rs`] crypto backend implementation
//!
//! Wraps [`aws-lc-rs`] ECDSA P-256 public keys so key set entries can
//! verify ES256 signatures directly.
//!
//! [`aws-lc-rs`]: aws_lc_rs

mod verify;

pub use verify::EcPublicKey;
