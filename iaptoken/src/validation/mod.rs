//! Provides assertion validation functionality
//!
//! [`Validator`] ties the stages together: [`SignedToken`] parsing, key set
//! retrieval through a shared [`KeySetProvider`], signature [`verify`] and
//! the ordered claim [`check`].
//!
//! [`SignedToken`]: crate::decoding::SignedToken
pub mod keystore;

pub use config::ValidationConfig;
pub use keystore::{
    KeySet,
    KeySetProvider,
};
pub use pipeline::{
    Validator,
    ValidatorBuilder,
};
pub use signature::verify;
pub use validator::{
    ClaimCheck,
    check,
};

mod config;
mod pipeline;
mod signature;
mod validator;
