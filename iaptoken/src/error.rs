use std::{
    error::Error as StdError,
    sync::Arc,
};

use thiserror::Error;

/// Errors raised by any stage of assertion verification
///
/// Every internal stage (parsing, key retrieval, signature verification and
/// claim checks) reports failures through this one enum. Callers of
/// [`Validator::validate`] receive it wrapped in an [`InvalidTokenError`].
///
/// [`Validator::validate`]: crate::validation::Validator::validate
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    /// Error raised when the token is not a well-formed compact JWS
    #[error("malformed token: {0}")]
    Malformed(#[from] MalformedToken),

    /// Error raised when the key set cannot be retrieved from the issuer
    #[error("unable to fetch verification keys: {0}")]
    KeyFetch(#[from] KeyFetchError),

    /// Error raised when a key set entry cannot be decoded into a usable public key
    #[error("verification key {kid:?} could not be decoded: {reason}")]
    KeyParse {
        /// `kid` of the offending key set entry
        kid: String,
        /// what was wrong with it
        reason: &'static str,
    },

    /// Error raised when the `alg` header names anything other than `ES256`
    #[error("token 'alg' header {0:?} is not supported")]
    UnsupportedAlgorithm(String),

    /// Error raised when no key in the key set matches the `kid` header
    #[error("no verification key matches 'kid' header {0:?}")]
    UnknownKey(String),

    /// Error raised when the signature does not verify against the selected key
    #[error("invalid signature")]
    SignatureMismatch,

    /// Error raised when a mandatory claim is absent or has the wrong JSON type
    #[error("the '{0}' claim is missing or malformed")]
    MissingClaim(&'static str),

    /// Error raised when `exp` is in the past, beyond the allowed drift
    #[error("the token expired")]
    Expired,

    /// Error raised when `iat` is in the future, beyond the allowed drift
    #[error("the token was issued in the future")]
    NotYetValid,

    /// Error raised when `aud` does not contain the configured audience
    #[error("bad audience")]
    InvalidAudience,

    /// Error raised when `iss` is not the proxy's issuer
    #[error("bad issuer")]
    InvalidIssuer,
}

impl ValidationError {
    /// Returns `true` for failures caused by the key endpoint rather than the token.
    ///
    /// These are the only failures worth retrying.
    #[must_use]
    pub const fn is_key_set_error(&self) -> bool {
        matches!(self, Self::KeyFetch(_) | Self::KeyParse { .. })
    }

    /// Returns `true` for failures raised by the claim checks.
    #[must_use]
    pub const fn is_claim_error(&self) -> bool {
        matches!(
            self,
            Self::MissingClaim(_)
                | Self::Expired
                | Self::NotYetValid
                | Self::InvalidAudience
                | Self::InvalidIssuer
        )
    }
}

/// Structural problems with a compact-serialized token
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MalformedToken {
    /// Error raised when the token does not contain three dot-delimited sections
    #[error("token contained wrong number of dot-delimited sections")]
    SectionCount(#[from] SplitError),

    /// Error raised when any of the three sections is empty
    #[error("token contained an empty section")]
    EmptySection,

    /// Error raised when a section is not base64 url-safe encoded
    #[error("token sections must use base64 url safe encoding")]
    InvalidEncoding,

    /// Error raised when the header is not a JSON object with a string `alg`
    #[error("header could not be deserialized")]
    HeaderDeserialization,

    /// Error raised when the payload is not a JSON object
    #[error("payload could not be deserialized")]
    PayloadDeserialization,

    /// Error raised when the token is larger than the configured size limit
    #[error("token was above set size threshold")]
    OverSizeThreshold,
}

/// Errors raised during the compact-encoded token split process
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SplitError {
    /// Error raised when the token contains less than three sections
    #[error("token contained less than three sections")]
    Undersized,

    /// Error raised when the token contains more than three sections
    #[error("token contained more than three sections")]
    Oversized,
}

/// Failures retrieving the key set document
#[derive(Debug, Clone, Error)]
pub enum KeyFetchError {
    /// The transport failed before a response was received (includes timeouts)
    #[error("request failed: {0}")]
    Transport(#[source] Arc<dyn StdError + Send + Sync>),

    /// The endpoint answered with a non-success status
    #[error("endpoint returned HTTP {0}")]
    Status(u16),

    /// The body is not a key set document
    #[error("malformed key set document: {0}")]
    MalformedDocument(String),
}

/// The single error returned by [`Validator::validate`]
///
/// Callers only need to know that the token must be rejected; the
/// originating [`ValidationError`] stays reachable through [`kind`] and
/// [`std::error::Error::source`] for diagnostics.
///
/// [`Validator::validate`]: crate::validation::Validator::validate
/// [`kind`]: InvalidTokenError::kind
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct InvalidTokenError {
    message: String,
    #[source]
    cause: ValidationError,
}

impl InvalidTokenError {
    pub(crate) fn new(cause: ValidationError) -> Self {
        let message = if cause.is_claim_error() {
            format!("invalid claim: {cause}")
        } else {
            format!("unable to load and verify the token: {cause}")
        };
        Self { message, cause }
    }

    /// The stage-specific failure behind this rejection
    #[must_use]
    pub const fn kind(&self) -> &ValidationError {
        &self.cause
    }

    /// Human-readable description including the cause
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Unwraps the stage-specific failure
    #[must_use]
    pub fn into_kind(self) -> ValidationError {
        self.cause
    }
}

impl From<ValidationError> for InvalidTokenError {
    fn from(cause: ValidationError) -> Self {
        Self::new(cause)
    }
}
