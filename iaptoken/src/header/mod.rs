//! Protected header of a signed assertion, per RFC 7515 section 4.1

use serde_json::{
    Map,
    Value,
};

/// Decoded JOSE header
///
/// Only `alg` is required for the header to deserialize. A missing `kid`
/// surfaces later as an unknown-key failure, since no key can be selected.
/// Unregistered parameters are kept in [`Header::get`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Header {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Header {
    /// `alg` (Algorithm) header parameter, as declared by the token
    ///
    /// Ref: [RFC 7515 4.1.1](<https://datatracker.ietf.org/doc/html/rfc7515#section-4.1.1>)
    #[must_use]
    pub fn alg(&self) -> &str {
        &self.alg
    }

    /// `kid` (Key ID) header parameter
    ///
    /// Ref: [RFC 7515 4.1.4](<https://datatracker.ietf.org/doc/html/rfc7515#section-4.1.4>)
    #[must_use]
    pub fn kid(&self) -> Option<&str> {
        self.kid.as_deref()
    }

    /// `typ` (Type) header parameter
    ///
    /// Ref: [RFC 7515 4.1.9](<https://datatracker.ietf.org/doc/html/rfc7515#section-4.1.9>)
    #[must_use]
    pub fn typ(&self) -> Option<&str> {
        self.typ.as_deref()
    }

    /// Any other header parameter
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }
}
