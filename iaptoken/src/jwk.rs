//! JSON Web Key Set document published by the issuer
//!
//! Ref: [RFC 7517](<https://datatracker.ietf.org/doc/html/rfc7517>)

use base64_simd::URL_SAFE_NO_PAD as b64;
use tracing::{
    debug,
    warn,
};

use crate::{
    ALGORITHM,
    crypto::aws_lc::EcPublicKey,
    error::{
        KeyFetchError,
        ValidationError,
    },
    validation::KeySet,
};

/// Key set document: `{"keys": [...]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

/// One entry of a [`JwkSet`]
///
/// Only the parameters needed to select and rebuild an EC public key are
/// modelled; anything else in the document is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Jwk {
    pub kty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    #[serde(default, rename = "use", skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
}

impl Jwk {
    /// `true` when this entry is an ES256 signing key this crate can use
    #[must_use]
    pub fn is_es256_signing_key(&self) -> bool {
        self.kty == "EC"
            && self.crv.as_deref() == Some("P-256")
            && self.alg.as_deref().is_none_or(|alg| alg == ALGORITHM)
            && self.key_use.as_deref().is_none_or(|key_use| key_use == "sig")
    }

    fn to_public_key(&self) -> Result<EcPublicKey, &'static str> {
        let x = self.x.as_deref().ok_or("missing 'x'")?;
        let y = self.y.as_deref().ok_or("missing 'y'")?;
        let x = b64
            .decode_to_vec(x)
            .map_err(|_| "'x' is not base64url")?;
        let y = b64
            .decode_to_vec(y)
            .map_err(|_| "'y' is not base64url")?;
        EcPublicKey::from_coordinates(&x, &y)
    }
}

impl From<&JwkSet> for KeySet {
    /// Keeps every ES256 signing key that has a `kid`; other entries are skipped.
    ///
    /// An ES256 entry whose key material cannot be decoded does not spoil the
    /// rest of the document: it is recorded as unusable and only tokens
    /// selecting its `kid` are rejected.
    fn from(document: &JwkSet) -> Self {
        let mut keys = Self::empty();
        for jwk in &document.keys {
            let Some(kid) = jwk.kid.as_deref() else {
                debug!(kty = %jwk.kty, "skipping key set entry without 'kid'");
                continue;
            };
            if !jwk.is_es256_signing_key() {
                debug!(kid, kty = %jwk.kty, "skipping non-ES256 key set entry");
                continue;
            }
            match jwk.to_public_key() {
                Ok(key) => keys.add_key(kid, key),
                Err(reason) => {
                    warn!(kid, reason, "unusable verification key in key set");
                    keys.add_unusable(kid, reason);
                }
            }
        }
        keys
    }
}

/// Decodes a key set response body.
///
/// # Errors
///
/// [`KeyFetchError::MalformedDocument`] when the body is not a JSON key set
/// document.
pub fn parse_key_set(body: &[u8]) -> Result<KeySet, ValidationError> {
    let document = serde_json::from_slice::<JwkSet>(body)
        .map_err(|err| KeyFetchError::MalformedDocument(err.to_string()))?;
    Ok(KeySet::from(&document))
}
