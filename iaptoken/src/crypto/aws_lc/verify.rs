use aws_lc_rs::signature::{
    ECDSA_P256_SHA256_FIXED,
    ParsedPublicKey,
};

use crate::error::ValidationError;

/// Length of one P-256 affine coordinate
pub(crate) const COORDINATE_LEN: usize = 32;

/// SEC1 tag for an uncompressed point
const UNCOMPRESSED_TAG: u8 = 0x04;

/// ECDSA P-256 public key verifying fixed-width (`r || s`) SHA-256 signatures
///
/// The point is parsed once, when the key set is loaded, so that a bad
/// key is reported as a key set problem instead of as a bad signature.
#[derive(Debug)]
pub struct EcPublicKey {
    key: ParsedPublicKey,
}

impl EcPublicKey {
    /// Builds a key from the big-endian affine coordinates of a JWK (`x`, `y`).
    ///
    /// # Errors
    ///
    /// A static description of the problem when a coordinate is not 32 bytes
    /// long or the point is not on the P-256 curve.
    pub fn from_coordinates(x: &[u8], y: &[u8]) -> Result<Self, &'static str> {
        if x.len() != COORDINATE_LEN || y.len() != COORDINATE_LEN {
            return Err("coordinates must be 32 bytes");
        }
        let mut point = Vec::with_capacity(1 + 2 * COORDINATE_LEN);
        point.push(UNCOMPRESSED_TAG);
        point.extend_from_slice(x);
        point.extend_from_slice(y);
        Self::from_uncompressed_point(&point)
    }

    /// Builds a key from a SEC1 uncompressed point (`0x04 || x || y`).
    ///
    /// # Errors
    ///
    /// A static description of the problem when the bytes are not a point on
    /// the P-256 curve.
    pub fn from_uncompressed_point(point: &[u8]) -> Result<Self, &'static str> {
        ParsedPublicKey::new(&ECDSA_P256_SHA256_FIXED, point)
            .map(|key| Self { key })
            .map_err(|_| "not a point on the P-256 curve")
    }

    /// Verifies `signature` over `message`.
    ///
    /// # Errors
    ///
    /// [`ValidationError::SignatureMismatch`] when the signature is not valid for
    /// this key, including when it is not exactly 64 bytes.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), ValidationError> {
        self.key
            .verify_sig(message, signature)
            .map_err(|_| ValidationError::SignatureMismatch)
    }
}
