use crate::{
    ALGORITHM,
    claims::Claims,
    decoding::SignedToken,
    error::ValidationError,
    validation::KeySet,
};

/// Verifies the signature of `token` against `keys` and releases its claims.
///
/// The `alg` header is checked before any key lookup or cryptographic work;
/// only [`ALGORITHM`] is ever accepted, whatever the token declares. The
/// signature is checked over the exact encoded `header.payload` bytes of
/// the token.
///
/// # Errors
///
/// - [`ValidationError::UnsupportedAlgorithm`] when `alg` is not `ES256`
/// - [`ValidationError::UnknownKey`] when the `kid` header matches no key
/// - [`ValidationError::SignatureMismatch`] when the signature does not verify
pub fn verify(token: SignedToken<'_>, keys: &KeySet) -> Result<Claims, ValidationError> {
    let alg = token.header().alg();
    if alg != ALGORITHM {
        return Err(ValidationError::UnsupportedAlgorithm(alg.to_owned()));
    }

    let key = keys.resolve_key(token.header())?;
    key.verify(token.signing_input(), token.signature())?;

    Ok(token.into_claims())
}
