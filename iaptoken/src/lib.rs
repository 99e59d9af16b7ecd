#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![doc = include_str!("../README.md")]

/// Identity claims carried in an assertion payload
pub mod claims;

/// Error enums
pub mod error;

/// Assertion header parameters
pub mod header;

/// Assertion validation: key set cache, signature verification and claim checks
pub mod validation;

/// Crypto backend implementations
pub mod crypto;

/// Key set document model
pub mod jwk;

/// HTTP capability used to fetch the key set
pub mod transport;

// WARNING: The decoding module is not considered part of the public API
// and is subject to breaking changes outside SemVer restrictions. It is
// marked `pub` purely for benchmarking purposes.
#[doc(hidden)]
pub mod decoding;

pub use claims::Claims;
pub use error::{
    InvalidTokenError,
    ValidationError,
};
pub use validation::{
    KeySetProvider,
    ValidationConfig,
    Validator,
};

/// Location of the proxy's published verification key set
pub const JWK_URL: &str = "https://www.gstatic.com/iap/verify/public_key-jwk";

/// `iss` value of every assertion signed by the proxy
pub const ISSUER: &str = "https://cloud.google.com/iap";

/// The only accepted `alg`: ECDSA using P-256 and SHA-256
pub const ALGORITHM: &str = "ES256";

/// Provides dangerous (i.e. non-signature-verifying) assertion decoding functionality.
pub mod dangerous {
    use crate::{
        claims::Claims,
        decoding::SignedToken,
        error::MalformedToken,
        header::Header,
    };

    /// Decodes an assertion without any signature or claim verification
    ///
    /// DANGER: does NOT verify the signature. Nothing returned here may be
    /// trusted; use it to inspect rejected assertions, never to authorize.
    ///
    /// # Errors
    ///
    /// Any [`MalformedToken`] raised while splitting and decoding the token.
    pub fn decode(token: &str) -> Result<(Header, Claims), MalformedToken> {
        let token = SignedToken::parse(token)?;
        Ok((token.header().clone(), token.into_claims()))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use crate::{
        dangerous::decode,
        error::{
            MalformedToken,
            SplitError,
        },
    };

    #[test]
    fn invalid_header_base64() {
        let err = decode("=.=.=").unwrap_err();
        assert_eq!(err, MalformedToken::InvalidEncoding);
    }

    #[test]
    fn invalid_header_json() {
        // header: {}
        // claims: {}
        let err = decode("e30.e30.U0lH").unwrap_err();
        assert_eq!(err, MalformedToken::HeaderDeserialization);
    }

    #[test]
    fn invalid_jwt_format() {
        let err = decode("...").unwrap_err();
        assert_eq!(err, MalformedToken::SectionCount(SplitError::Oversized));

        let err = decode(".").unwrap_err();
        assert_eq!(err, MalformedToken::SectionCount(SplitError::Undersized));
    }

    #[test]
    fn decodes_unverified_token() {
        // header: {"alg":"HS512"}
        // claims: {"sub":"test"}
        let (header, claims) = decode("eyJhbGciOiJIUzUxMiJ9.eyJzdWIiOiJ0ZXN0In0.U0lH").unwrap();
        assert_eq!(header.alg(), "HS512");
        assert_eq!(claims.sub(), Some("test"));
    }
}
