use base64_simd::URL_SAFE_NO_PAD as b64;

use crate::{
    claims::Claims,
    decoding::SplitToken,
    error::MalformedToken,
    header::Header,
};

/// A parsed, not yet trusted, compact-serialized signed token
///
/// Produced by [`SignedToken::parse`] and never mutated afterwards. The
/// claims can only be taken out through signature verification, see
/// [`verify`](crate::validation::verify).
#[derive(Debug)]
pub struct SignedToken<'a> {
    raw: &'a str,
    message_len: usize,
    header: Header,
    claims: Claims,
    signature: Vec<u8>,
}

impl<'a> SignedToken<'a> {
    /// Splits and decodes `token` without checking its signature.
    ///
    /// # Errors
    ///
    /// - [`MalformedToken::SectionCount`] when the token does not contain
    ///   exactly three dot-delimited sections
    /// - [`MalformedToken::EmptySection`] when any section is empty
    /// - [`MalformedToken::InvalidEncoding`] when a section is not base64 url-safe
    ///   encoded (without padding)
    /// - [`MalformedToken::HeaderDeserialization`] when the header is not a JSON
    ///   object carrying a string `alg`
    /// - [`MalformedToken::PayloadDeserialization`] when the payload is not a
    ///   JSON object
    pub fn parse(token: &'a str) -> Result<Self, MalformedToken> {
        let split = SplitToken::try_from(token.as_bytes())?;
        if split.has_empty_section() {
            return Err(MalformedToken::EmptySection);
        }

        let header = b64
            .decode_to_vec(split.b64_header())
            .map_err(|_| MalformedToken::InvalidEncoding)?;
        let payload = b64
            .decode_to_vec(split.b64_payload())
            .map_err(|_| MalformedToken::InvalidEncoding)?;
        let signature = b64
            .decode_to_vec(split.b64_signature())
            .map_err(|_| MalformedToken::InvalidEncoding)?;

        let header = serde_json::from_slice::<Header>(&header)
            .map_err(|_| MalformedToken::HeaderDeserialization)?;
        let claims = serde_json::from_slice::<Claims>(&payload)
            .map_err(|_| MalformedToken::PayloadDeserialization)?;

        Ok(Self {
            raw: token,
            message_len: split.b64_message().len(),
            header,
            claims,
            signature,
        })
    }

    /// The original compact string
    #[must_use]
    pub const fn as_str(&self) -> &'a str {
        self.raw
    }

    #[must_use]
    pub const fn header(&self) -> &Header {
        &self.header
    }

    /// Exactly the bytes the issuer signed: `base64url(header) || '.' || base64url(payload)`
    #[must_use]
    pub fn signing_input(&self) -> &[u8] {
        &self.raw.as_bytes()[..self.message_len]
    }

    /// Decoded signature bytes
    #[must_use]
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    pub(crate) fn into_claims(self) -> Claims {
        self.claims
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::{
        MalformedToken,
        SignedToken,
    };
    use crate::error::SplitError;

    #[test]
    fn parse_valid_token_ok() {
        // header: {"alg":"ES256","kid":"k"}
        // claims: {"sub":"x"}
        // signature: "SIG"
        let jwt = "eyJhbGciOiJFUzI1NiIsImtpZCI6ImsifQ.eyJzdWIiOiJ4In0.U0lH";
        let token = SignedToken::parse(jwt).unwrap();
        assert_eq!(token.header().alg(), "ES256");
        assert_eq!(token.header().kid(), Some("k"));
        assert_eq!(
            token.signing_input(),
            b"eyJhbGciOiJFUzI1NiIsImtpZCI6ImsifQ.eyJzdWIiOiJ4In0"
        );
        assert_eq!(token.signature(), b"SIG");
        assert_eq!(token.as_str(), jwt);
        assert_eq!(token.into_claims().sub(), Some("x"));
    }

    #[test]
    fn invalid_format_token() {
        let err = SignedToken::parse("invalid_format_token").unwrap_err();
        assert_eq!(err, MalformedToken::SectionCount(SplitError::Undersized));

        let err = SignedToken::parse("a.b.c.d").unwrap_err();
        assert_eq!(err, MalformedToken::SectionCount(SplitError::Oversized));
    }

    #[test]
    fn empty_signature_rejected() {
        let err = SignedToken::parse("e30.e30.").unwrap_err();
        assert_eq!(err, MalformedToken::EmptySection);
    }

    #[test]
    fn invalid_base64_rejected() {
        for jwt in ["=.e30.U0lH", "e30.=.U0lH", "e30.e30.-=-", "e30.e30.U0lH+"] {
            let err = SignedToken::parse(jwt).unwrap_err();
            assert_eq!(err, MalformedToken::InvalidEncoding, "{jwt}");
        }
    }

    #[test]
    fn header_without_alg_rejected() {
        // header: {}
        let err = SignedToken::parse("e30.e30.U0lH").unwrap_err();
        assert_eq!(err, MalformedToken::HeaderDeserialization);
    }

    #[test]
    fn non_object_payload_rejected() {
        // header: {"alg":"ES256","kid":"k"}
        // claims: []
        let err = SignedToken::parse("eyJhbGciOiJFUzI1NiIsImtpZCI6ImsifQ.W10.U0lH").unwrap_err();
        assert_eq!(err, MalformedToken::PayloadDeserialization);
    }
}
