//! Identity claims carried in an assertion payload

use serde_json::{
    Map,
    Value,
};

/// `iss` (Issuer) claim name
pub const ISS: &str = "iss";
/// `aud` (Audience) claim name
pub const AUD: &str = "aud";
/// `exp` (Expiration Time) claim name
pub const EXP: &str = "exp";
/// `iat` (Issued At) claim name
pub const IAT: &str = "iat";

/// Decoded payload of an assertion
///
/// Holds every claim exactly as the proxy encoded it. The registered claims
/// used by validation have typed accessors which return [`None`] when the
/// claim is absent or of the wrong JSON type; everything else passes through
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    /// Looks up any claim by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Iterates every claim in the payload
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// `iss` (Issuer) claim
    ///
    /// Ref: [RFC 7519 4.1.1](<https://datatracker.ietf.org/doc/html/rfc7519#section-4.1.1>)
    #[must_use]
    pub fn iss(&self) -> Option<&str> {
        self.str_claim(ISS)
    }

    /// `aud` (Audience) claim, which may be a single string or an array of strings
    ///
    /// Returns [`None`] if the claim is absent, is neither form, or the array
    /// holds a non-string element.
    ///
    /// Ref: [RFC 7519 4.1.3](<https://datatracker.ietf.org/doc/html/rfc7519#section-4.1.3>)
    #[must_use]
    pub fn aud(&self) -> Option<Vec<&str>> {
        match self.0.get(AUD)? {
            Value::String(aud) => Some(vec![aud.as_str()]),
            Value::Array(auds) => auds.iter().map(Value::as_str).collect(),
            _ => None,
        }
    }

    /// `exp` (Expiration Time) claim in seconds since the epoch
    ///
    /// Ref: [RFC 7519 4.1.4](<https://datatracker.ietf.org/doc/html/rfc7519#section-4.1.4>)
    #[must_use]
    pub fn exp(&self) -> Option<i64> {
        self.numeric_date(EXP)
    }

    /// `iat` (Issued At) claim in seconds since the epoch
    ///
    /// Ref: [RFC 7519 4.1.6](<https://datatracker.ietf.org/doc/html/rfc7519#section-4.1.6>)
    #[must_use]
    pub fn iat(&self) -> Option<i64> {
        self.numeric_date(IAT)
    }

    /// `sub`: the proxy's stable identifier for the signed-in account
    #[must_use]
    pub fn sub(&self) -> Option<&str> {
        self.str_claim("sub")
    }

    /// `email` of the signed-in account
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.str_claim("email")
    }

    /// `hd`: hosted domain of the account, when it belongs to one
    #[must_use]
    pub fn hosted_domain(&self) -> Option<&str> {
        self.str_claim("hd")
    }

    fn str_claim(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    // NumericDate may legally carry a fractional part
    #[allow(clippy::cast_possible_truncation)]
    fn numeric_date(&self, name: &str) -> Option<i64> {
        let value = self.0.get(name)?;
        value
            .as_i64()
            .or_else(|| value.as_f64().map(|secs| secs.floor() as i64))
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Claims> for Map<String, Value> {
    fn from(claims: Claims) -> Self {
        claims.0
    }
}

impl IntoIterator for Claims {
    type Item = (String, Value);
    type IntoIter = serde_json::map::IntoIter;
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use serde_json::json;

    use super::Claims;

    fn claims(value: serde_json::Value) -> Claims {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn proxy_claims_accessors() {
        let c = claims(json!({
            "iss": "https://cloud.google.com/iap",
            "sub": "accounts.google.com:117906422442754941368",
            "email": "user@example.com",
            "hd": "example.com",
            "aud": "/projects/657315109849/apps/test-iap",
            "exp": 1_538_302_173,
            "iat": 1_538_301_573,
        }));
        assert_eq!(c.iss(), Some("https://cloud.google.com/iap"));
        assert_eq!(c.sub(), Some("accounts.google.com:117906422442754941368"));
        assert_eq!(c.email(), Some("user@example.com"));
        assert_eq!(c.hosted_domain(), Some("example.com"));
        assert_eq!(c.aud(), Some(vec!["/projects/657315109849/apps/test-iap"]));
        assert_eq!(c.exp(), Some(1_538_302_173));
        assert_eq!(c.iat(), Some(1_538_301_573));
        assert_eq!(c.len(), 7);
    }

    #[test]
    fn audience_array_form() {
        let c = claims(json!({"aud": ["a", "b"]}));
        assert_eq!(c.aud(), Some(vec!["a", "b"]));

        let c = claims(json!({"aud": ["a", 1]}));
        assert_eq!(c.aud(), None);

        let c = claims(json!({"aud": 1}));
        assert_eq!(c.aud(), None);
    }

    #[test]
    fn numeric_dates_accept_floats_and_reject_strings() {
        let c = claims(json!({"exp": 1_538_302_173.9, "iat": "1538301573"}));
        assert_eq!(c.exp(), Some(1_538_302_173));
        assert_eq!(c.iat(), None);

        let c = claims(json!({"exp": -1.5}));
        assert_eq!(c.exp(), Some(-2));
    }

    #[test]
    fn payload_must_be_an_object() {
        serde_json::from_value::<Claims>(json!(["iss"])).unwrap_err();
        serde_json::from_value::<Claims>(json!("iss")).unwrap_err();
    }
}
