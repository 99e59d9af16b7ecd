#![allow(dead_code, clippy::unwrap_used)]
use std::{
    sync::{
        Arc,
        Mutex,
        atomic::{
            AtomicUsize,
            Ordering,
        },
    },
    thread,
    time::{
        Duration,
        SystemTime,
        UNIX_EPOCH,
    },
};

use aws_lc_rs::{
    rand::SystemRandom,
    signature::{
        ECDSA_P256_SHA256_FIXED_SIGNING,
        EcdsaKeyPair,
        KeyPair,
    },
};
use base64_simd::URL_SAFE_NO_PAD as b64;
use iaptoken::{
    ISSUER,
    JWK_URL,
    transport::{
        HttpClient,
        HttpResponse,
        TransportError,
    },
};
use serde_json::{
    Value,
    json,
};

pub const AUDIENCE: &str = "/projects/123456/global/backendServices/987654";

/// One hundred years, as configured by operators who do not care about expiry
pub const CENTURY: Duration = Duration::from_secs(86_400 * 365 * 100);

/// Signs assertions the way the proxy does: ES256 with a P-256 key named by `kid`
pub struct Signer {
    pair: EcdsaKeyPair,
    kid: String,
}

impl Signer {
    pub fn new(kid: &str) -> Self {
        Self {
            pair: EcdsaKeyPair::generate(&ECDSA_P256_SHA256_FIXED_SIGNING).unwrap(),
            kid: kid.to_owned(),
        }
    }

    pub fn kid(&self) -> &str {
        &self.kid
    }

    /// Public half of the key as a key set entry
    pub fn jwk(&self) -> Value {
        let point = self.pair.public_key().as_ref();
        json!({
            "alg": "ES256",
            "crv": "P-256",
            "kid": self.kid,
            "kty": "EC",
            "use": "sig",
            "x": b64.encode_to_string(&point[1..33]),
            "y": b64.encode_to_string(&point[33..]),
        })
    }

    pub fn sign(&self, claims: &Value) -> String {
        self.sign_with_header(&json!({"alg": "ES256", "kid": self.kid, "typ": "JWT"}), claims)
    }

    pub fn sign_with_header(&self, header: &Value, claims: &Value) -> String {
        let message = format!(
            "{}.{}",
            b64.encode_to_string(header.to_string()),
            b64.encode_to_string(claims.to_string())
        );
        let sig = self
            .pair
            .sign(&SystemRandom::new(), message.as_bytes())
            .unwrap();
        format!("{message}.{}", b64.encode_to_string(sig.as_ref()))
    }
}

pub fn key_set_document(signers: &[&Signer]) -> Vec<u8> {
    let keys: Vec<Value> = signers.iter().map(|signer| signer.jwk()).collect();
    json!({ "keys": keys }).to_string().into_bytes()
}

pub fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
        .cast_signed()
}

/// Claims the proxy would issue at `iat`, valid for ten minutes
pub fn claims_issued_at(iat: i64) -> Value {
    json!({
        "iss": ISSUER,
        "aud": AUDIENCE,
        "exp": iat + 600,
        "iat": iat,
        "sub": "accounts.google.com:118006483823423012345",
        "email": "jane@example.com",
        "hd": "example.com",
    })
}

/// In-memory key endpoint counting the requests it serves
pub struct KeyEndpoint {
    status: u16,
    body: Mutex<Vec<u8>>,
    delay: Duration,
    calls: AtomicUsize,
}

impl KeyEndpoint {
    pub fn serving(signers: &[&Signer]) -> Arc<Self> {
        Self::responding(200, key_set_document(signers))
    }

    pub fn responding(status: u16, body: Vec<u8>) -> Arc<Self> {
        Arc::new(Self {
            status,
            body: Mutex::new(body),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn slow(signers: &[&Signer], delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            status: 200,
            body: Mutex::new(key_set_document(signers)),
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    /// Publishes a new key set, as the proxy does when it rotates keys
    pub fn rotate(&self, signers: &[&Signer]) {
        *self.body.lock().unwrap() = key_set_document(signers);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl HttpClient for KeyEndpoint {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        assert_eq!(url, JWK_URL);
        self.calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(self.delay);
        Ok(HttpResponse::new(self.status, self.body.lock().unwrap().clone()))
    }
}

/// Endpoint that never answers
pub struct Unreachable {
    calls: AtomicUsize,
}

impl Unreachable {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl HttpClient for Unreachable {
    fn get(&self, _: &str) -> Result<HttpResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err("operation timed out".into())
    }
}
