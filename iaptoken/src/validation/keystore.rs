//! Verification keys published by the issuer and the shared cache in front of them
use std::{
    collections::BTreeMap,
    fmt,
    sync::{
        Arc,
        Mutex,
        PoisonError,
        RwLock,
        atomic::{
            AtomicU64,
            Ordering,
        },
    },
    time::{
        Duration,
        Instant,
    },
};

use tracing::{
    debug,
    info,
    warn,
};

use crate::{
    JWK_URL,
    crypto::aws_lc::EcPublicKey,
    error::{
        KeyFetchError,
        ValidationError,
    },
    header::Header,
    jwk::parse_key_set,
    transport::HttpClient,
};

/// In-memory set of ES256 public keys, ordered and looked up by `kid`
///
/// Published entries whose key material could not be decoded are remembered
/// by `kid` with the reason, so that only tokens selecting them fail.
#[derive(Debug, Default)]
pub struct KeySet {
    keys: BTreeMap<String, EcPublicKey>,
    unusable: BTreeMap<String, &'static str>,
}

impl KeySet {
    /// Instantiates a new, empty [`KeySet`]
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            keys: BTreeMap::new(),
            unusable: BTreeMap::new(),
        }
    }

    /// Adds a key, replacing any previous entry with the same `kid`
    pub fn add_key(&mut self, key_id: impl Into<String>, key: EcPublicKey) {
        let key_id = key_id.into();
        self.unusable.remove(&key_id);
        self.keys.insert(key_id, key);
    }

    /// Records a published `kid` whose key material is unusable, replacing any
    /// previous entry with the same `kid`
    pub fn add_unusable(&mut self, key_id: impl Into<String>, reason: &'static str) {
        let key_id = key_id.into();
        self.keys.remove(&key_id);
        self.unusable.insert(key_id, reason);
    }

    /// Removes a key, usable or not, from the set
    pub fn remove_key(&mut self, key_id: impl AsRef<str>) {
        self.keys.remove(key_id.as_ref());
        self.unusable.remove(key_id.as_ref());
    }

    #[must_use]
    pub fn get(&self, key_id: &str) -> Option<&EcPublicKey> {
        self.keys.get(key_id)
    }

    /// Resolves the key named by the token's `kid` header.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::KeyParse`] when the `kid` names a published entry
    ///   whose key material is unusable
    /// - [`ValidationError::UnknownKey`] when the header has no `kid` or no
    ///   entry in the set carries it
    pub fn resolve_key(&self, header: &Header) -> Result<&EcPublicKey, ValidationError> {
        let kid = header.kid().unwrap_or_default();
        if let Some(key) = self.keys.get(kid) {
            return Ok(key);
        }
        match self.unusable.get(kid) {
            Some(&reason) => Err(ValidationError::KeyParse {
                kid: kid.to_owned(),
                reason,
            }),
            None => Err(ValidationError::UnknownKey(kid.to_owned())),
        }
    }

    /// Identifiers of usable keys, in order
    pub fn kids(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    /// Identifiers of unusable entries with the reason, in order
    pub fn unusable_kids(&self) -> impl Iterator<Item = (&str, &'static str)> {
        self.unusable
            .iter()
            .map(|(kid, reason)| (kid.as_str(), *reason))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

struct CachedKeySet {
    keys: Arc<KeySet>,
    fetched_at: Instant,
}

#[derive(Default)]
struct FetchState {
    // attempt number and error of the latest fetch, when it failed
    last_failure: Option<(u64, ValidationError)>,
}

/// Lazily fetched, shared cache of the issuer's [`KeySet`]
///
/// One provider is meant to be created per process and handed to every
/// [`Validator`](crate::validation::Validator) as an `Arc<KeySetProvider>`.
///
/// The key set is fetched from [`JWK_URL`] on first use and kept until
/// [`reset`](Self::reset) is called or, when configured, the TTL elapses.
/// A refresh replaces the whole set.
///
/// Population is single-flight: callers arriving while a fetch is in flight
/// block on it and share its outcome, success or failure. A caller arriving
/// after a failed attempt has been fully released starts a new one. Once
/// populated, lookups only take a read lock.
pub struct KeySetProvider {
    client: Box<dyn HttpClient>,
    ttl: Option<Duration>,
    cached: RwLock<Option<CachedKeySet>>,
    fetch_gate: Mutex<FetchState>,
    // attempt numbers; `finished` only advances after `fetch_gate` is released
    started: AtomicU64,
    finished: AtomicU64,
}

impl KeySetProvider {
    /// Creates an empty provider which fetches through `client`.
    pub fn new(client: impl HttpClient + 'static) -> Self {
        Self {
            client: Box::new(client),
            ttl: None,
            cached: RwLock::new(None),
            fetch_gate: Mutex::new(FetchState::default()),
            started: AtomicU64::new(0),
            finished: AtomicU64::new(0),
        }
    }

    /// Refetches the key set on the first use after `ttl` has elapsed.
    ///
    /// A failed refresh is reported to callers; the expired set is not served.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Returns the cached key set, fetching it first if needed.
    ///
    /// # Errors
    ///
    /// [`ValidationError::KeyFetch`] when the request fails, returns a
    /// non-success status, or the body is not a key set document.
    pub fn key_set(&self) -> Result<Arc<KeySet>, ValidationError> {
        if let Some(keys) = self.fresh() {
            return Ok(keys);
        }

        let finished = self.finished.load(Ordering::Acquire);
        let started = self.started.load(Ordering::Acquire);
        let in_flight = (started != finished).then_some(started);

        let mut gate = self
            .fetch_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // the attempt this caller waited on may have completed
        if let Some(keys) = self.fresh() {
            return Ok(keys);
        }
        if let Some(waited_on) = in_flight
            && let Some((attempt, err)) = &gate.last_failure
            && *attempt == waited_on
        {
            return Err(err.clone());
        }

        let attempt = self.started.fetch_add(1, Ordering::AcqRel) + 1;
        let result = self.fetch().map(Arc::new);
        match &result {
            Ok(keys) => {
                *self.cached.write().unwrap_or_else(PoisonError::into_inner) = Some(CachedKeySet {
                    keys: Arc::clone(keys),
                    fetched_at: Instant::now(),
                });
                gate.last_failure = None;
            }
            Err(err) => {
                warn!(error = %err, url = JWK_URL, "verification key set fetch failed");
                gate.last_failure = Some((attempt, err.clone()));
            }
        }
        drop(gate);
        self.finished.fetch_max(attempt, Ordering::AcqRel);
        result
    }

    /// Returns the cached key set without fetching
    #[must_use]
    pub fn cached(&self) -> Option<Arc<KeySet>> {
        self.fresh()
    }

    /// Drops the cached key set so the next use fetches it again
    pub fn reset(&self) {
        debug!("verification key set cache reset");
        *self.cached.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn fresh(&self) -> Option<Arc<KeySet>> {
        let cached = self.cached.read().unwrap_or_else(PoisonError::into_inner);
        let entry = cached.as_ref()?;
        if let Some(ttl) = self.ttl
            && entry.fetched_at.elapsed() >= ttl
        {
            debug!(?ttl, "verification key set expired");
            return None;
        }
        Some(Arc::clone(&entry.keys))
    }

    fn fetch(&self) -> Result<KeySet, ValidationError> {
        info!(url = JWK_URL, "fetching verification key set");
        let response = self
            .client
            .get(JWK_URL)
            .map_err(|err| KeyFetchError::Transport(Arc::from(err)))?;
        if !response.is_success() {
            return Err(KeyFetchError::Status(response.status).into());
        }
        let keys = parse_key_set(&response.body)?;
        info!(
            keys = keys.len(),
            unusable = keys.unusable_kids().count(),
            "verification key set cached"
        );
        Ok(keys)
    }
}

impl fmt::Debug for KeySetProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeySetProvider")
            .field("ttl", &self.ttl)
            .field("populated", &self.cached().is_some())
            .finish_non_exhaustive()
    }
}
