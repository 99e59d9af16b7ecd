use std::{
    sync::Arc,
    time::{
        Duration,
        SystemTime,
        UNIX_EPOCH,
    },
};

use tracing::debug;

use crate::{
    claims::Claims,
    decoding::SignedToken,
    error::{
        InvalidTokenError,
        MalformedToken,
        ValidationError,
    },
    validation::{
        KeySetProvider,
        ValidationConfig,
        check,
        verify,
    },
};

pub struct ValidatorBuilder {
    key_set_provider: Arc<KeySetProvider>,
    config: ValidationConfig,
}

impl ValidatorBuilder {
    pub(crate) fn new(key_set_provider: Arc<KeySetProvider>, audience: impl Into<String>) -> Self {
        Self {
            key_set_provider,
            config: ValidationConfig::new(audience),
        }
    }

    /// Tolerates up to `allowed_drift` of clock disagreement on `exp` and `iat`
    #[must_use]
    pub fn with_allowed_drift(mut self, allowed_drift: Duration) -> Self {
        self.config = self.config.with_allowed_drift(allowed_drift);
        self
    }

    /// Caps accepted token size to `max_size` bytes
    ///
    /// Larger tokens are rejected with [`MalformedToken::OverSizeThreshold`]
    /// before any decoding.
    #[must_use]
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.config = self.config.with_max_size(max_size);
        self
    }

    /// Finalizes the validator construction.
    #[must_use]
    pub fn build(self) -> Validator {
        Validator::from_config(self.key_set_provider, self.config)
    }
}

/// Verifies proxy-signed identity assertions and returns their claims
///
/// A validator owns its [`ValidationConfig`] and shares the key set cache
/// with every other validator built on the same [`KeySetProvider`].
///
/// ```rust,no_run
/// use std::{sync::Arc, time::Duration};
/// use iaptoken::{
///     transport::ReqwestClient,
///     validation::{KeySetProvider, Validator},
/// };
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ReqwestClient::new(Duration::from_secs(5))?;
/// let keys = Arc::new(KeySetProvider::new(client));
/// let validator = Validator::builder(keys, "/projects/42/apps/my-app")
///     .with_allowed_drift(Duration::from_secs(30))
///     .build();
///
/// # let assertion = "";
/// let claims = validator.validate(assertion)?;
/// println!("signed in as {:?}", claims.email());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Validator {
    key_set_provider: Arc<KeySetProvider>,
    config: ValidationConfig,
}

impl Validator {
    /// Returns a new [`ValidatorBuilder`] expecting `audience`.
    pub fn builder(
        key_set_provider: Arc<KeySetProvider>,
        audience: impl Into<String>,
    ) -> ValidatorBuilder {
        ValidatorBuilder::new(key_set_provider, audience)
    }

    #[must_use]
    pub const fn from_config(key_set_provider: Arc<KeySetProvider>, config: ValidationConfig) -> Self {
        Self {
            key_set_provider,
            config,
        }
    }

    /// Verifies `token` against the current system time.
    ///
    /// The token is decoded first, then the key set is obtained (fetching it
    /// on first use), then the signature is verified and finally the claims
    /// are checked. The first failure rejects the token.
    ///
    /// # Errors
    ///
    /// An [`InvalidTokenError`] for any failure; [`InvalidTokenError::kind`]
    /// tells which [`ValidationError`] caused it. No claims are returned on
    /// failure.
    pub fn validate(&self, token: &str) -> Result<Claims, InvalidTokenError> {
        self.validate_at(token, now())
    }

    /// Verifies `token` as of `now`, in seconds since the epoch.
    ///
    /// # Errors
    ///
    /// See [`validate`](Self::validate).
    pub fn validate_at(&self, token: &str, now: i64) -> Result<Claims, InvalidTokenError> {
        self.run(token, now).map_err(|cause| {
            debug!(error = %cause, key_set = cause.is_key_set_error(), "assertion rejected");
            InvalidTokenError::new(cause)
        })
    }

    fn run(&self, token: &str, now: i64) -> Result<Claims, ValidationError> {
        if let Some(max_size) = self.config.max_size()
            && token.len() > max_size
        {
            return Err(MalformedToken::OverSizeThreshold.into());
        }
        let token = SignedToken::parse(token)?;
        let keys = self.key_set_provider.key_set()?;
        let claims = verify(token, &keys)?;
        check(&claims, &self.config, now)?;
        Ok(claims)
    }

    /// Expects `audience` in subsequent validations
    pub fn set_audience(&mut self, audience: impl Into<String>) -> &mut Self {
        self.config.set_audience(audience.into());
        self
    }

    /// Tolerates `allowed_drift` in subsequent validations
    pub const fn set_allowed_drift(&mut self, allowed_drift: Duration) -> &mut Self {
        self.config.set_allowed_drift(allowed_drift);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &ValidationConfig {
        &self.config
    }

    #[must_use]
    pub const fn key_set_provider(&self) -> &Arc<KeySetProvider> {
        &self.key_set_provider
    }
}

fn now() -> i64 {
    // a clock before the epoch only makes every token look expired
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs().cast_signed())
}
