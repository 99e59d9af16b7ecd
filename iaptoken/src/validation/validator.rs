use crate::{
    ISSUER,
    claims::{
        AUD,
        Claims,
        EXP,
        IAT,
        ISS,
    },
    error::ValidationError,
    validation::ValidationConfig,
};

/// The policy checks applied to verified claims
///
/// Each check is a plain function of the claims, the config snapshot and
/// the current time. A missing or mistyped claim fails with
/// [`ValidationError::MissingClaim`] before its value is looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClaimCheck {
    /// Fails if `now - allowed_drift > exp`
    Expiration,
    /// Fails if `iat - allowed_drift > now`
    IssuedAt,
    /// Fails unless `aud` is, or contains, the configured audience
    Audience,
    /// Fails unless `iss` is the proxy's issuer
    Issuer,
}

impl ClaimCheck {
    /// Every check, in evaluation order
    pub const ORDERED: [Self; 4] = [
        Self::Expiration,
        Self::IssuedAt,
        Self::Audience,
        Self::Issuer,
    ];

    /// Runs this check; `now` is in seconds since the epoch.
    ///
    /// # Errors
    ///
    /// [`ValidationError::MissingClaim`], [`ValidationError::Expired`],
    /// [`ValidationError::NotYetValid`], [`ValidationError::InvalidAudience`] or
    /// [`ValidationError::InvalidIssuer`], depending on the check.
    pub fn check(
        self,
        claims: &Claims,
        config: &ValidationConfig,
        now: i64,
    ) -> Result<(), ValidationError> {
        match self {
            Self::Expiration => {
                let exp = claims.exp().ok_or(ValidationError::MissingClaim(EXP))?;
                if now.saturating_sub(config.allowed_drift_secs()) > exp {
                    return Err(ValidationError::Expired);
                }
            }
            Self::IssuedAt => {
                let iat = claims.iat().ok_or(ValidationError::MissingClaim(IAT))?;
                if iat.saturating_sub(config.allowed_drift_secs()) > now {
                    return Err(ValidationError::NotYetValid);
                }
            }
            Self::Audience => {
                let aud = claims.aud().ok_or(ValidationError::MissingClaim(AUD))?;
                if !aud.contains(&config.audience()) {
                    return Err(ValidationError::InvalidAudience);
                }
            }
            Self::Issuer => {
                let iss = claims.iss().ok_or(ValidationError::MissingClaim(ISS))?;
                if iss != ISSUER {
                    return Err(ValidationError::InvalidIssuer);
                }
            }
        }
        Ok(())
    }
}

/// Runs every [`ClaimCheck`] in order, stopping at the first failure.
///
/// # Errors
///
/// The error of the first failing check.
pub fn check(claims: &Claims, config: &ValidationConfig, now: i64) -> Result<(), ValidationError> {
    ClaimCheck::ORDERED
        .into_iter()
        .try_for_each(|claim_check| claim_check.check(claims, config, now))
}
