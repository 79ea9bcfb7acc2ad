//! Shared application state.

use std::num::NonZeroU32;
use std::sync::Arc;

use governor::{Quota, RateLimiter};

use notesbe_core::{AccessResolver, Error, Result, UserRepository};

use crate::config::RateLimitConfig;
use crate::token::TokenIssuer;

/// Global rate limiter type (direct quota, no per-client bucketing).
pub type GlobalRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Identity store.
    pub users: Arc<dyn UserRepository>,
    /// Every note read and write goes through here.
    pub access: AccessResolver,
    pub tokens: TokenIssuer,
    /// Global rate limiter (None if rate limiting is disabled).
    pub rate_limiter: Option<Arc<GlobalRateLimiter>>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        access: AccessResolver,
        tokens: TokenIssuer,
        rate_limit: &RateLimitConfig,
    ) -> Result<Self> {
        Ok(Self {
            users,
            access,
            tokens,
            rate_limiter: build_rate_limiter(rate_limit)?,
        })
    }
}

/// Build the global limiter, or `None` when limiting is disabled.
pub fn build_rate_limiter(config: &RateLimitConfig) -> Result<Option<Arc<GlobalRateLimiter>>> {
    if !config.enabled {
        return Ok(None);
    }
    let burst = NonZeroU32::new(config.requests)
        .ok_or_else(|| Error::Config("rate limit must be non-zero".to_string()))?;
    let quota = Quota::with_period(config.period)
        .ok_or_else(|| Error::Config("rate limit period must be non-zero".to_string()))?
        .allow_burst(burst);
    Ok(Some(Arc::new(RateLimiter::direct(quota))))
}
