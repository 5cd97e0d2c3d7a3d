use std::collections::HashMap;
use std::sync::Mutex;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use time::{OffsetDateTime, Duration};
use tracing::{debug, warn, error};

use crate::error::ApiError;
use crate::routes::AppState;
use crate::utils::client_addr;

const TOO_MANY_REQUESTS: &str = "Too many requests from this IP, please try again later.";

#[derive(Debug)]
struct RateLimit {
    attempts: u32,
    first_attempt: OffsetDateTime,
    last_attempt: OffsetDateTime,
}

/// Fixed-window request counter keyed by client.
#[derive(Debug)]
pub struct RateLimiter {
    limits: Mutex<HashMap<String, RateLimit>>,
    max_attempts: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_attempts: u32, window_minutes: i64) -> Self {
        Self {
            limits: Mutex::new(HashMap::new()),
            max_attempts,
            window: Duration::minutes(window_minutes),
        }
    }

    /// Counts one request for `key` and returns how many are left in the window.
    pub fn check_rate_limit(&self, key: &str) -> Result<u32, ApiError> {
        self.check_at(key, OffsetDateTime::now_utc())
    }

    fn check_at(&self, key: &str, now: OffsetDateTime) -> Result<u32, ApiError> {
        let mut limits = self.limits.lock().map_err(|e| {
            error!("Failed to acquire rate limit lock: {}", e);
            ApiError::Internal("rate limiter unavailable".into())
        })?;

        match limits.get_mut(key) {
            Some(limit) if now - limit.first_attempt > self.window => {
                *limit = RateLimit { attempts: 1, first_attempt: now, last_attempt: now };
                Ok(self.max_attempts.saturating_sub(1))
            }
            Some(limit) if limit.attempts >= self.max_attempts => {
                warn!("Rate limit triggered for key {} ({} attempts)", key, limit.attempts);
                Err(ApiError::RateLimited(TOO_MANY_REQUESTS.into()))
            }
            Some(limit) => {
                limit.attempts += 1;
                limit.last_attempt = now;
                Ok(self.max_attempts.saturating_sub(limit.attempts))
            }
            None => {
                limits.insert(key.to_string(), RateLimit { attempts: 1, first_attempt: now, last_attempt: now });
                Ok(self.max_attempts.saturating_sub(1))
            }
        }
    }

    /// Drops counters idle for longer than two windows. Returns how many went.
    pub fn prune(&self) -> usize {
        self.prune_at(OffsetDateTime::now_utc())
    }

    fn prune_at(&self, now: OffsetDateTime) -> usize {
        let Ok(mut limits) = self.limits.lock() else {
            error!("Failed to acquire rate limit lock for pruning");
            return 0;
        };
        let before = limits.len();
        limits.retain(|_, limit| now - limit.last_attempt <= self.window * 2);
        before - limits.len()
    }
}

/// Request guard that counts the request against the caller's limit.
pub struct RateLimited;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for RateLimited {
    type Error = ApiError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(state) = req.rocket().state::<AppState>() else {
            return Outcome::Error((Status::InternalServerError, ApiError::Internal("state not managed".into())));
        };

        let key = client_addr(req);
        match state.limiter.check_rate_limit(&key) {
            Ok(remaining) => {
                debug!("{} requests left for {}", remaining, key);
                Outcome::Success(RateLimited)
            }
            Err(e) => Outcome::Error((e.status(), e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_after_max_attempts() {
        let limiter = RateLimiter::new(3, 15);
        let now = OffsetDateTime::now_utc();

        assert_eq!(limiter.check_at("1.2.3.4", now).unwrap(), 2);
        assert_eq!(limiter.check_at("1.2.3.4", now).unwrap(), 1);
        assert_eq!(limiter.check_at("1.2.3.4", now).unwrap(), 0);
        assert!(matches!(limiter.check_at("1.2.3.4", now), Err(ApiError::RateLimited(_))));
        assert!(limiter.check_at("5.6.7.8", now).is_ok());
    }

    #[test]
    fn test_window_resets() {
        let limiter = RateLimiter::new(1, 15);
        let now = OffsetDateTime::now_utc();

        assert!(limiter.check_at("k", now).is_ok());
        assert!(limiter.check_at("k", now + Duration::minutes(5)).is_err());
        assert_eq!(limiter.check_at("k", now + Duration::minutes(16)).unwrap(), 0);
    }

    #[test]
    fn test_remaining_attempts() {
        let limiter = RateLimiter::new(5, 15);
        assert_eq!(limiter.check_rate_limit("k").unwrap(), 4);
        assert_eq!(limiter.check_rate_limit("k").unwrap(), 3);
        assert_eq!(limiter.check_rate_limit("other").unwrap(), 4);
    }

    #[test]
    fn test_prune_drops_stale_counters() {
        let limiter = RateLimiter::new(5, 15);
        let now = OffsetDateTime::now_utc();
        limiter.check_at("old", now - Duration::hours(2)).unwrap();
        limiter.check_at("fresh", now).unwrap();

        assert_eq!(limiter.prune_at(now), 1);
        assert_eq!(limiter.prune_at(now), 0);
        assert_eq!(limiter.check_at("fresh", now).unwrap(), 3);
        assert_eq!(limiter.check_at("old", now).unwrap(), 4);
    }
}
