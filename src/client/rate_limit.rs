//! Reactive per-category rate limiting
//!
//! Limiters stay dormant until the API answers 429 for a category; from
//! then on every call in that category waits for quota.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicBool, Ordering};

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use log::debug;

use super::request::EndpointCategory;

impl EndpointCategory {
    /// Requests per minute allowed once throttling kicks in.
    ///
    /// The REST quota is 3600 calls per hour per key; uploads are far
    /// heavier and get a tighter budget.
    pub fn requests_per_minute(&self) -> u32 {
        match self {
            EndpointCategory::Rest => 60,
            EndpointCategory::Upload => 10,
            EndpointCategory::Replace => 10,
        }
    }
}

/// Throttle for a single endpoint category
pub struct CategoryRateLimiter {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    active: AtomicBool,
    category: EndpointCategory,
}

impl CategoryRateLimiter {
    pub fn new(category: EndpointCategory) -> Self {
        let per_min =
            NonZeroU32::new(category.requests_per_minute()).unwrap_or(NonZeroU32::MIN);

        Self {
            limiter: RateLimiter::direct(Quota::per_minute(per_min)),
            active: AtomicBool::new(false),
            category,
        }
    }

    /// Switch throttling on. Idempotent.
    pub fn activate(&self) {
        let was_active = self.active.swap(true, Ordering::SeqCst);
        if !was_active {
            debug!("Rate limiting activated for {:?}", self.category);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Wait for permission if throttling is active
    pub async fn wait_if_active(&self) {
        if self.is_active() {
            debug!("Waiting for rate limiter {:?}", self.category);
            self.limiter.until_ready().await;
        }
    }
}

/// Limiters for every endpoint category
pub struct RateLimiterSet {
    limiters: HashMap<EndpointCategory, CategoryRateLimiter>,
}

impl Default for RateLimiterSet {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiterSet {
    pub fn new() -> Self {
        let limiters = EndpointCategory::ALL
            .into_iter()
            .map(|category| (category, CategoryRateLimiter::new(category)))
            .collect();

        Self { limiters }
    }

    pub async fn wait_for(&self, category: EndpointCategory) {
        if let Some(limiter) = self.limiters.get(&category) {
            limiter.wait_if_active().await;
        }
    }

    /// Called when the API answers 429 for `category`
    pub fn activate(&self, category: EndpointCategory) {
        if let Some(limiter) = self.limiters.get(&category) {
            limiter.activate();
        }
    }

    pub fn is_active(&self, category: EndpointCategory) -> bool {
        self.limiters
            .get(&category)
            .is_some_and(CategoryRateLimiter::is_active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quotas() {
        assert_eq!(EndpointCategory::Rest.requests_per_minute(), 60);
        assert_eq!(EndpointCategory::Upload.requests_per_minute(), 10);
        assert_eq!(EndpointCategory::Replace.requests_per_minute(), 10);
    }

    #[test]
    fn test_limiter_activation() {
        let limiter = CategoryRateLimiter::new(EndpointCategory::Upload);
        assert!(!limiter.is_active());

        limiter.activate();
        assert!(limiter.is_active());

        limiter.activate();
        assert!(limiter.is_active());
    }

    #[test]
    fn test_set_activates_single_category() {
        let set = RateLimiterSet::new();
        set.activate(EndpointCategory::Rest);

        assert!(set.is_active(EndpointCategory::Rest));
        assert!(!set.is_active(EndpointCategory::Upload));
        assert!(!set.is_active(EndpointCategory::Replace));
    }

    #[tokio::test]
    async fn test_dormant_limiter_does_not_wait() {
        let set = RateLimiterSet::new();
        for _ in 0..100 {
            set.wait_for(EndpointCategory::Upload).await;
        }
    }
}
