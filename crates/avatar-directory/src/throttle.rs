use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use avatar_core::models::normalize_principal_name;
use avatar_core::{Credential, Principal};

use crate::traits::{DirectoryError, DirectoryResult, IdentityVerifier};

/// Slots tracked before the first sweep of expired entries.
const PRUNE_FLOOR: usize = 1024;

struct Slot {
    failures: u32,
    in_flight: u32,
    reset_at: Instant,
}

impl Slot {
    fn is_idle(&self, now: Instant) -> bool {
        self.in_flight == 0 && (self.failures == 0 || now >= self.reset_at)
    }
}

struct Slots {
    entries: HashMap<String, Slot>,
    prune_at: usize,
}

#[derive(Clone, Copy)]
enum BindOutcome {
    Abandoned,
    Rejected,
    Accepted,
}

/// Counts rejected binds per principal inside a fixed window.
///
/// Binds still in flight count against the limit, so concurrent guesses for
/// one principal cannot overshoot it.
pub struct BindFailureLimiter {
    slots: Mutex<Slots>,
    max_failures: u32,
    window: Duration,
}

impl BindFailureLimiter {
    pub fn new(max_failures: u32, window_seconds: u64) -> Self {
        Self {
            slots: Mutex::new(Slots {
                entries: HashMap::new(),
                prune_at: PRUNE_FLOOR,
            }),
            max_failures,
            window: Duration::from_secs(window_seconds),
        }
    }

    // Counters stay consistent across a panic, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reserve a bind attempt for the principal.
    ///
    /// Returns `None` when recorded failures plus binds already in flight have
    /// reached the limit.
    pub fn try_acquire(&self, principal: &str) -> Option<BindPermit<'_>> {
        let mut slots = self.lock();
        let now = Instant::now();

        if !slots.entries.contains_key(principal) && slots.entries.len() >= slots.prune_at {
            slots.entries.retain(|_, slot| !slot.is_idle(now));
            slots.prune_at = (slots.entries.len() * 2).max(PRUNE_FLOOR);
        }

        let window = self.window;
        let slot = slots
            .entries
            .entry(principal.to_string())
            .or_insert_with(|| Slot {
                failures: 0,
                in_flight: 0,
                reset_at: now + window,
            });
        if now >= slot.reset_at {
            slot.failures = 0;
            slot.reset_at = now + window;
        }
        if slot.failures.saturating_add(slot.in_flight) >= self.max_failures {
            return None;
        }
        slot.in_flight += 1;

        Some(BindPermit {
            limiter: self,
            principal: principal.to_string(),
            outcome: BindOutcome::Abandoned,
        })
    }

    fn release(&self, principal: &str, outcome: BindOutcome) {
        let mut slots = self.lock();
        let Some(slot) = slots.entries.get_mut(principal) else {
            return;
        };
        slot.in_flight = slot.in_flight.saturating_sub(1);
        match outcome {
            BindOutcome::Rejected => {
                slot.failures += 1;
                if slot.failures >= self.max_failures {
                    tracing::warn!(principal = %principal, "Bind failure limit reached");
                }
            }
            BindOutcome::Accepted => slot.failures = 0,
            BindOutcome::Abandoned => {}
        }
        if slot.in_flight == 0 && slot.failures == 0 {
            slots.entries.remove(principal);
        }
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.lock().entries.len()
    }
}

/// One reserved bind attempt. Dropping it without an outcome (directory
/// outage, cancelled request) frees the slot without counting a failure.
pub struct BindPermit<'a> {
    limiter: &'a BindFailureLimiter,
    principal: String,
    outcome: BindOutcome,
}

impl BindPermit<'_> {
    pub fn reject(mut self) {
        self.outcome = BindOutcome::Rejected;
    }

    pub fn accept(mut self) {
        self.outcome = BindOutcome::Accepted;
    }
}

impl Drop for BindPermit<'_> {
    fn drop(&mut self) {
        self.limiter.release(&self.principal, self.outcome);
    }
}

/// Wraps a verifier so that a principal with too many recent rejections is
/// turned away without contacting the directory.
///
/// Only `Unauthorized` outcomes count. A directory outage does not lock anyone out.
pub struct ThrottledVerifier {
    inner: Arc<dyn IdentityVerifier>,
    limiter: BindFailureLimiter,
}

impl ThrottledVerifier {
    pub fn new(inner: Arc<dyn IdentityVerifier>, max_failures: u32, window_seconds: u64) -> Self {
        Self {
            inner,
            limiter: BindFailureLimiter::new(max_failures, window_seconds),
        }
    }
}

#[async_trait]
impl IdentityVerifier for ThrottledVerifier {
    async fn verify(
        &self,
        principal_name: &str,
        credential: &Credential,
    ) -> DirectoryResult<Principal> {
        let key = normalize_principal_name(principal_name);

        let Some(permit) = self.limiter.try_acquire(&key) else {
            tracing::warn!(principal = %key, "Bind refused: failure limit reached");
            return Err(DirectoryError::TooManyAttempts(key));
        };

        match self.inner.verify(principal_name, credential).await {
            Ok(principal) => {
                permit.accept();
                Ok(principal)
            }
            Err(DirectoryError::Unauthorized(msg)) => {
                permit.reject();
                Err(DirectoryError::Unauthorized(msg))
            }
            Err(other) => Err(other),
        }
    }
}
