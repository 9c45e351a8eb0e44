//! Time-boxed exclusive lock leases for single-flighting bulk operations.

use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use crate::error::LockError;

/// Opaque proof of lease ownership for one named resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockToken(String);

/// One live lease.
#[derive(Debug)]
struct Lease {
    token: String,
    expires_at: Instant,
}

/// Issues exclusive, renewable lock leases keyed by resource name.
///
/// A lease not renewed within its time-to-live expires and the resource
/// becomes available to the next acquirer; the stalled holder discovers
/// this as [`LockError::Lost`] on its next renewal. Acquisition is
/// fail-fast: contention is reported immediately, never waited out.
#[derive(Default)]
pub struct LockLeaseManager {
    leases: DashMap<String, Lease>,
}

impl LockLeaseManager {
    /// Creates a manager with no live leases.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires an exclusive lease on `resource` for `ttl`.
    ///
    /// # Errors
    ///
    /// [`LockError::Busy`] if another holder's lease is still live.
    pub fn acquire(&self, resource: &str, ttl: Duration) -> Result<LockToken, LockError> {
        let now = Instant::now();
        let token = Uuid::new_v4().simple().to_string();
        match self.leases.entry(resource.to_string()) {
            Entry::Occupied(mut entry) => {
                if entry.get().expires_at > now {
                    return Err(LockError::Busy {
                        resource: resource.to_string(),
                    });
                }
                debug!(resource, "reclaiming expired lease");
                entry.insert(Lease {
                    token: token.clone(),
                    expires_at: now + ttl,
                });
                Ok(LockToken(token))
            }
            Entry::Vacant(entry) => {
                entry.insert(Lease {
                    token: token.clone(),
                    expires_at: now + ttl,
                });
                Ok(LockToken(token))
            }
        }
    }

    /// Extends the caller's lease by `ttl` from now.
    ///
    /// # Errors
    ///
    /// [`LockError::Lost`] if the lease expired, was reclaimed by another
    /// holder, or never existed.
    pub fn renew(
        &self,
        token: &LockToken,
        resource: &str,
        ttl: Duration,
    ) -> Result<(), LockError> {
        let now = Instant::now();
        let lost = || LockError::Lost {
            resource: resource.to_string(),
        };
        let mut entry = self.leases.get_mut(resource).ok_or_else(lost)?;
        if entry.token != token.0 || entry.expires_at <= now {
            return Err(lost());
        }
        entry.expires_at = now + ttl;
        Ok(())
    }

    /// Releases the caller's lease. Best-effort: releasing a lease that
    /// expired or changed hands is a no-op.
    pub fn release(&self, token: &LockToken, resource: &str) {
        let removed = self
            .leases
            .remove_if(resource, |_, lease| lease.token == token.0);
        if removed.is_none() {
            debug!(resource, "release of a lease no longer held");
        }
    }
}
