//! Cache Entry Module
//!
//! A live, type-erased value held by the in-process store, with its
//! expiry deadline.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::value::CacheValue;

// == Cache Entry ==
/// A stored value together with its concrete type name and deadline.
#[derive(Clone)]
pub struct CacheEntry {
    /// The stored value
    pub value: Arc<dyn Any + Send + Sync>,
    /// Name of the value's concrete type
    pub type_name: &'static str,
    /// Deadline after which the entry is gone, None = no expiration
    pub expires_at: Option<Instant>,
}

impl CacheEntry {
    // == Constructor ==
    /// Wraps `value`, expiring after `ttl` when given.
    ///
    /// A TTL too large to represent as an `Instant` never expires.
    pub fn new<T: CacheValue>(value: T, ttl: Option<Duration>) -> Self {
        Self {
            value: Arc::new(value),
            type_name: type_name::<T>(),
            expires_at: deadline(ttl),
        }
    }

    // == Is Expired ==
    /// An entry is expired once the current time reaches its deadline.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(deadline) => now >= deadline,
            None => false,
        }
    }

    /// Replaces the deadline, keeping the value.
    pub fn set_ttl(&mut self, ttl: Option<Duration>) {
        self.expires_at = deadline(ttl);
    }

    // == Time To Live ==
    /// Remaining lifetime, `Some(ZERO)` once expired, `None` without expiry.
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }
}

impl fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("type_name", &self.type_name)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

fn deadline(ttl: Option<Duration>) -> Option<Instant> {
    ttl.and_then(|ttl| Instant::now().checked_add(ttl))
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_entry_keeps_type_name() {
        let entry = CacheEntry::new("v".to_string(), None);

        assert_eq!(entry.type_name, type_name::<String>());
        assert_eq!(entry.value.downcast_ref::<String>().unwrap(), "v");
    }

    #[test]
    fn test_entry_no_ttl_never_expires() {
        let entry = CacheEntry::new(1u8, None);

        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired());
        assert!(entry.ttl_remaining().is_none());
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new(1u8, Some(Duration::from_millis(50)));
        assert!(!entry.is_expired());

        sleep(Duration::from_millis(80));
        assert!(entry.is_expired());
        assert_eq!(entry.ttl_remaining(), Some(Duration::ZERO));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new(1u8, Some(Duration::from_secs(10)));
        let deadline = entry.expires_at.unwrap();

        assert!(entry.is_expired_at(deadline));
        assert!(!entry.is_expired_at(deadline - Duration::from_millis(1)));
    }

    #[test]
    fn test_huge_ttl_never_expires() {
        let entry = CacheEntry::new(1u8, Some(Duration::MAX));
        assert!(entry.expires_at.is_none());
    }

    #[test]
    fn test_set_ttl_replaces_deadline() {
        let mut entry = CacheEntry::new(1u8, None);
        entry.set_ttl(Some(Duration::from_secs(30)));

        let remaining = entry.ttl_remaining().unwrap();
        assert!(remaining <= Duration::from_secs(30));
        assert!(remaining > Duration::from_secs(29));
    }
}
