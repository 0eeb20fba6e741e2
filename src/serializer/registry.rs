//! Type Registry Module
//!
//! Process-wide, append-only map from type names to reconstructors. The
//! binary codec writes only a type name next to the payload, so decoding
//! needs this map to rebuild the stored concrete value.

use std::any::{type_name, Any};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use tracing::debug;

use crate::value::CacheValue;

/// Rebuilds a boxed value of one concrete type from its bincode payload.
pub type Reconstruct = fn(&[u8]) -> bincode::Result<Box<dyn Any + Send + Sync>>;

static TYPES: Lazy<DashMap<&'static str, Reconstruct>> = Lazy::new(DashMap::new);

fn reconstruct<T: CacheValue>(payload: &[u8]) -> bincode::Result<Box<dyn Any + Send + Sync>> {
    let value: T = bincode::deserialize(payload)?;
    Ok(Box::new(value))
}

// == Register ==
/// Records `T` in the registry.
///
/// Returns true only for the call that inserted it. Concurrent and repeated
/// registrations of the same type are no-ops.
pub fn register<T: CacheValue>() -> bool {
    let name = type_name::<T>();
    if is_registered(name) {
        return false;
    }

    match TYPES.entry(name) {
        Entry::Occupied(_) => false,
        Entry::Vacant(slot) => {
            slot.insert(reconstruct::<T>);
            debug!(type_name = name, "registered cache value type");
            true
        }
    }
}

// == Lookup ==
/// Returns the reconstructor for a registered type name.
pub fn lookup(name: &str) -> Option<Reconstruct> {
    TYPES.get(name).map(|entry| *entry.value())
}

/// Returns true when `name` has been registered.
pub fn is_registered(name: &str) -> bool {
    TYPES.contains_key(name)
}
