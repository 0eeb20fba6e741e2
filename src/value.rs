//! Cacheable Value Module
//!
//! Defines which types can be cached and the exact-type assignment step
//! every backend uses to write a stored value into a caller's destination.

use std::any::{type_name, Any};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CacheError, Result};

// == Cache Value ==
/// A value that can be stored in any backend.
///
/// `Option<T>` is the nil-shaped family: `None` is cached as a present nil
/// value, which is distinct from an absent key. Other types are not nilable.
///
/// Plain structs opt in with an empty impl:
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use typed_cache::CacheValue;
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// struct User {
///     id: u64,
///     name: String,
/// }
///
/// impl CacheValue for User {}
/// ```
pub trait CacheValue: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Returns true when this value is nil-shaped.
    fn is_nil(&self) -> bool {
        false
    }

    /// The nil value of this type, or `None` when the type cannot be nil.
    fn nil() -> Option<Self> {
        None
    }
}

impl<T: CacheValue> CacheValue for Option<T> {
    fn is_nil(&self) -> bool {
        self.is_none()
    }

    fn nil() -> Option<Self> {
        Some(None)
    }
}

macro_rules! impl_cache_value {
    ($($ty:ty),* $(,)?) => {
        $(impl CacheValue for $ty {})*
    };
}

impl_cache_value!(
    (),
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    String,
    DateTime<Utc>,
);

impl<T: CacheValue> CacheValue for Vec<T> {}

impl<T> CacheValue for HashSet<T> where T: CacheValue + Eq + Hash {}

impl<K, V> CacheValue for HashMap<K, V>
where
    K: Serialize + DeserializeOwned + Eq + Hash + Clone + Send + Sync + 'static,
    V: CacheValue,
{
}

impl<K, V> CacheValue for BTreeMap<K, V>
where
    K: Serialize + DeserializeOwned + Ord + Clone + Send + Sync + 'static,
    V: CacheValue,
{
}

impl<A: CacheValue, B: CacheValue> CacheValue for (A, B) {}

impl<A: CacheValue, B: CacheValue, C: CacheValue> CacheValue for (A, B, C) {}

// == Typed Assign ==
/// Copies `value` into `dest` when its concrete type is exactly `T`.
///
/// `got` names the stored type for the error message.
pub fn assign<T: CacheValue>(
    dest: &mut T,
    value: &(dyn Any + Send + Sync),
    got: &str,
) -> Result<()> {
    match value.downcast_ref::<T>() {
        Some(v) => {
            *dest = v.clone();
            Ok(())
        }
        None => Err(CacheError::type_mismatch(type_name::<T>(), got)),
    }
}

/// Zeroes `dest` for a nil-shaped stored value.
///
/// Fails with `NilAssignment` when `T` cannot hold nil.
pub fn assign_nil<T: CacheValue>(dest: &mut T) -> Result<()> {
    match T::nil() {
        Some(nil) => {
            *dest = nil;
            Ok(())
        }
        None => Err(CacheError::NilAssignment(type_name::<T>().to_string())),
    }
}
