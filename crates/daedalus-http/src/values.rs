//! Per-request context values.
//!
//! Middleware and other trusted server-side code store values here under a
//! string key; `context`-tagged record fields read them back.
//!
//! ```rust
//! use daedalus_http::ContextValues;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Caller {
//!     subject: String,
//! }
//!
//! let mut values = ContextValues::new();
//! values.insert("caller", Caller { subject: "svc-a".into() });
//!
//! assert_eq!(values.get::<Caller>("caller").unwrap().subject, "svc-a");
//! assert!(values.get::<String>("caller").is_none());
//! ```

use daedalus_core::ContextValue;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// String-keyed map of dynamically typed values.
#[derive(Clone, Default)]
pub struct ContextValues {
    values: HashMap<String, ContextValue>,
}

impl ContextValues {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn insert<T: Send + Sync + 'static>(&mut self, key: impl Into<String>, value: T) {
        self.values.insert(key.into(), Arc::new(value));
    }

    /// Stores an already shared value under `key`.
    pub fn insert_shared(&mut self, key: impl Into<String>, value: ContextValue) {
        self.values.insert(key.into(), value);
    }

    /// Returns the value under `key` if it has type `T`.
    #[must_use]
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.values.get(key).and_then(|value| value.downcast_ref::<T>())
    }

    /// Returns the shared value under `key`, whatever its type.
    #[must_use]
    pub fn get_shared(&self, key: &str) -> Option<ContextValue> {
        self.values.get(key).cloned()
    }

    /// Removes the value under `key`.
    pub fn remove(&mut self, key: &str) -> Option<ContextValue> {
        self.values.remove(key)
    }

    /// Returns `true` if a value is stored under `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns the number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no values are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for ContextValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.values.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("ContextValues").field("keys", &keys).finish()
    }
}
