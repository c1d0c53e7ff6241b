//! Thread-local context map
//!
//! A string-keyed diagnostic context scoped to the current thread. Events
//! take a point-in-time copy at creation, so later mutation of the map never
//! races with rendering on the consumer thread.

use std::cell::RefCell;
use std::collections::HashMap;

thread_local! {
    static CONTEXT: RefCell<HashMap<String, String>> = RefCell::new(HashMap::new());
}

/// Operations on the calling thread's context map
pub struct ThreadContext;

impl ThreadContext {
    /// Associate a value with a key on this thread
    pub fn put(key: impl Into<String>, value: impl Into<String>) {
        CONTEXT.with(|map| {
            map.borrow_mut().insert(key.into(), value.into());
        });
    }

    /// Look up a key on this thread
    pub fn get(key: &str) -> Option<String> {
        CONTEXT.with(|map| map.borrow().get(key).cloned())
    }

    /// Remove a key from this thread's map
    pub fn remove(key: &str) {
        CONTEXT.with(|map| {
            map.borrow_mut().remove(key);
        });
    }

    /// Clear this thread's map
    pub fn clear() {
        CONTEXT.with(|map| map.borrow_mut().clear());
    }

    /// Copy of this thread's map, `None` when empty
    pub fn snapshot() -> Option<HashMap<String, String>> {
        CONTEXT.with(|map| {
            let map = map.borrow();
            if map.is_empty() {
                None
            } else {
                Some(map.clone())
            }
        })
    }

    /// Set a key for the lifetime of the returned guard
    ///
    /// # Example
    ///
    /// ```
    /// use logweave::ThreadContext;
    ///
    /// {
    ///     let _guard = ThreadContext::scoped("request_id", "abc-123");
    ///     assert_eq!(ThreadContext::get("request_id").as_deref(), Some("abc-123"));
    /// }
    /// assert!(ThreadContext::get("request_id").is_none());
    /// ```
    #[must_use = "the key is removed when the guard is dropped"]
    pub fn scoped(key: impl Into<String>, value: impl Into<String>) -> ContextGuard {
        let key = key.into();
        Self::put(key.clone(), value);
        ContextGuard { key }
    }
}

/// RAII guard that removes its key from the thread context on drop
pub struct ContextGuard {
    key: String,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        ThreadContext::remove(&self.key);
    }
}
