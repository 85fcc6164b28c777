use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

/// Cache key holding the server public key as a PEM string.
pub const PUBLIC_KEY_KEY: &str = "publicKey";
/// Cache key holding the bearer token returned by the login endpoint.
pub const AUTH_TOKEN_KEY: &str = "authToken";

/// A small string key/value store shared by the session manager and the
/// portfolio store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
}

/// In-memory store whose contents live as long as the value itself.
/// This is the session-scoped cache: drop it and everything is gone.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with the given entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get(AUTH_TOKEN_KEY), None);

        store.set(AUTH_TOKEN_KEY, "abc".to_string());
        assert_eq!(store.get(AUTH_TOKEN_KEY).as_deref(), Some("abc"));

        store.set(AUTH_TOKEN_KEY, "def".to_string());
        assert_eq!(store.get(AUTH_TOKEN_KEY).as_deref(), Some("def"));

        store.remove(AUTH_TOKEN_KEY);
        assert_eq!(store.get(AUTH_TOKEN_KEY), None);
    }

    #[test]
    fn with_entries_prepopulates() {
        let store = MemoryStore::with_entries([(PUBLIC_KEY_KEY, "pem"), (AUTH_TOKEN_KEY, "xyz")]);
        assert_eq!(store.get(PUBLIC_KEY_KEY).as_deref(), Some("pem"));
        assert_eq!(store.get(AUTH_TOKEN_KEY).as_deref(), Some("xyz"));
    }
}
