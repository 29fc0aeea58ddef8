//! `localStorage`-backed key-value store (wasm32 only).

#[cfg(target_arch = "wasm32")]
use crate::store::KeyValueStore;

/// Key-value store over the browser's `localStorage`. Storage being
/// unavailable (private mode, quota) degrades to a no-op store; the scroll
/// hint then simply re-seeds as never-seen each session.
#[cfg(target_arch = "wasm32")]
pub struct LocalStore {
    storage: Option<web_sys::Storage>,
}

#[cfg(target_arch = "wasm32")]
impl LocalStore {
    pub fn new() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        Self { storage }
    }
}

#[cfg(target_arch = "wasm32")]
impl Default for LocalStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Some(storage) = self.storage.as_ref() {
            let _ = storage.set_item(key, value);
        }
    }
}
