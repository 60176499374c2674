//! Persistence of volume and playback position.
//!
//! The player only talks to a [`KeyValueStore`]; in the browser that is
//! `localStorage`, in tests and on native targets an in-memory map.

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[cfg(target_arch = "wasm32")]
use gloo_storage::{LocalStorage, Storage};

pub const VOLUME_KEY: &str = "wpMusicPlayerVolume";
pub const STATE_KEY: &str = "wpMusicPlayerState";

/// Minimal string key/value capability.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Playback record written when a player is destroyed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    pub src: String,
    #[serde(default)]
    pub current_time: f64,
    #[serde(default)]
    pub is_playing: bool,
}

/// Typed access to the two persisted records on top of any store.
#[derive(Clone)]
pub struct PlayerStore {
    backend: Rc<dyn KeyValueStore>,
}

impl PartialEq for PlayerStore {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.backend, &other.backend)
    }
}

impl PlayerStore {
    pub fn new(backend: Rc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Store for the current platform: `localStorage` in the browser,
    /// a process-local map elsewhere.
    pub fn platform() -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            Self::new(Rc::new(LocalStore))
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            Self::new(Rc::new(MemoryStore::default()))
        }
    }

    pub fn load_volume(&self) -> Result<Option<f64>, StoreError> {
        let Some(raw) = self.backend.get(VOLUME_KEY)? else {
            return Ok(None);
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        match trimmed.parse::<f64>() {
            Ok(volume) if volume.is_finite() => Ok(Some(volume.clamp(0.0, 1.0))),
            _ => Err(StoreError::InvalidVolume(raw)),
        }
    }

    pub fn save_volume(&self, volume: f64) -> Result<(), StoreError> {
        self.backend.set(VOLUME_KEY, &volume.clamp(0.0, 1.0).to_string())
    }

    pub fn load_snapshot(&self) -> Result<Option<PlaybackSnapshot>, StoreError> {
        let Some(raw) = self.backend.get(STATE_KEY)? else {
            return Ok(None);
        };
        // A literal `null` is what an unset record serializes to.
        serde_json::from_str::<Option<PlaybackSnapshot>>(&raw).map_err(|source| StoreError::Json {
            key: STATE_KEY.to_string(),
            source,
        })
    }

    pub fn save_snapshot(&self, snapshot: &PlaybackSnapshot) -> Result<(), StoreError> {
        let json = serde_json::to_string(snapshot).map_err(|source| StoreError::Json {
            key: STATE_KEY.to_string(),
            source,
        })?;
        self.backend.set(STATE_KEY, &json)
    }

    pub fn clear_snapshot(&self) -> Result<(), StoreError> {
        self.backend.remove(STATE_KEY)
    }
}

/// Browser `localStorage`.
#[cfg(target_arch = "wasm32")]
pub struct LocalStore;

#[cfg(target_arch = "wasm32")]
impl LocalStore {
    /// `LocalStorage::raw` throws when storage is disabled, so probe first.
    fn raw(&self) -> Result<web_sys::Storage, StoreError> {
        let available = web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .is_some();
        if available {
            Ok(LocalStorage::raw())
        } else {
            Err(StoreError::Unavailable)
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn js_reason(err: wasm_bindgen::JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.raw()?.get_item(key).map_err(|e| StoreError::Backend {
            key: key.to_string(),
            reason: js_reason(e),
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.raw()?.set_item(key, value).map_err(|e| StoreError::Backend {
            key: key.to_string(),
            reason: js_reason(e),
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.raw()?;
        LocalStorage::delete(key);
        Ok(())
    }
}

/// In-memory store used off the browser and in tests.
#[derive(Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}
