//! Top-score storage
//!
//! The core only ever reads and raises a single integer. Where it lives is
//! the host's business: LocalStorage in the browser, memory everywhere else
//! unless the host supplies its own [`TopScoreStore`].

use std::fmt::Debug;

/// Persistence collaborator for the top score
pub trait TopScoreStore: Debug {
    fn top_score(&self) -> u32;
    fn set_top_score(&mut self, score: u32);
}

/// Process-lifetime store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    top_score: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_top_score(top_score: u32) -> Self {
        Self { top_score }
    }
}

impl TopScoreStore for MemoryStore {
    fn top_score(&self) -> u32 {
        self.top_score
    }

    fn set_top_score(&mut self, score: u32) {
        self.top_score = score;
    }
}

/// Browser LocalStorage under a fixed key
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct LocalStorageStore {
    key: &'static str,
    cached: u32,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    pub const DEFAULT_KEY: &'static str = "merge_runner_top_score";

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }

    /// Load the stored score (0 when absent or unreadable)
    pub fn load(key: &'static str) -> Self {
        let cached = Self::storage()
            .and_then(|s| s.get_item(key).ok().flatten())
            .and_then(|raw| raw.parse::<u32>().ok())
            .unwrap_or(0);
        log::info!("Loaded top score {cached}");
        Self { key, cached }
    }
}

#[cfg(target_arch = "wasm32")]
impl TopScoreStore for LocalStorageStore {
    fn top_score(&self) -> u32 {
        self.cached
    }

    fn set_top_score(&mut self, score: u32) {
        self.cached = score;
        if let Some(storage) = Self::storage() {
            if storage.set_item(self.key, &score.to_string()).is_err() {
                log::warn!("Failed to persist top score");
            }
        }
    }
}
