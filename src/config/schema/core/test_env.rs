use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};

pub(super) static ENV_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// Every variable `apply_env_overrides` reads.
pub(super) const OVERRIDE_VARS: [&str; 11] = [
    "NUTRISIGHT_API_KEY",
    "GEMINI_API_KEY",
    "GOOGLE_API_KEY",
    "NUTRISIGHT_MODEL",
    "LLM_MODEL",
    "NUTRISIGHT_TEMPERATURE",
    "LLM_TEMPERATURE",
    "NUTRISIGHT_GATEWAY_HOST",
    "HOST",
    "NUTRISIGHT_GATEWAY_PORT",
    "PORT",
];

/// Holds `ENV_LOCK`, starts from a clean slate of override variables and
/// restores the previous process environment on drop.
pub(super) struct ScopedEnv {
    saved: Vec<(&'static str, Option<String>)>,
    _lock: MutexGuard<'static, ()>,
}

impl ScopedEnv {
    pub(super) fn clean() -> Self {
        let lock = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let saved = OVERRIDE_VARS
            .iter()
            .map(|key| (*key, std::env::var(key).ok()))
            .collect();
        for key in OVERRIDE_VARS {
            // SAFETY: ENV_LOCK serializes every test touching these variables.
            unsafe {
                std::env::remove_var(key);
            }
        }
        Self { saved, _lock: lock }
    }

    pub(super) fn set(&self, key: &'static str, value: &str) {
        debug_assert!(OVERRIDE_VARS.contains(&key));
        // SAFETY: ENV_LOCK is held for the lifetime of `self`.
        unsafe {
            std::env::set_var(key, value);
        }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (key, previous) in &self.saved {
            // SAFETY: restoration happens before the lock guard is released.
            unsafe {
                match previous {
                    Some(value) => std::env::set_var(key, value),
                    None => std::env::remove_var(key),
                }
            }
        }
    }
}
