// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Self-clearing message slot.
//!
//! A value set here disappears after [`FLASH_TTL`] unless it is replaced
//! first; each new value restarts the window.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;

/// How long a message stays visible.
pub const FLASH_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Default)]
struct Slot {
    value: Option<String>,
    generation: u64,
}

/// Ephemeral message backed by a cancellable timer.
///
/// `set` must be called from within a tokio runtime.
#[derive(Debug, Default)]
pub struct Flash {
    slot: Arc<Mutex<Slot>>,
    timer: Option<JoinHandle<()>>,
}

fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Flash {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `value` and schedule it to clear after [`FLASH_TTL`].
    pub fn set(&mut self, value: impl Into<String>) {
        let generation = {
            let mut slot = lock(&self.slot);
            slot.generation += 1;
            slot.value = Some(value.into());
            slot.generation
        };

        if let Some(timer) = self.timer.take() {
            timer.abort();
        }

        let deadline = tokio::time::Instant::now() + FLASH_TTL;
        let slot = Arc::clone(&self.slot);
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let mut slot = lock(&slot);
            // A newer value owns the slot now
            if slot.generation == generation {
                slot.value = None;
            }
        }));
    }

    /// Clear immediately. Clearing an empty slot is a no-op.
    pub fn clear(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        let mut slot = lock(&self.slot);
        slot.generation += 1;
        slot.value = None;
    }

    pub fn get(&self) -> Option<String> {
        lock(&self.slot).value.clone()
    }

    pub fn is_set(&self) -> bool {
        lock(&self.slot).value.is_some()
    }
}

impl Drop for Flash {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
