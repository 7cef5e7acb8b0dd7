// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user page state.
//!
//! Each signed-in user has at most one mounted instance of a page. The
//! state lives in a [`PageSlot`] that also owns a cancellation token for
//! the requests it issues; remounting, signing out or going idle cancels
//! the token so late results cannot land in a page the user has left.

use crate::auth::Subscription;
use dashmap::DashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Idle time after which a page is dropped when no limit is configured.
pub const DEFAULT_IDLE_LIMIT: Duration = Duration::from_secs(30 * 60);

/// One mounted page.
pub struct PageSlot<S> {
    state: Mutex<S>,
    cancel: CancellationToken,
    last_used: Mutex<Instant>,
}

impl<S> PageSlot<S> {
    fn new(state: S) -> Self {
        Self {
            state: Mutex::new(state),
            cancel: CancellationToken::new(),
            last_used: Mutex::new(Instant::now()),
        }
    }

    /// Lock the page state. Never hold the guard across an `.await`.
    pub fn lock(&self) -> MutexGuard<'_, S> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Token tied to this page's lifetime.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_unmounted(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn touch(&self) {
        *self.last_used.lock().unwrap_or_else(|e| e.into_inner()) = Instant::now();
    }

    fn idle_for(&self) -> Duration {
        self.last_used
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .elapsed()
    }
}

/// Mounted pages keyed by user id.
pub struct PageStore<S> {
    slots: Arc<DashMap<String, Arc<PageSlot<S>>>>,
    idle_limit: Duration,
}

impl<S> Clone for PageStore<S> {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
            idle_limit: self.idle_limit,
        }
    }
}

impl<S> Default for PageStore<S> {
    fn default() -> Self {
        Self {
            slots: Arc::new(DashMap::new()),
            idle_limit: DEFAULT_IDLE_LIMIT,
        }
    }
}

impl<S: Send + 'static> PageStore<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose pages are dropped after `idle_limit` without use.
    pub fn with_idle_limit(idle_limit: Duration) -> Self {
        Self {
            slots: Arc::new(DashMap::new()),
            idle_limit,
        }
    }

    /// Mount a fresh page for `user_id`, unmounting any previous one.
    pub fn mount(&self, user_id: &str, state: S) -> Arc<PageSlot<S>> {
        let slot = Arc::new(PageSlot::new(state));
        if let Some(previous) = self.slots.insert(user_id.to_string(), Arc::clone(&slot)) {
            previous.cancel.cancel();
        }
        slot
    }

    /// Currently mounted page for `user_id`.
    ///
    /// A page idle past the limit is evicted instead of returned.
    pub fn get(&self, user_id: &str) -> Option<Arc<PageSlot<S>>> {
        let slot = self.slots.get(user_id).map(|slot| Arc::clone(slot.value()))?;
        if slot.idle_for() > self.idle_limit {
            self.evict(user_id);
            return None;
        }
        slot.touch();
        Some(slot)
    }

    /// Unmount the page for `user_id`, cancelling its requests.
    pub fn evict(&self, user_id: &str) {
        if let Some((_, slot)) = self.slots.remove(user_id) {
            slot.cancel.cancel();
            tracing::debug!(user_id, "Page state evicted");
        }
    }

    /// Drop every page idle past the limit. Returns how many were dropped.
    pub fn evict_idle(&self) -> usize {
        let mut evicted = 0;
        self.slots.retain(|user_id, slot| {
            if slot.idle_for() > self.idle_limit {
                slot.cancel.cancel();
                tracing::debug!(user_id = %user_id, "Idle page state evicted");
                evicted += 1;
                false
            } else {
                true
            }
        });
        evicted
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Evict a user's page whenever their session changes.
    ///
    /// Runs until the auth client is dropped.
    pub fn spawn_eviction(&self, mut subscription: Subscription) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            while let Some(event) = subscription.recv().await {
                store.evict(event.user_id());
            }
        })
    }

    /// Periodically drop idle pages, covering sessions that expire
    /// without a sign-out.
    pub fn spawn_idle_sweep(&self, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let evicted = store.evict_idle();
                if evicted > 0 {
                    tracing::info!(evicted, "Swept idle pages");
                }
            }
        })
    }
}
