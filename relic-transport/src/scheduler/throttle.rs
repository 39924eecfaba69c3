//! Trailing-edge throttle
//!
//! Coalesces many triggers into one delayed firing. The first trigger arms a
//! timer for the configured interval; triggers that arrive while it is armed
//! are absorbed. When the timer expires the armed state is cleared first and
//! the work runs afterwards, so a trigger that arrives while the work is still
//! running arms the next window. Nothing ever fires on the leading edge.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::trace;

struct Armed {
    id: u64,
    timer: JoinHandle<()>,
}

/// Trailing-edge throttle driven by a Tokio timer
pub struct Throttle {
    interval: Duration,
    armed: Arc<Mutex<Option<Armed>>>,
    next_id: AtomicU64,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            armed: Arc::new(Mutex::new(None)),
            next_id: AtomicU64::new(0),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a window is currently pending
    pub fn is_armed(&self) -> bool {
        self.armed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Arms a window that runs `fire` when it expires
    ///
    /// When a window is already pending, `fire` is dropped without running and
    /// the pending window is left untouched.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Returns
    /// `true` if this call armed a new window
    pub fn trigger<F>(&self, fire: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut armed = self.armed.lock().unwrap_or_else(PoisonError::into_inner);
        if armed.is_some() {
            return false;
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let slot = Arc::clone(&self.armed);
        let interval = self.interval;

        // The slot lock is held until the handle is stored, so the timer can
        // never observe the slot before its own entry is in it.
        let timer = tokio::spawn(async move {
            tokio::time::sleep(interval).await;

            {
                let mut armed = slot.lock().unwrap_or_else(PoisonError::into_inner);
                if armed.as_ref().map(|a| a.id) != Some(id) {
                    // Cancelled while waking up
                    return;
                }
                *armed = None;
            }

            trace!("Throttle window elapsed");
            fire.await;
        });

        *armed = Some(Armed { id, timer });
        true
    }

    /// Cancels the pending window, if any
    ///
    /// Work that already started running is never interrupted.
    ///
    /// # Returns
    /// `true` if a pending window was cancelled
    pub fn cancel(&self) -> bool {
        let pending = self
            .armed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match pending {
            Some(armed) => {
                armed.timer.abort();
                true
            }
            None => false,
        }
    }
}
