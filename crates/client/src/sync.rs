//! Debounced server cart sync.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use tokio::task::JoinHandle;
use tracing::warn;

use crate::{api::Api, cart::CartStore};

/// Quiet period before a cart mutation is pushed to the server.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(1);

/// Trailing-edge debouncer for wholesale cart pushes.
///
/// Each call to [`CartSyncer::schedule`] cancels any pending push and arms a
/// new one, so a burst of mutations results in a single push carrying the
/// final state.
pub struct CartSyncer {
    api: Arc<dyn Api>,
    cart: Arc<CartStore>,
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for CartSyncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartSyncer")
            .field("delay", &self.delay)
            .finish()
    }
}

impl CartSyncer {
    #[must_use]
    pub fn new(api: Arc<dyn Api>, cart: Arc<CartStore>, delay: Duration) -> Self {
        Self {
            api,
            cart,
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Arm (or re-arm) the debounced push.
    ///
    /// The cart state is read when the timer fires, not when it is armed,
    /// so the push always carries the latest local state.
    pub fn schedule(&self) {
        let api = Arc::clone(&self.api);
        let cart = Arc::clone(&self.cart);
        let delay = self.delay;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let pushed = cart.pushes();

            match api.sync_cart(&pushed).await {
                Ok(()) => cart.confirm_pushed(&pushed),
                Err(error) => {
                    warn!("cart sync failed: {error}");

                    cart.mark_push_failed();
                }
            }
        });

        let previous = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);

        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Drop any pending push. Logout and explicit clears bypass the
    /// debounce entirely.
    pub fn cancel(&self) {
        let previous = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(previous) = previous {
            previous.abort();
        }
    }
}

impl Drop for CartSyncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
