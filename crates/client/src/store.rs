//! Application state container.
//!
//! [`Storefront`] wires the session machine, the local cart, and the
//! debounced server sync together. It is constructed once and passed to
//! whatever drives the UI; there is no ambient global state.

use std::{
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use jiff::Timestamp;
use tokio::sync::broadcast;
use tracing::warn;
use uuid::Uuid;

use crate::{
    api::{
        Api, ApiUser, Credentials, OrderLinePush, OrderPayload, OrderRequest, ProductSummary,
        Registration, TokenCell,
    },
    cart::{CartLine, CartStore},
    errors::ClientError,
    storage::{Storage, TOKEN_KEY},
    sync::CartSyncer,
    tokens,
};

/// Authentication lifecycle state.
#[derive(Debug, Clone)]
pub enum SessionState {
    /// No credentials.
    Anonymous,
    /// A live access token and the user it belongs to.
    Authenticated { user: ApiUser },
    /// Credentials exist but the access token's embedded expiry has passed;
    /// the next authorized request will refresh silently.
    Expired,
}

/// Client-side state container: session, cart, and sync in one place.
pub struct Storefront {
    api: Arc<dyn Api>,
    storage: Arc<dyn Storage>,
    token: TokenCell,
    cart: Arc<CartStore>,
    syncer: CartSyncer,
    session: Mutex<SessionState>,
    merged_this_auth: AtomicBool,
    invalidated: broadcast::Sender<()>,
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("session", &self.session_state())
            .finish()
    }
}

impl Storefront {
    #[must_use]
    pub fn new(
        api: Arc<dyn Api>,
        storage: Arc<dyn Storage>,
        token: TokenCell,
        debounce: Duration,
    ) -> Self {
        let cart = Arc::new(CartStore::load(Arc::clone(&storage)));
        let (invalidated, _receiver) = broadcast::channel(8);

        Self {
            syncer: CartSyncer::new(Arc::clone(&api), Arc::clone(&cart), debounce),
            api,
            storage,
            token,
            cart,
            session: Mutex::new(SessionState::Anonymous),
            merged_this_auth: AtomicBool::new(false),
            invalidated,
        }
    }

    /// Subscribe to session-invalidated signals, broadcast whenever stored
    /// credentials are cleared because a refresh failed.
    #[must_use]
    pub fn subscribe_invalidations(&self) -> broadcast::Receiver<()> {
        self.invalidated.subscribe()
    }

    /// Current session state. An authenticated session whose access token
    /// has passed its embedded expiry reads as [`SessionState::Expired`].
    #[must_use]
    pub fn session_state(&self) -> SessionState {
        let state = self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        if matches!(state, SessionState::Authenticated { .. })
            && let Some(token) = self.token.get()
            && tokens::is_expired(&token, Timestamp::now())
        {
            return SessionState::Expired;
        }

        state
    }

    /// Current cart lines.
    #[must_use]
    pub fn cart_lines(&self) -> Vec<CartLine> {
        self.cart.snapshot()
    }

    /// Seed state from local storage on process start.
    ///
    /// A stored, unexpired token leads straight to a profile fetch; an
    /// expired one goes through a silent refresh first. Either way a failed
    /// restore clears credentials and leaves the session anonymous.
    ///
    /// # Errors
    ///
    /// Returns an error when local storage is unreadable.
    pub async fn bootstrap(&self) -> Result<(), ClientError> {
        let Some(stored) = self.storage.get(TOKEN_KEY)? else {
            return Ok(());
        };

        if tokens::is_expired(&stored, Timestamp::now()) {
            self.set_session(SessionState::Expired);

            match self.api.refresh().await {
                Ok(payload) => self.store_token(&payload.token)?,
                Err(error) => {
                    warn!("token refresh failed on startup: {error}");

                    return self.clear_credentials();
                }
            }
        } else {
            self.token.set(stored);
        }

        self.merged_this_auth.store(false, Ordering::SeqCst);

        match self.fetch_profile().await {
            Ok(()) => Ok(()),
            Err(ClientError::SessionExpired) => self.clear_credentials(),
            Err(error) => Err(error),
        }
    }

    /// Log in, then fetch the profile and merge the server cart (once per
    /// authentication event).
    ///
    /// # Errors
    ///
    /// Surfaces API failures; invalid credentials arrive as
    /// [`ClientError::Api`] with the server's message.
    pub async fn login(&self, credentials: &Credentials) -> Result<ApiUser, ClientError> {
        let payload = self.api.login(credentials).await?;

        self.store_token(&payload.token)?;
        self.merged_this_auth.store(false, Ordering::SeqCst);
        self.set_session(SessionState::Authenticated {
            user: payload.user.clone(),
        });

        self.fetch_profile().await?;

        Ok(payload.user)
    }

    /// Register a new account; otherwise identical to [`Storefront::login`].
    ///
    /// # Errors
    ///
    /// Surfaces API failures.
    pub async fn register(&self, registration: &Registration) -> Result<ApiUser, ClientError> {
        let payload = self.api.register(registration).await?;

        self.store_token(&payload.token)?;
        self.merged_this_auth.store(false, Ordering::SeqCst);
        self.set_session(SessionState::Authenticated {
            user: payload.user.clone(),
        });

        self.fetch_profile().await?;

        Ok(payload.user)
    }

    /// Log out: clears both cart copies immediately (bypassing the
    /// debounce), invalidates the refresh token, and drops credentials.
    ///
    /// # Errors
    ///
    /// Returns an error when local state cannot be cleared; server-side
    /// failures are logged and ignored so logout always converges locally.
    pub async fn logout(&self) -> Result<(), ClientError> {
        self.syncer.cancel();

        if self.is_authenticated() {
            if let Err(error) = self.api.sync_cart(&[]).await {
                warn!("failed to clear server cart on logout: {error}");
            }

            if let Err(error) = self.api.logout().await {
                warn!("server logout failed: {error}");
            }
        }

        self.cart.clear()?;
        self.token.clear();
        self.storage.remove(TOKEN_KEY)?;
        self.set_session(SessionState::Anonymous);

        Ok(())
    }

    /// Add one unit of a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error when the cart snapshot cannot be persisted.
    pub fn add_to_cart(&self, product: &ProductSummary) -> Result<(), ClientError> {
        self.cart.add(product)?;
        self.schedule_sync();

        Ok(())
    }

    /// Remove a product's line from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error when the cart snapshot cannot be persisted.
    pub fn remove_from_cart(&self, product_uuid: Uuid) -> Result<(), ClientError> {
        self.cart.remove(product_uuid)?;
        self.schedule_sync();

        Ok(())
    }

    /// Set a line's quantity (floored at 1).
    ///
    /// # Errors
    ///
    /// Returns an error when the cart snapshot cannot be persisted.
    pub fn set_cart_quantity(&self, product_uuid: Uuid, quantity: i64) -> Result<(), ClientError> {
        self.cart.set_quantity(product_uuid, quantity)?;
        self.schedule_sync();

        Ok(())
    }

    /// Empty both cart copies immediately, bypassing the debounce.
    ///
    /// # Errors
    ///
    /// Returns an error when either copy cannot be cleared.
    pub async fn clear_cart(&self) -> Result<(), ClientError> {
        self.syncer.cancel();
        self.cart.clear()?;

        if self.is_authenticated() {
            self.guard_session(self.api.sync_cart(&[]).await)?;
        }

        Ok(())
    }

    /// Place an order for the current cart with the given declared total.
    /// On success the cart is cleared on both sides.
    ///
    /// # Errors
    ///
    /// Surfaces API failures: insufficient stock and unknown products
    /// arrive as [`ClientError::Api`] with the server's message.
    pub async fn checkout(&self, total_amount: u64) -> Result<OrderPayload, ClientError> {
        let lines: Vec<OrderLinePush> = self
            .cart
            .snapshot()
            .into_iter()
            .map(|line| OrderLinePush {
                product_uuid: line.product.product_uuid,
                quantity: line.quantity,
            })
            .collect();

        let order = self.guard_session(
            self.api
                .place_order(&OrderRequest {
                    lines,
                    total_amount,
                })
                .await,
        )?;

        self.syncer.cancel();
        self.cart.clear()?;

        // Best-effort: the order is already placed, a failed server-cart
        // clear only leaves a stale server copy behind.
        if let Err(error) = self.api.sync_cart(&[]).await {
            warn!("failed to clear server cart after checkout: {error}");
        }

        Ok(order)
    }

    /// Re-fetch the profile, merging the server cart on the first fetch of
    /// the current authentication event.
    async fn fetch_profile(&self) -> Result<(), ClientError> {
        let profile = self.guard_session(self.api.profile().await)?;

        if !self.merged_this_auth.swap(true, Ordering::SeqCst) {
            self.cart.merge_server(&profile.cart)?;
        }

        self.set_session(SessionState::Authenticated { user: profile.user });

        Ok(())
    }

    fn schedule_sync(&self) {
        if self.is_authenticated() {
            self.syncer.schedule();
        }
    }

    fn is_authenticated(&self) -> bool {
        self.token.get().is_some()
    }

    fn store_token(&self, token: &str) -> Result<(), ClientError> {
        self.token.set(token.to_string());
        self.storage.set(TOKEN_KEY, token)
    }

    fn set_session(&self, state: SessionState) {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Clear credentials and broadcast the invalidation so dependent UI can
    /// log out.
    fn clear_credentials(&self) -> Result<(), ClientError> {
        self.token.clear();
        self.storage.remove(TOKEN_KEY)?;
        self.set_session(SessionState::Anonymous);

        let _listeners = self.invalidated.send(());

        Ok(())
    }

    /// Map a session expiry into cleared credentials before surfacing it.
    fn guard_session<T>(&self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        if matches!(result, Err(ClientError::SessionExpired)) {
            if let Err(error) = self.clear_credentials() {
                warn!("failed to clear credentials: {error}");
            }
        }

        result
    }
}
