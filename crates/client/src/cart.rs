//! Local cart state and the login merge.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{CartPush, ProductSummary, ServerCartLine},
    errors::ClientError,
    storage::{CART_KEY, Storage},
};

/// Per-line server sync state.
///
/// The quantity a line shows is always the local truth; this records
/// whether the server has seen it yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncStatus {
    /// The server cart reflects this line.
    Synced,
    /// A mutation is waiting for the debounced push.
    PendingPush,
    /// The last push attempt failed; the line is still local-only.
    PushFailed,
}

/// One local cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(flatten)]
    pub product: ProductSummary,
    pub quantity: i64,
    pub sync: SyncStatus,
}

/// Merge the server cart into the local one.
///
/// Keyed by product id: server entries seed the result and win quantity
/// collisions; local-only lines are appended in their local order. The
/// result is deterministic and repeating the merge with the same inputs is
/// a no-op.
#[must_use]
pub fn merge_carts(server: &[ServerCartLine], local: &[CartLine]) -> Vec<CartLine> {
    let mut merged: Vec<CartLine> = server
        .iter()
        .map(|line| CartLine {
            product: line.product.clone(),
            quantity: line.quantity,
            sync: SyncStatus::Synced,
        })
        .collect();

    for line in local {
        let known = merged
            .iter()
            .any(|m| m.product.product_uuid == line.product.product_uuid);

        if !known {
            merged.push(line.clone());
        }
    }

    merged
}

/// The local cart: survives restarts via [`Storage`] under [`CART_KEY`].
pub struct CartStore {
    storage: Arc<dyn Storage>,
    lines: Mutex<Vec<CartLine>>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("lines", &self.snapshot().len())
            .finish()
    }
}

impl CartStore {
    /// Load the persisted cart, starting empty when none is stored or the
    /// snapshot is unreadable.
    #[must_use]
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let lines = storage
            .get(CART_KEY)
            .ok()
            .flatten()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default();

        Self {
            storage,
            lines: Mutex::new(lines),
        }
    }

    /// Current lines, cloned.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CartLine> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The wholesale push payload for the current cart.
    #[must_use]
    pub fn pushes(&self) -> Vec<CartPush> {
        self.snapshot()
            .into_iter()
            .map(|line| CartPush {
                product_uuid: line.product.product_uuid,
                quantity: line.quantity,
            })
            .collect()
    }

    /// Add one unit of a product: increments an existing line, else inserts
    /// at quantity 1. The advertised stock caps the result, but only as a
    /// courtesy; checkout re-validates stock authoritatively.
    pub fn add(&self, product: &ProductSummary) -> Result<(), ClientError> {
        self.mutate(|lines| {
            if let Some(line) = lines
                .iter_mut()
                .find(|line| line.product.product_uuid == product.product_uuid)
            {
                line.quantity = (line.quantity + 1).min(line.product.stock.max(1));
                line.sync = SyncStatus::PendingPush;
            } else {
                lines.push(CartLine {
                    product: product.clone(),
                    quantity: 1,
                    sync: SyncStatus::PendingPush,
                });
            }
        })
    }

    /// Remove a line entirely.
    pub fn remove(&self, product_uuid: Uuid) -> Result<(), ClientError> {
        self.mutate(|lines| {
            lines.retain(|line| line.product.product_uuid != product_uuid);
        })
    }

    /// Set a line's quantity, floored at 1. Unknown products are ignored.
    pub fn set_quantity(&self, product_uuid: Uuid, quantity: i64) -> Result<(), ClientError> {
        self.mutate(|lines| {
            if let Some(line) = lines
                .iter_mut()
                .find(|line| line.product.product_uuid == product_uuid)
            {
                line.quantity = quantity.max(1);
                line.sync = SyncStatus::PendingPush;
            }
        })
    }

    /// Empty the cart.
    pub fn clear(&self) -> Result<(), ClientError> {
        self.mutate(Vec::clear)
    }

    /// Replace the cart with the result of merging in the server copy.
    pub fn merge_server(&self, server: &[ServerCartLine]) -> Result<(), ClientError> {
        self.mutate(|lines| {
            *lines = merge_carts(server, lines);
        })
    }

    /// Mark the lines covered by a completed push as synced.
    ///
    /// Lines mutated after the push payload was captured keep their pending
    /// state and will be covered by the next push.
    pub fn confirm_pushed(&self, pushed: &[CartPush]) {
        let mut lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);

        for line in lines.iter_mut() {
            let covered = pushed.iter().any(|push| {
                push.product_uuid == line.product.product_uuid && push.quantity == line.quantity
            });

            if covered {
                line.sync = SyncStatus::Synced;
            }
        }
    }

    /// Mark every line still waiting on the server as failed.
    pub fn mark_push_failed(&self) {
        let mut lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);

        for line in lines.iter_mut() {
            if line.sync == SyncStatus::PendingPush {
                line.sync = SyncStatus::PushFailed;
            }
        }
    }

    fn mutate(&self, apply: impl FnOnce(&mut Vec<CartLine>)) -> Result<(), ClientError> {
        let snapshot = {
            let mut lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);

            apply(&mut lines);

            lines.clone()
        };

        self.persist(&snapshot)
    }

    fn persist(&self, lines: &[CartLine]) -> Result<(), ClientError> {
        let text = serde_json::to_string(lines).map_err(ClientError::Decode)?;

        self.storage.set(CART_KEY, &text)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::storage::MemoryStorage;

    use super::*;

    pub(crate) fn summary(uuid: Uuid, stock: i64) -> ProductSummary {
        ProductSummary {
            product_uuid: uuid,
            title: "A Wizard of Earthsea".to_string(),
            author: "Ursula K. Le Guin".to_string(),
            image: "https://img.example.com/earthsea.jpg".to_string(),
            original_price: 1200,
            discount_price: None,
            stock,
        }
    }

    fn server_line(uuid: Uuid, quantity: i64) -> ServerCartLine {
        ServerCartLine {
            product: summary(uuid, 10),
            quantity,
        }
    }

    fn local_line(uuid: Uuid, quantity: i64) -> CartLine {
        CartLine {
            product: summary(uuid, 10),
            quantity,
            sync: SyncStatus::PendingPush,
        }
    }

    fn new_store() -> CartStore {
        CartStore::load(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn merge_server_quantity_wins_and_local_only_lines_survive() {
        let p1 = Uuid::now_v7();
        let p2 = Uuid::now_v7();

        let server = vec![server_line(p1, 2)];
        let local = vec![local_line(p1, 5), local_line(p2, 1)];

        let merged = merge_carts(&server, &local);

        let quantities: Vec<(Uuid, i64)> = merged
            .iter()
            .map(|line| (line.product.product_uuid, line.quantity))
            .collect();

        assert_eq!(quantities, vec![(p1, 2), (p2, 1)]);
    }

    #[test]
    fn merge_is_idempotent_for_fixed_inputs() {
        let p1 = Uuid::now_v7();
        let p2 = Uuid::now_v7();

        let server = vec![server_line(p1, 2)];
        let local = vec![local_line(p1, 5), local_line(p2, 1)];

        let once = merge_carts(&server, &local);
        let twice = merge_carts(&server, &once);

        assert_eq!(once, twice);
    }

    #[test]
    fn merge_with_empty_server_keeps_local() {
        let p1 = Uuid::now_v7();
        let local = vec![local_line(p1, 3)];

        let merged = merge_carts(&[], &local);

        assert_eq!(merged, local);
    }

    #[test]
    fn add_inserts_then_increments() -> TestResult {
        let store = new_store();
        let product = summary(Uuid::now_v7(), 10);

        store.add(&product)?;
        store.add(&product)?;

        let lines = store.snapshot();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines.first().map(|l| l.quantity), Some(2));
        assert_eq!(lines.first().map(|l| l.sync), Some(SyncStatus::PendingPush));

        Ok(())
    }

    #[test]
    fn add_clamps_at_advertised_stock() -> TestResult {
        let store = new_store();
        let product = summary(Uuid::now_v7(), 2);

        store.add(&product)?;
        store.add(&product)?;
        store.add(&product)?;

        assert_eq!(store.snapshot().first().map(|l| l.quantity), Some(2));

        Ok(())
    }

    #[test]
    fn set_quantity_floors_at_one() -> TestResult {
        let store = new_store();
        let product = summary(Uuid::now_v7(), 10);

        store.add(&product)?;
        store.set_quantity(product.product_uuid, 0)?;

        assert_eq!(store.snapshot().first().map(|l| l.quantity), Some(1));

        store.set_quantity(product.product_uuid, 7)?;

        assert_eq!(store.snapshot().first().map(|l| l.quantity), Some(7));

        Ok(())
    }

    #[test]
    fn remove_deletes_the_line() -> TestResult {
        let store = new_store();
        let product = summary(Uuid::now_v7(), 10);

        store.add(&product)?;
        store.remove(product.product_uuid)?;

        assert!(store.snapshot().is_empty());

        Ok(())
    }

    #[test]
    fn cart_survives_reload_from_storage() -> TestResult {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let product = summary(Uuid::now_v7(), 10);

        {
            let store = CartStore::load(Arc::clone(&storage));

            store.add(&product)?;
            store.add(&product)?;
        }

        let reloaded = CartStore::load(storage);
        let lines = reloaded.snapshot();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines.first().map(|l| l.quantity), Some(2));

        Ok(())
    }

    #[test]
    fn confirm_pushed_skips_lines_mutated_after_capture() -> TestResult {
        let store = new_store();
        let stable = summary(Uuid::now_v7(), 10);
        let racing = summary(Uuid::now_v7(), 10);

        store.add(&stable)?;
        store.add(&racing)?;

        let pushed = store.pushes();

        // A mutation lands while the push is in flight.
        store.set_quantity(racing.product_uuid, 5)?;

        store.confirm_pushed(&pushed);

        let lines = store.snapshot();
        let sync_of = |uuid: Uuid| {
            lines
                .iter()
                .find(|l| l.product.product_uuid == uuid)
                .map(|l| l.sync)
        };

        assert_eq!(sync_of(stable.product_uuid), Some(SyncStatus::Synced));
        assert_eq!(sync_of(racing.product_uuid), Some(SyncStatus::PendingPush));

        Ok(())
    }

    #[test]
    fn mark_push_failed_flags_pending_lines() -> TestResult {
        let store = new_store();
        let product = summary(Uuid::now_v7(), 10);

        store.add(&product)?;
        store.mark_push_failed();

        assert_eq!(
            store.snapshot().first().map(|l| l.sync),
            Some(SyncStatus::PushFailed)
        );

        Ok(())
    }
}
