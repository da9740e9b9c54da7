//! Normalized in-memory entity store
//!
//! Each entity kind is held once, keyed by id. A mutation touches only the
//! affected entity and marks the dependent list stale, so the next list read
//! goes back to the backend while single-entity reads can still be served
//! from memory.

use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};

use shared::{
    DeliveryOrder, EntityId, GoodsReceiptNote, Item, Location, SalesOrder, StockBalance,
    StockIssueNote, StockSnapshot, Transfer, Warehouse,
};
use tokio::sync::RwLock;

use crate::error::AppResult;

/// Entities the store can index
pub trait Keyed {
    fn key(&self) -> Option<EntityId>;
}

macro_rules! keyed_by_id {
    ($($ty:ty),* $(,)?) => {
        $(impl Keyed for $ty {
            fn key(&self) -> Option<EntityId> {
                Some(self.id)
            }
        })*
    };
}

keyed_by_id!(
    Item,
    Warehouse,
    Location,
    GoodsReceiptNote,
    Transfer,
    SalesOrder,
    StockIssueNote,
    DeliveryOrder,
);

impl Keyed for StockBalance {
    fn key(&self) -> Option<EntityId> {
        self.id
    }
}

/// Cache partition key: the id of the signed-in user
///
/// Lists are loaded with the caller's bearer token and the backend decides
/// what that user may see, so one user's reads are never served to another.
pub type SessionKey = EntityId;

struct Slot<T> {
    entities: Vec<T>,
    loaded_at: Option<Instant>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
            loaded_at: None,
        }
    }
}

impl<T> Slot<T> {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.loaded_at.is_some_and(|at| at.elapsed() < ttl)
    }
}

struct Partitions<T> {
    sessions: HashMap<SessionKey, Slot<T>>,
    /// Bumped on every change; a list loaded across a bump is not kept
    generation: u64,
}

impl<T> Default for Partitions<T> {
    fn default() -> Self {
        Self {
            sessions: HashMap::new(),
            generation: 0,
        }
    }
}

/// Cache of one entity kind, partitioned by session
pub struct EntityStore<T> {
    inner: RwLock<Partitions<T>>,
    ttl: Duration,
}

impl<T: Keyed + Clone> EntityStore<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: RwLock::new(Partitions::default()),
            ttl,
        }
    }

    /// The session's full list, if it was loaded recently and not invalidated since
    pub async fn fresh_list(&self, session: SessionKey) -> Option<Vec<T>> {
        let inner = self.inner.read().await;
        inner
            .sessions
            .get(&session)
            .filter(|slot| slot.is_fresh(self.ttl))
            .map(|slot| slot.entities.clone())
    }

    /// Return the cached list or load it through `load`
    ///
    /// The loaded list is always returned, but it is only cached when nothing
    /// changed while the load was in flight.
    pub async fn get_or_load<F, Fut>(&self, session: SessionKey, load: F) -> AppResult<Vec<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<Vec<T>>>,
    {
        if let Some(list) = self.fresh_list(session).await {
            return Ok(list);
        }
        let generation = self.inner.read().await.generation;
        let list = load().await?;

        let mut inner = self.inner.write().await;
        if inner.generation == generation {
            self.store(&mut inner, session, list.clone());
        } else {
            tracing::debug!(session, "List changed while loading, not cached");
        }
        Ok(list)
    }

    pub async fn replace_all(&self, session: SessionKey, entities: Vec<T>) {
        let mut inner = self.inner.write().await;
        self.store(&mut inner, session, entities);
    }

    fn store(&self, inner: &mut Partitions<T>, session: SessionKey, entities: Vec<T>) {
        let ttl = self.ttl;
        inner
            .sessions
            .retain(|key, slot| *key == session || slot.is_fresh(ttl));
        let slot = inner.sessions.entry(session).or_default();
        slot.entities = entities;
        slot.loaded_at = Some(Instant::now());
    }

    pub async fn get(&self, session: SessionKey, id: EntityId) -> Option<T> {
        let inner = self.inner.read().await;
        inner
            .sessions
            .get(&session)?
            .entities
            .iter()
            .find(|e| e.key() == Some(id))
            .cloned()
    }

    /// Insert or replace one entity for the session that read or wrote it
    ///
    /// The session's own list stays fresh. Other sessions drop their copy
    /// and reload their list on the next read.
    pub async fn upsert(&self, session: SessionKey, entity: T) {
        let mut inner = self.inner.write().await;
        inner.generation += 1;
        let key = entity.key();
        for (owner, slot) in inner.sessions.iter_mut() {
            if *owner != session {
                slot.entities.retain(|e| key.is_none() || e.key() != key);
                slot.loaded_at = None;
            }
        }
        let slot = inner.sessions.entry(session).or_default();
        match key.and_then(|k| slot.entities.iter().position(|e| e.key() == Some(k))) {
            Some(pos) => slot.entities[pos] = entity,
            None => slot.entities.push(entity),
        }
    }

    /// Forget a deleted entity in every session
    pub async fn remove(&self, id: EntityId) {
        let mut inner = self.inner.write().await;
        inner.generation += 1;
        for slot in inner.sessions.values_mut() {
            slot.entities.retain(|e| e.key() != Some(id));
        }
    }

    /// Drop one entity everywhere and force the next list reads to reload
    pub async fn invalidate(&self, id: EntityId) {
        let mut inner = self.inner.write().await;
        inner.generation += 1;
        for slot in inner.sessions.values_mut() {
            slot.entities.retain(|e| e.key() != Some(id));
            slot.loaded_at = None;
        }
    }

    pub async fn invalidate_list(&self) {
        let mut inner = self.inner.write().await;
        inner.generation += 1;
        for slot in inner.sessions.values_mut() {
            slot.loaded_at = None;
        }
    }
}

#[derive(Default)]
struct SnapshotEntries {
    snapshots: HashMap<(SessionKey, EntityId), (Instant, StockSnapshot)>,
    generation: u64,
}

/// Per-warehouse availability snapshots, partitioned by session
pub struct SnapshotCache {
    inner: RwLock<SnapshotEntries>,
    ttl: Duration,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: RwLock::new(SnapshotEntries::default()),
            ttl,
        }
    }

    pub async fn get(&self, session: SessionKey, warehouse_id: EntityId) -> Option<StockSnapshot> {
        let inner = self.inner.read().await;
        inner
            .snapshots
            .get(&(session, warehouse_id))
            .filter(|(at, _)| at.elapsed() < self.ttl)
            .map(|(_, s)| s.clone())
    }

    /// Cached snapshot, or one taken through `load` and kept unless stock moved meanwhile
    pub async fn get_or_load<F, Fut>(
        &self,
        session: SessionKey,
        warehouse_id: EntityId,
        load: F,
    ) -> AppResult<StockSnapshot>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<StockSnapshot>>,
    {
        if let Some(s) = self.get(session, warehouse_id).await {
            return Ok(s);
        }
        let generation = self.inner.read().await.generation;
        let snapshot = load().await?;

        let mut inner = self.inner.write().await;
        if inner.generation == generation {
            let ttl = self.ttl;
            inner.snapshots.retain(|_, (at, _)| at.elapsed() < ttl);
            inner
                .snapshots
                .insert((session, warehouse_id), (Instant::now(), snapshot.clone()));
        }
        Ok(snapshot)
    }

    pub async fn insert(&self, session: SessionKey, snapshot: StockSnapshot) {
        self.inner.write().await.snapshots.insert(
            (session, snapshot.warehouse_id),
            (Instant::now(), snapshot),
        );
    }

    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.generation += 1;
        inner.snapshots.clear();
    }
}

/// All caches of the gateway
pub struct Stores {
    pub items: EntityStore<Item>,
    pub warehouses: EntityStore<Warehouse>,
    pub locations: EntityStore<Location>,
    pub stocks: EntityStore<StockBalance>,
    pub grns: EntityStore<GoodsReceiptNote>,
    pub transfers: EntityStore<Transfer>,
    pub sales_orders: EntityStore<SalesOrder>,
    pub issue_notes: EntityStore<StockIssueNote>,
    pub delivery_orders: EntityStore<DeliveryOrder>,
    pub snapshots: SnapshotCache,
}

impl Stores {
    pub fn new(ttl: Duration) -> Self {
        Self {
            items: EntityStore::new(ttl),
            warehouses: EntityStore::new(ttl),
            locations: EntityStore::new(ttl),
            stocks: EntityStore::new(ttl),
            grns: EntityStore::new(ttl),
            transfers: EntityStore::new(ttl),
            sales_orders: EntityStore::new(ttl),
            issue_notes: EntityStore::new(ttl),
            delivery_orders: EntityStore::new(ttl),
            snapshots: SnapshotCache::new(ttl),
        }
    }

    /// Anything that moves stock makes balances, snapshots and item totals stale
    pub async fn invalidate_stock(&self) {
        self.stocks.invalidate_list().await;
        self.snapshots.clear().await;
        self.items.invalidate_list().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::oneshot;

    const ALICE: SessionKey = 1;
    const BOB: SessionKey = 2;

    fn warehouse(id: EntityId, code: &str) -> Warehouse {
        serde_json::from_value(json!({"id": id, "code": code, "nameAr": code})).unwrap()
    }

    fn codes(list: &[Warehouse]) -> Vec<&str> {
        list.iter().map(|w| w.code.as_str()).collect()
    }

    #[tokio::test]
    async fn test_list_is_loaded_once_while_fresh() {
        let store = EntityStore::new(Duration::from_secs(60));
        let loads = AtomicUsize::new(0);
        let counter = &loads;
        let load = || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, AppError>(vec![warehouse(1, "A")])
        };

        let first = store.get_or_load(ALICE, load).await.unwrap();
        let second = store.get_or_load(ALICE, load).await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(second, first);
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_sessions_do_not_share_lists() {
        let store = EntityStore::new(Duration::from_secs(60));
        store.replace_all(ALICE, vec![warehouse(1, "A")]).await;

        assert!(store.fresh_list(BOB).await.is_none());
        assert!(store.get(BOB, 1).await.is_none());
        assert_eq!(store.get(ALICE, 1).await.map(|w| w.code), Some("A".to_string()));
    }

    #[tokio::test]
    async fn test_upsert_replaces_in_place() {
        let store = EntityStore::new(Duration::from_secs(60));
        store
            .replace_all(ALICE, vec![warehouse(1, "A"), warehouse(2, "B")])
            .await;
        store.upsert(ALICE, warehouse(1, "A2")).await;
        store.upsert(ALICE, warehouse(3, "C")).await;

        let list = store.fresh_list(ALICE).await.unwrap();
        assert_eq!(codes(&list), vec!["A2", "B", "C"]);
    }

    #[tokio::test]
    async fn test_upsert_makes_other_sessions_reload() {
        let store = EntityStore::new(Duration::from_secs(60));
        store
            .replace_all(ALICE, vec![warehouse(1, "A"), warehouse(2, "B")])
            .await;
        store
            .replace_all(BOB, vec![warehouse(1, "A"), warehouse(2, "B")])
            .await;

        store.upsert(ALICE, warehouse(1, "A2")).await;

        assert!(store.fresh_list(ALICE).await.is_some());
        assert!(store.fresh_list(BOB).await.is_none());
        assert!(store.get(BOB, 1).await.is_none());
        assert_eq!(store.get(BOB, 2).await.map(|w| w.code), Some("B".to_string()));
    }

    #[tokio::test]
    async fn test_invalidate_forces_reload_but_keeps_other_entities() {
        let store = EntityStore::new(Duration::from_secs(60));
        store
            .replace_all(ALICE, vec![warehouse(1, "A"), warehouse(2, "B")])
            .await;
        store.invalidate(1).await;

        assert!(store.fresh_list(ALICE).await.is_none());
        assert!(store.get(ALICE, 1).await.is_none());
        assert_eq!(store.get(ALICE, 2).await.map(|w| w.code), Some("B".to_string()));
    }

    #[tokio::test]
    async fn test_load_overlapping_an_invalidation_is_not_kept() {
        let store = EntityStore::new(Duration::from_secs(60));
        let (started_tx, started_rx) = oneshot::channel::<()>();
        let (release_tx, release_rx) = oneshot::channel::<()>();

        let load = store.get_or_load(ALICE, move || async move {
            let _ = started_tx.send(());
            let _ = release_rx.await;
            Ok::<_, AppError>(vec![warehouse(1, "OLD")])
        });
        let mutate = async {
            let _ = started_rx.await;
            store.invalidate_list().await;
            let _ = release_tx.send(());
        };
        let (loaded, ()) = tokio::join!(load, mutate);

        // The caller still gets what it loaded, but it is not cached as fresh
        assert_eq!(codes(&loaded.unwrap()), vec!["OLD"]);
        assert!(store.fresh_list(ALICE).await.is_none());

        let reloaded = store
            .get_or_load(ALICE, || async { Ok::<_, AppError>(vec![warehouse(1, "NEW")]) })
            .await
            .unwrap();
        assert_eq!(codes(&reloaded), vec!["NEW"]);
        assert!(store.fresh_list(ALICE).await.is_some());
    }

    #[tokio::test]
    async fn test_zero_ttl_is_never_fresh() {
        let store = EntityStore::new(Duration::ZERO);
        store.replace_all(ALICE, vec![warehouse(1, "A")]).await;
        assert!(store.fresh_list(ALICE).await.is_none());
    }

    #[tokio::test]
    async fn test_invalidate_stock_clears_snapshots() {
        let stores = Stores::new(Duration::from_secs(60));
        stores
            .snapshots
            .insert(ALICE, StockSnapshot::from_balances(4, &[]))
            .await;
        assert!(stores.snapshots.get(ALICE, 4).await.is_some());
        assert!(stores.snapshots.get(BOB, 4).await.is_none());
        stores.invalidate_stock().await;
        assert!(stores.snapshots.get(ALICE, 4).await.is_none());
    }

    #[tokio::test]
    async fn test_snapshot_taken_while_stock_moves_is_not_kept() {
        let cache = SnapshotCache::new(Duration::from_secs(60));
        let (started_tx, started_rx) = oneshot::channel::<()>();
        let (release_tx, release_rx) = oneshot::channel::<()>();

        let load = cache.get_or_load(ALICE, 4, move || async move {
            let _ = started_tx.send(());
            let _ = release_rx.await;
            Ok::<_, AppError>(StockSnapshot::from_balances(4, &[]))
        });
        let mutate = async {
            let _ = started_rx.await;
            cache.clear().await;
            let _ = release_tx.send(());
        };
        let (taken, ()) = tokio::join!(load, mutate);

        assert_eq!(taken.unwrap().warehouse_id, 4);
        assert!(cache.get(ALICE, 4).await.is_none());
    }
}
