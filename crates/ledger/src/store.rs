//! The module contains the [`LedgerStore`], the single source of truth for the
//! item and other-cost collections of a user session.
//!
//! Every mutation performs exactly one gateway call and touches the local
//! cache only once that call resolved successfully. A failed call leaves the
//! cache exactly as it was before.

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::{
    Gateway, Item, OtherCost, Record, ResultLedger,
    collection::{Collection, Status},
};

/// Local caches of both collections.
#[derive(Debug, Default)]
pub struct Ledger {
    pub(crate) items: Collection<Item>,
    pub(crate) other_costs: Collection<OtherCost>,
}

impl Ledger {
    pub fn items(&self) -> &Collection<Item> {
        &self.items
    }

    pub fn other_costs(&self) -> &Collection<OtherCost> {
        &self.other_costs
    }

    pub fn collection<R: Record>(&self) -> &Collection<R> {
        R::collection(self)
    }

    fn reset(&mut self) {
        self.items.reset();
        self.other_costs.reset();
    }
}

/// Mediates every change of the ledger against the remote [`Gateway`].
#[derive(Debug)]
pub struct LedgerStore<G> {
    gateway: G,
    ledger: Ledger,
    clock: fn() -> DateTime<Utc>,
}

impl<G: Gateway> LedgerStore<G> {
    /// Return a builder for `LedgerStore`.
    pub fn builder(gateway: G) -> LedgerStoreBuilder<G> {
        LedgerStoreBuilder {
            gateway,
            clock: Utc::now,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Snapshot of both caches, to be handed to the view functions.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn items(&self) -> &[Item] {
        self.ledger.items.records()
    }

    pub fn other_costs(&self) -> &[OtherCost] {
        self.ledger.other_costs.records()
    }

    pub fn collection<R: Record>(&self) -> &Collection<R> {
        R::collection(&self.ledger)
    }

    /// Receiver notified on every status transition of the `R` collection.
    pub fn subscribe<R: Record>(&self) -> watch::Receiver<Status> {
        R::collection(&self.ledger).subscribe()
    }

    /// Replace the `R` cache with the remote content for `user_id`.
    ///
    /// On failure the previous content is kept, the status becomes
    /// [`Status::Failed`] and the error is recorded on the collection.
    pub async fn fetch<R: Record>(&mut self, user_id: &str) -> ResultLedger<&[R]> {
        R::collection(&self.ledger).set_status(Status::Loading);
        tracing::debug!("{}: fetching for user {user_id}", R::KIND);

        match self.gateway.list::<R>(user_id).await {
            Ok(records) => {
                let collection = R::collection_mut(&mut self.ledger);
                collection.replace(records);
                tracing::info!("{}: fetched {} records", R::KIND, collection.len());
                Ok(collection.records())
            }
            Err(err) => {
                tracing::debug!("{}: fetch failed: {err}", R::KIND);
                R::collection_mut(&mut self.ledger).fail(err.clone());
                Err(err.into())
            }
        }
    }

    /// Fetch both collections, items first.
    ///
    /// The second fetch runs even when the first one fails; the first error is
    /// returned.
    pub async fn fetch_all(&mut self, user_id: &str) -> ResultLedger<()> {
        let items = self.fetch::<Item>(user_id).await.map(|_| ());
        let other_costs = self.fetch::<OtherCost>(user_id).await.map(|_| ());
        items.and(other_costs)
    }

    /// Create a record and append it to the cache once the store confirmed it.
    pub async fn add<R: Record>(&mut self, user_id: &str, fields: R::Fields) -> ResultLedger<R> {
        let fields = R::validate(fields)?;
        let created_at = (self.clock)();

        let record = self
            .gateway
            .create::<R>(user_id, &fields, created_at)
            .await
            .inspect_err(|err| tracing::debug!("{}: create failed: {err}", R::KIND))?;

        R::collection_mut(&mut self.ledger).push(record.clone());
        tracing::info!("{}: added \"{}\"", R::KIND, record.id());
        Ok(record)
    }

    /// Update the mutable fields of record `id`.
    ///
    /// If the record is not cached locally after the remote update succeeded,
    /// the cache is left alone.
    pub async fn update<R: Record>(
        &mut self,
        user_id: &str,
        id: &str,
        fields: R::Fields,
    ) -> ResultLedger<()> {
        let fields = R::validate(fields)?;

        self.gateway
            .update::<R>(user_id, id, &fields)
            .await
            .inspect_err(|err| tracing::debug!("{}: update of \"{id}\" failed: {err}", R::KIND))?;

        if R::collection_mut(&mut self.ledger).patch(id, fields) {
            tracing::info!("{}: updated \"{id}\"", R::KIND);
        } else {
            tracing::debug!("{}: \"{id}\" updated remotely but not cached", R::KIND);
        }
        Ok(())
    }

    /// Delete record `id`. Deleting an id that is not cached is a no-op.
    pub async fn delete<R: Record>(&mut self, user_id: &str, id: &str) -> ResultLedger<()> {
        self.gateway
            .delete::<R>(user_id, id)
            .await
            .inspect_err(|err| tracing::debug!("{}: delete of \"{id}\" failed: {err}", R::KIND))?;

        if R::collection_mut(&mut self.ledger).remove(id) {
            tracing::info!("{}: deleted \"{id}\"", R::KIND);
        }
        Ok(())
    }

    /// Discard both caches, as on sign-out.
    pub fn reset(&mut self) {
        self.ledger.reset();
        tracing::debug!("ledger reset");
    }
}

/// The builder for `LedgerStore`
pub struct LedgerStoreBuilder<G> {
    gateway: G,
    clock: fn() -> DateTime<Utc>,
}

impl<G: Gateway> LedgerStoreBuilder<G> {
    /// Source of the creation timestamps assigned by `add`.
    pub fn clock(mut self, clock: fn() -> DateTime<Utc>) -> LedgerStoreBuilder<G> {
        self.clock = clock;
        self
    }

    /// Construct `LedgerStore` with empty, idle caches.
    pub fn build(self) -> LedgerStore<G> {
        LedgerStore {
            gateway: self.gateway,
            ledger: Ledger::default(),
            clock: self.clock,
        }
    }
}
