//! Client-side ledger of a personal cost tracker.
//!
//! The [`LedgerStore`] keeps a local cache of two remote collections, items
//! and other costs, and applies every create/update/delete through a
//! [`Gateway`] to the remote document store. The [`view`] module derives
//! sorted, filtered and aggregated sequences from a cache snapshot.
//!
//! # Examples
//!
//! ```rust
//! use ledger::{Item, ItemFields, LedgerStore, memory::MemoryGateway, view};
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # rt.block_on(async {
//! let mut store = LedgerStore::builder(MemoryGateway::new()).build();
//! store.add::<Item>("alice", ItemFields::new("Laptop", 1200.0)).await.unwrap();
//! store.add::<Item>("alice", ItemFields::new("Pen", 2.0)).await.unwrap();
//!
//! let expensive = view::filter_by_threshold(store.items(), 10.0);
//! assert_eq!(expensive.len(), 1);
//! assert_eq!(view::totals(store.items(), store.other_costs()).grand_total, 1202.0);
//! # });
//! ```

pub use collection::{Collection, Status};
pub use error::{GatewayError, LedgerError};
pub use gateway::Gateway;
pub use records::{
    CollectionKind, Item, ItemFields, OtherCost, OtherCostFields, Record, decode_documents,
};
pub use session::{AuthState, Session, User};
pub use store::{Ledger, LedgerStore, LedgerStoreBuilder};

mod collection;
mod error;
mod gateway;
pub mod memory;
mod records;
mod session;
mod store;
pub mod view;

pub type ResultLedger<T> = Result<T, LedgerError>;
