//! Contract of the remote document store backing the ledger.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{GatewayError, Record};

/// Async CRUD access to the per-user collections of the remote store.
///
/// Every operation is scoped by the user id and addresses the collection
/// named by [`Record::KIND`]. Implementations must not retry on their own:
/// retries are a caller policy.
pub trait Gateway: Send + Sync {
    /// List every record of the collection, in the order the store returns.
    fn list<R: Record>(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<R>, GatewayError>> + Send;

    /// Create a record and return it with the identifier assigned by the store.
    fn create<R: Record>(
        &self,
        user_id: &str,
        fields: &R::Fields,
        created_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<R, GatewayError>> + Send;

    /// Overwrite the mutable fields of an existing record.
    fn update<R: Record>(
        &self,
        user_id: &str,
        id: &str,
        fields: &R::Fields,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    fn delete<R: Record>(
        &self,
        user_id: &str,
        id: &str,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;
}
