//! Local cache of one remote collection.

use tokio::sync::watch;

use crate::{GatewayError, Record};

/// Status of a collection cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// Ordered records of one kind plus their fetch status.
///
/// Every record in the cache has been confirmed by the remote store; the
/// mutators below are only called by the store once a gateway call resolved.
#[derive(Debug)]
pub struct Collection<R> {
    records: Vec<R>,
    status: watch::Sender<Status>,
    error: Option<GatewayError>,
}

impl<R> Default for Collection<R> {
    fn default() -> Self {
        let (status, _) = watch::channel(Status::Idle);
        Self {
            records: Vec::new(),
            status,
            error: None,
        }
    }
}

impl<R: Record> Collection<R> {
    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn status(&self) -> Status {
        *self.status.borrow()
    }

    /// Error of the last failed fetch, cleared by the next successful one.
    pub fn error(&self) -> Option<&GatewayError> {
        self.error.as_ref()
    }

    /// Receiver notified on every status transition.
    pub fn subscribe(&self) -> watch::Receiver<Status> {
        self.status.subscribe()
    }

    pub fn get(&self, id: &str) -> Option<&R> {
        self.records.iter().find(|record| record.id() == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub(crate) fn set_status(&self, status: Status) {
        self.status.send_replace(status);
    }

    /// Replace the whole content, keeping the first record for a repeated id.
    pub(crate) fn replace(&mut self, records: Vec<R>) {
        let mut unique: Vec<R> = Vec::with_capacity(records.len());
        for record in records {
            if unique.iter().any(|kept| kept.id() == record.id()) {
                tracing::warn!(
                    "{}: dropping duplicate record \"{}\" returned by the gateway",
                    R::KIND,
                    record.id()
                );
                continue;
            }
            unique.push(record);
        }
        self.records = unique;
        self.error = None;
        self.set_status(Status::Succeeded);
    }

    pub(crate) fn fail(&mut self, error: GatewayError) {
        self.error = Some(error);
        self.set_status(Status::Failed);
    }

    /// Append a created record, replacing a cached one with the same id.
    pub(crate) fn push(&mut self, record: R) {
        match self.records.iter_mut().find(|cached| cached.id() == record.id()) {
            Some(cached) => *cached = record,
            None => self.records.push(record),
        }
    }

    /// Apply updated fields to the cached record; `false` if it is absent.
    pub(crate) fn patch(&mut self, id: &str, fields: R::Fields) -> bool {
        match self.records.iter_mut().find(|record| record.id() == id) {
            Some(record) => {
                record.apply(fields);
                true
            }
            None => false,
        }
    }

    /// Remove the record with the given id; `false` if it is absent.
    pub(crate) fn remove(&mut self, id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|record| record.id() != id);
        self.records.len() != before
    }

    pub(crate) fn reset(&mut self) {
        self.records.clear();
        self.error = None;
        self.set_status(Status::Idle);
    }
}
