//! In-process [`Gateway`] keeping JSON documents in memory.
//!
//! Useful for tests and demos: identifiers are random UUIDs like the ones a
//! document store hands out, and failures can be injected per operation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{CollectionKind, Gateway, GatewayError, Record, decode_documents};

/// Gateway operations, used to inject failures and count calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Default)]
struct State {
    documents: HashMap<(String, CollectionKind), Vec<Map<String, Value>>>,
    failures: HashMap<Operation, GatewayError>,
    calls: HashMap<Operation, usize>,
}

impl State {
    /// Count the call and return the injected failure, if any.
    fn enter(&mut self, op: Operation) -> Result<(), GatewayError> {
        *self.calls.entry(op).or_default() += 1;
        match self.failures.get(&op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Documents of one collection; unknown users read as empty.
    fn documents(&self, user_id: &str, kind: CollectionKind) -> &[Map<String, Value>] {
        self.documents
            .get(&(user_id.to_string(), kind))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn documents_mut(&mut self, user_id: &str, kind: CollectionKind) -> &mut Vec<Map<String, Value>> {
        self.documents
            .entry((user_id.to_string(), kind))
            .or_default()
    }
}

#[derive(Debug, Default)]
pub struct MemoryGateway {
    state: Mutex<State>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store records as they are, keeping their ids and timestamps.
    pub async fn seed<R: Record>(&self, user_id: &str, records: &[R]) -> Result<(), GatewayError> {
        let mut state = self.state.lock().await;
        let documents = state.documents_mut(user_id, R::KIND);
        for record in records {
            documents.push(to_document(record)?);
        }
        Ok(())
    }

    /// Store raw JSON documents, whatever their shape.
    ///
    /// Lets callers reproduce data written by older clients or by hand.
    pub async fn seed_documents(
        &self,
        user_id: &str,
        kind: CollectionKind,
        documents: impl IntoIterator<Item = Value>,
    ) -> Result<(), GatewayError> {
        let mut state = self.state.lock().await;
        let stored = state.documents_mut(user_id, kind);
        for document in documents {
            match document {
                Value::Object(document) => stored.push(document),
                _ => return Err(GatewayError::Decode("document must be an object".to_string())),
            }
        }
        Ok(())
    }

    /// Make every following call of `op` fail with `error`.
    pub async fn fail(&self, op: Operation, error: GatewayError) {
        self.state.lock().await.failures.insert(op, error);
    }

    /// Remove the failure injected for `op`.
    pub async fn recover(&self, op: Operation) {
        self.state.lock().await.failures.remove(&op);
    }

    /// Number of calls received for `op`, failed ones included.
    pub async fn calls(&self, op: Operation) -> usize {
        self.state
            .lock()
            .await
            .calls
            .get(&op)
            .copied()
            .unwrap_or_default()
    }
}

impl Gateway for MemoryGateway {
    async fn list<R: Record>(&self, user_id: &str) -> Result<Vec<R>, GatewayError> {
        let mut state = self.state.lock().await;
        state.enter(Operation::List)?;
        let documents = state
            .documents(user_id, R::KIND)
            .iter()
            .cloned()
            .map(Value::Object);
        Ok(decode_documents(documents))
    }

    async fn create<R: Record>(
        &self,
        user_id: &str,
        fields: &R::Fields,
        created_at: DateTime<Utc>,
    ) -> Result<R, GatewayError> {
        let mut state = self.state.lock().await;
        state.enter(Operation::Create)?;
        let record = R::from_parts(Uuid::new_v4().to_string(), fields.clone(), created_at);
        let document = to_document(&record)?;
        state.documents_mut(user_id, R::KIND).push(document);
        Ok(record)
    }

    async fn update<R: Record>(
        &self,
        user_id: &str,
        id: &str,
        fields: &R::Fields,
    ) -> Result<(), GatewayError> {
        let mut state = self.state.lock().await;
        state.enter(Operation::Update)?;
        let Value::Object(patch) =
            serde_json::to_value(fields).map_err(|err| GatewayError::Decode(err.to_string()))?
        else {
            return Err(GatewayError::Decode("fields must be an object".to_string()));
        };
        let document = state
            .documents
            .get_mut(&(user_id.to_string(), R::KIND))
            .and_then(|documents| {
                documents
                    .iter_mut()
                    .find(|document| document_id(document) == Some(id))
            })
            .ok_or_else(|| GatewayError::NotFound(id.to_string()))?;
        document.extend(patch);
        Ok(())
    }

    async fn delete<R: Record>(&self, user_id: &str, id: &str) -> Result<(), GatewayError> {
        let mut state = self.state.lock().await;
        state.enter(Operation::Delete)?;
        if let Some(documents) = state.documents.get_mut(&(user_id.to_string(), R::KIND)) {
            documents.retain(|document| document_id(document) != Some(id));
        }
        Ok(())
    }
}

fn to_document<R: Record>(record: &R) -> Result<Map<String, Value>, GatewayError> {
    match serde_json::to_value(record) {
        Ok(Value::Object(document)) => Ok(document),
        Ok(_) => Err(GatewayError::Decode("record must be an object".to_string())),
        Err(err) => Err(GatewayError::Decode(err.to_string())),
    }
}

fn document_id(document: &Map<String, Value>) -> Option<&str> {
    document.get("id").and_then(Value::as_str)
}
