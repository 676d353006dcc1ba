//! Ledger records: [`Item`] and [`OtherCost`].
//!
//! Both kinds share the [`Record`] trait, which is what the store, the gateway
//! contract and the view functions are generic over. A record is split into
//! its immutable part (identifier and creation timestamp) and its mutable
//! [`Record::Fields`], the only part an update is allowed to touch.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{LedgerError, ResultLedger, collection::Collection, store::Ledger};

/// The two remote collections kept by the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Item,
    OtherCost,
}

impl CollectionKind {
    /// Name of the collection in the remote document store.
    pub fn collection_name(self) -> &'static str {
        match self {
            Self::Item => "items",
            Self::OtherCost => "otherCosts",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection_name())
    }
}

/// A record stored in one of the ledger collections.
pub trait Record: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The mutable part of the record, sent on create and update.
    type Fields: Clone + fmt::Debug + Serialize + Send + Sync;

    const KIND: CollectionKind;

    /// Build a record from the remote-assigned id and the confirmed fields.
    fn from_parts(id: String, fields: Self::Fields, created_at: DateTime<Utc>) -> Self;

    /// Validate and normalize fields before they reach the gateway.
    fn validate(fields: Self::Fields) -> ResultLedger<Self::Fields>;

    /// Replace the mutable fields, keeping id and creation timestamp.
    fn apply(&mut self, fields: Self::Fields);

    fn id(&self) -> &str;

    /// Creation timestamp; `None` for documents stored without one.
    fn created_at(&self) -> Option<DateTime<Utc>>;

    /// Text shown for the record (name or description).
    fn label(&self) -> &str;

    /// Monetary value of the record (cost or amount).
    fn amount(&self) -> f64;

    fn collection(ledger: &Ledger) -> &Collection<Self>;

    fn collection_mut(ledger: &mut Ledger) -> &mut Collection<Self>;
}

/// A discrete purchased item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub name: String,
    pub cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Mutable fields of an [`Item`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemFields {
    pub name: String,
    pub cost: f64,
}

impl ItemFields {
    pub fn new(name: impl Into<String>, cost: f64) -> Self {
        Self {
            name: name.into(),
            cost,
        }
    }
}

impl Record for Item {
    type Fields = ItemFields;

    const KIND: CollectionKind = CollectionKind::Item;

    fn from_parts(id: String, fields: ItemFields, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: fields.name,
            cost: fields.cost,
            created_at: Some(created_at),
        }
    }

    fn validate(fields: ItemFields) -> ResultLedger<ItemFields> {
        Ok(ItemFields {
            name: normalize_required_text(&fields.name, "item name")?,
            cost: ensure_positive(fields.cost, "item cost")?,
        })
    }

    fn apply(&mut self, fields: ItemFields) {
        self.name = fields.name;
        self.cost = fields.cost;
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn label(&self) -> &str {
        &self.name
    }

    fn amount(&self) -> f64 {
        self.cost
    }

    fn collection(ledger: &Ledger) -> &Collection<Self> {
        &ledger.items
    }

    fn collection_mut(ledger: &mut Ledger) -> &mut Collection<Self> {
        &mut ledger.items
    }
}

/// A miscellaneous cost not tied to an item (fees, shipping, ...).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtherCost {
    pub id: String,
    pub description: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Mutable fields of an [`OtherCost`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OtherCostFields {
    pub description: String,
    pub amount: f64,
}

impl OtherCostFields {
    pub fn new(description: impl Into<String>, amount: f64) -> Self {
        Self {
            description: description.into(),
            amount,
        }
    }
}

impl Record for OtherCost {
    type Fields = OtherCostFields;

    const KIND: CollectionKind = CollectionKind::OtherCost;

    fn from_parts(id: String, fields: OtherCostFields, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            description: fields.description,
            amount: fields.amount,
            created_at: Some(created_at),
        }
    }

    fn validate(fields: OtherCostFields) -> ResultLedger<OtherCostFields> {
        Ok(OtherCostFields {
            description: normalize_required_text(&fields.description, "cost description")?,
            amount: ensure_positive(fields.amount, "cost amount")?,
        })
    }

    fn apply(&mut self, fields: OtherCostFields) {
        self.description = fields.description;
        self.amount = fields.amount;
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn label(&self) -> &str {
        &self.description
    }

    fn amount(&self) -> f64 {
        self.amount
    }

    fn collection(ledger: &Ledger) -> &Collection<Self> {
        &ledger.other_costs
    }

    fn collection_mut(ledger: &mut Ledger) -> &mut Collection<Self> {
        &mut ledger.other_costs
    }
}

/// Decode listed documents one by one, skipping the ones that do not match
/// the record shape instead of failing the whole listing.
pub fn decode_documents<R: Record>(documents: impl IntoIterator<Item = Value>) -> Vec<R> {
    documents
        .into_iter()
        .filter_map(|document| {
            let id = document
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or("<no id>")
                .to_string();
            serde_json::from_value::<R>(document)
                .inspect_err(|err| {
                    tracing::warn!(kind = %R::KIND, id = %id, "skipping undecodable document: {err}");
                })
                .ok()
        })
        .collect()
}

/// Stored text is the trimmed input: surrounding whitespace never reaches
/// the remote store.
fn normalize_required_text(value: &str, label: &str) -> ResultLedger<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::Validation(format!("{label} must not be empty")));
    }
    Ok(trimmed.to_string())
}

fn ensure_positive(value: f64, label: &str) -> ResultLedger<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(LedgerError::Validation(format!(
            "{label} must be a positive number, got {value}"
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("", 10.0)]
    #[case("   ", 10.0)]
    #[case("Pen", 0.0)]
    #[case("Pen", -2.5)]
    #[case("Pen", f64::NAN)]
    #[case("Pen", f64::INFINITY)]
    fn item_validation_rejects(#[case] name: &str, #[case] cost: f64) {
        let err = Item::validate(ItemFields::new(name, cost)).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn item_validation_trims_name() {
        let fields = Item::validate(ItemFields::new("  Pen ", 2.0)).unwrap();
        assert_eq!(fields, ItemFields::new("Pen", 2.0));
    }

    #[rstest]
    #[case("", 5.0)]
    #[case("Shipping", 0.0)]
    #[case("Shipping", -1.0)]
    fn other_cost_validation_rejects(#[case] description: &str, #[case] amount: f64) {
        let err = OtherCost::validate(OtherCostFields::new(description, amount)).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn apply_keeps_identity_and_timestamp() {
        let created_at = Utc::now();
        let mut item = Item::from_parts("a".to_string(), ItemFields::new("Pen", 2.0), created_at);
        item.apply(ItemFields::new("Fountain pen", 3.0));

        assert_eq!(item.id, "a");
        assert_eq!(item.created_at, Some(created_at));
        assert_eq!(item.name, "Fountain pen");
        assert_eq!(item.cost, 3.0);
    }

    #[test]
    fn records_serialize_with_camel_case_timestamp() {
        let created_at = "2024-05-01T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let cost = OtherCost::from_parts(
            "c1".to_string(),
            OtherCostFields::new("Shipping", 4.5),
            created_at,
        );
        let json = serde_json::to_value(&cost).unwrap();
        assert_eq!(json["createdAt"], "2024-05-01T10:00:00Z");
        assert_eq!(json["description"], "Shipping");
    }

    #[test]
    fn legacy_document_without_timestamp_is_kept() {
        let items = decode_documents::<Item>([
            serde_json::json!({"id": "a", "name": "Pen", "cost": 2, "createdAt": "2024-01-01T00:00:00.000Z"}),
            serde_json::json!({"id": "b", "name": "Laptop", "cost": 1200}),
        ]);

        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0].created_at,
            Some("2024-01-01T00:00:00Z".parse().unwrap())
        );
        assert_eq!(items[1].name, "Laptop");
        assert_eq!(items[1].created_at, None);
    }

    #[test]
    fn malformed_documents_are_skipped() {
        let costs = decode_documents::<OtherCost>([
            serde_json::json!({"id": "a", "description": "Shipping"}),
            serde_json::json!({"id": "b", "description": "Fee", "amount": "ten"}),
            serde_json::json!({"id": "c", "description": "Stamp", "amount": 1.5}),
        ]);

        assert_eq!(costs.len(), 1);
        assert_eq!(costs[0].id, "c");
    }

    #[test]
    fn missing_timestamp_is_not_serialized() {
        let item = Item {
            id: "b".to_string(),
            name: "Laptop".to_string(),
            cost: 1200.0,
            created_at: None,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("createdAt").is_none());
    }
}
