//! Pure functions deriving display sequences and aggregates from a ledger
//! snapshot.
//!
//! Nothing here touches the store: the same inputs always produce the same
//! outputs.

use std::{cmp::Ordering, str::FromStr};

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{Item, LedgerError, OtherCost, Record, store::Ledger};

/// Length of the rankings shown by [`analytics`].
pub const TOP_RANKING_LEN: usize = 5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Item name or cost description.
    #[default]
    Name,
    /// Item cost or cost amount.
    Cost,
}

impl FromStr for SortKey {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" | "description" => Ok(Self::Name),
            "cost" | "amount" => Ok(Self::Cost),
            other => Err(LedgerError::Validation(format!("unknown sort key: {other}"))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl FromStr for SortOrder {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            other => Err(LedgerError::Validation(format!("unknown sort order: {other}"))),
        }
    }
}

/// Parameters selected by the user for the listing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewParams {
    pub sort_key: SortKey,
    pub sort_order: SortOrder,
    /// Items costing this much or less are hidden.
    pub threshold: f64,
}

/// Records whose amount is strictly greater than `threshold`.
pub fn filter_by_threshold<R: Record>(records: &[R], threshold: f64) -> Vec<R> {
    let threshold = if threshold.is_nan() { 0.0 } else { threshold };
    records
        .iter()
        .filter(|record| record.amount() > threshold)
        .cloned()
        .collect()
}

/// Stable sort by label or amount. Ties keep their relative order in both
/// directions.
pub fn sort<R: Record>(records: &[R], key: SortKey, order: SortOrder) -> Vec<R> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| {
        let (a, b) = match order {
            SortOrder::Ascending => (a, b),
            SortOrder::Descending => (b, a),
        };
        match key {
            SortKey::Name => locale_cmp(a.label(), b.label()),
            SortKey::Cost => a.amount().total_cmp(&b.amount()),
        }
    });
    sorted
}

/// Sums of both collections.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Totals {
    pub items: f64,
    pub other_costs: f64,
    pub grand_total: f64,
}

pub fn totals(items: &[Item], other_costs: &[OtherCost]) -> Totals {
    let items: f64 = items.iter().map(|item| item.cost).sum();
    let other_costs: f64 = other_costs.iter().map(|cost| cost.amount).sum();
    Totals {
        items,
        other_costs,
        grand_total: items + other_costs,
    }
}

/// The `n` records with the highest `ranking`, highest first. Ties keep their
/// original order.
pub fn top_n<R, F>(records: &[R], n: usize, ranking: F) -> Vec<R>
where
    R: Clone,
    F: Fn(&R) -> f64,
{
    let mut ranked = records.to_vec();
    ranked.sort_by(|a, b| ranking(b).total_cmp(&ranking(a)));
    ranked.truncate(n);
    ranked
}

/// What the dashboard lists.
#[derive(Clone, Debug, PartialEq)]
pub struct Dashboard {
    /// Items above the threshold, sorted.
    pub items: Vec<Item>,
    /// Other costs, sorted. The threshold does not apply to them.
    pub other_costs: Vec<OtherCost>,
    /// Totals over the whole ledger, not just the listed rows.
    pub totals: Totals,
}

pub fn dashboard(ledger: &Ledger, params: &ViewParams) -> Dashboard {
    let items = ledger.items().records();
    let other_costs = ledger.other_costs().records();

    let filtered = filter_by_threshold(items, params.threshold);
    Dashboard {
        items: sort(&filtered, params.sort_key, params.sort_order),
        other_costs: sort(other_costs, params.sort_key, params.sort_order),
        totals: totals(items, other_costs),
    }
}

/// What the analytics page charts.
#[derive(Clone, Debug, PartialEq)]
pub struct Analytics {
    /// Items against other costs.
    pub distribution: Totals,
    pub top_items: Vec<Item>,
    pub top_other_costs: Vec<OtherCost>,
}

pub fn analytics(ledger: &Ledger) -> Analytics {
    let items = ledger.items().records();
    let other_costs = ledger.other_costs().records();

    Analytics {
        distribution: totals(items, other_costs),
        top_items: top_n(items, TOP_RANKING_LEN, |item| item.cost),
        top_other_costs: top_n(other_costs, TOP_RANKING_LEN, |cost| cost.amount),
    }
}

/// Collation close to a root-locale comparison: base letters first, then
/// accents, then case with lowercase before uppercase.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let primary = |s: &str| -> String {
        s.nfkd()
            .filter(|c| !is_combining_mark(*c))
            .flat_map(char::to_lowercase)
            .collect()
    };
    let secondary = |s: &str| -> String { s.nfkd().flat_map(char::to_lowercase).collect() };

    primary(a)
        .cmp(&primary(b))
        .then_with(|| secondary(a).cmp(&secondary(b)))
        .then_with(|| {
            let case = |s: &str| s.nfkd().map(char::is_uppercase).collect::<Vec<_>>();
            case(a).cmp(&case(b))
        })
        .then_with(|| a.cmp(b))
}
