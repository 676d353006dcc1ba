//! Plain-text rendering of the ledger views.

use std::io::{self, Write};

use chrono::{DateTime, Utc};

use ledger::{
    Record,
    view::{Analytics, Dashboard, Totals},
};

/// Amounts are kept as floats; rounding happens only here.
pub fn money(value: f64) -> String {
    format!("{value:.2}")
}

/// Creation date as shown in listings; records stored without one show `N/A`.
pub fn date(created_at: Option<DateTime<Utc>>) -> String {
    created_at.map_or_else(
        || "N/A".to_string(),
        |created_at| created_at.format("%Y-%m-%d %H:%M").to_string(),
    )
}

fn rows<R: Record>(out: &mut impl Write, title: &str, records: &[R]) -> io::Result<()> {
    writeln!(out, "{title}")?;
    if records.is_empty() {
        writeln!(out, "  (none)")?;
        return Ok(());
    }
    for record in records {
        writeln!(
            out,
            "  {:<36}  {:<24}  {:>12}  {}",
            record.id(),
            record.label(),
            money(record.amount()),
            date(record.created_at()),
        )?;
    }
    Ok(())
}

fn totals(out: &mut impl Write, totals: &Totals) -> io::Result<()> {
    writeln!(out, "Items total:       {:>12}", money(totals.items))?;
    writeln!(out, "Other costs total: {:>12}", money(totals.other_costs))?;
    writeln!(out, "Total cost:        {:>12}", money(totals.grand_total))
}

pub fn dashboard(out: &mut impl Write, display_name: &str, view: &Dashboard) -> io::Result<()> {
    writeln!(out, "Welcome, {display_name}")?;
    writeln!(out)?;
    rows(out, "Items", &view.items)?;
    writeln!(out)?;
    rows(out, "Other costs", &view.other_costs)?;
    writeln!(out)?;
    totals(out, &view.totals)
}

pub fn analytics(out: &mut impl Write, view: &Analytics) -> io::Result<()> {
    writeln!(out, "Cost distribution")?;
    totals(out, &view.distribution)?;
    writeln!(out)?;
    rows(out, "Top items by cost", &view.top_items)?;
    writeln!(out)?;
    rows(out, "Top other costs by amount", &view.top_other_costs)
}
