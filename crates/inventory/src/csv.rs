//! CSV export/import.
//!
//! Format (fixed, used for round-tripping):
//!
//! ```text
//! Barcode,Name,Category,Quantity,Price
//! "4006381333931","Marker","Office",12,1.99
//! ```
//!
//! The three text fields are wrapped in double quotes without escaping, and
//! import splits on every comma, so text containing `,` or `"` does not
//! survive a round trip. The reorder threshold is not exported.

use rust_decimal::Decimal;

use stockscan_core::{Barcode, DomainError, DomainResult};

use crate::item::{Item, parse_count, parse_name, parse_price};
use crate::store::{InventoryStore, MergeOutcome};

pub const CSV_HEADER: &str = "Barcode,Name,Category,Quantity,Price";

/// Reorder threshold given to items created by an import.
pub const IMPORT_REORDER_THRESHOLD: u32 = 5;

const MIN_FIELDS: usize = 5;

/// Serialize items in store order.
pub fn export_csv<'a>(items: impl IntoIterator<Item = &'a Item>) -> String {
    let mut out = String::with_capacity(64);
    out.push_str(CSV_HEADER);
    out.push('\n');

    for item in items {
        out.push_str(&format!(
            "\"{}\",\"{}\",\"{}\",{},{}\n",
            item.barcode(),
            item.name(),
            item.category(),
            item.quantity(),
            item.price()
        ));
    }

    out
}

/// One parsed data line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRecord {
    pub barcode: Barcode,
    pub name: String,
    pub category: String,
    pub quantity: u32,
    pub price: Decimal,
}

/// Parse a data line (`line_number` is 1-based, header included).
pub fn parse_line(line_number: usize, line: &str) -> DomainResult<CsvRecord> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < MIN_FIELDS {
        return Err(DomainError::malformed_line(
            line_number,
            format!("expected {MIN_FIELDS} fields, found {}", fields.len()),
        ));
    }

    let text = |raw: &str| raw.replace('"', "").trim().to_string();
    let malformed = at_line(line_number);

    let barcode = Barcode::parse(&text(fields[0])).map_err(&malformed)?;
    let name = parse_name(&text(fields[1])).map_err(&malformed)?.to_string();
    let category = text(fields[2]);
    let quantity = parse_count("quantity", fields[3]).map_err(&malformed)?;
    let price = parse_price(fields[4]).map_err(&malformed)?;

    Ok(CsvRecord {
        barcode,
        name,
        category,
        quantity,
        price,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    pub line_number: usize,
    pub error: DomainError,
}

/// Outcome of an import batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Lines that produced a record and were applied to the store.
    pub imported: usize,
    pub created: usize,
    pub merged: usize,
    pub skipped: Vec<SkippedLine>,
}

impl ImportReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Whether the store was changed at all.
    pub fn changed_store(&self) -> bool {
        self.imported > 0
    }
}

/// Merge every valid data line of `text` into `store`.
///
/// The header line and blank lines are ignored. Malformed lines are recorded in
/// the report and never abort the batch. Existing items keep their reorder
/// threshold; new ones get [`IMPORT_REORDER_THRESHOLD`].
pub fn import_csv(store: &mut InventoryStore, text: &str) -> ImportReport {
    let mut report = ImportReport::default();

    for (idx, raw) in text.split('\n').enumerate().skip(1) {
        let line_number = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        match apply_line(store, line_number, line) {
            Ok(outcome) => {
                report.imported += 1;
                if outcome.was_merged() {
                    report.merged += 1;
                } else {
                    report.created += 1;
                }
            }
            Err(error) => report.skipped.push(SkippedLine { line_number, error }),
        }
    }

    report
}

fn apply_line(store: &mut InventoryStore, line_number: usize, line: &str) -> DomainResult<MergeOutcome> {
    let record = parse_line(line_number, line)?;

    let reorder = store
        .find_by_barcode(record.barcode.as_str())
        .map(Item::reorder_threshold)
        .unwrap_or(IMPORT_REORDER_THRESHOLD);

    let item = Item::new(
        record.barcode,
        record.name,
        record.category,
        record.quantity,
        record.price,
        reorder,
    )
    .map_err(at_line(line_number))?;

    store.merge_or_add(item).map_err(at_line(line_number))
}

/// Attach a line number to a record error, keeping only the field and reason.
fn at_line(line_number: usize) -> impl Fn(DomainError) -> DomainError {
    move |err| match err {
        DomainError::InvalidField { field, reason } => {
            DomainError::malformed_line(line_number, format!("{field}: {reason}"))
        }
        keyed @ DomainError::MalformedImportLine { .. } => keyed,
        other => DomainError::malformed_line(line_number, other.to_string()),
    }
}
