//! Inventory domain module.
//!
//! This crate contains the business rules for the inventory record store,
//! implemented purely as deterministic domain logic (no IO, no UI, no storage).

pub mod analytics;
pub mod csv;
pub mod edit;
pub mod item;
pub mod labels;
pub mod store;

pub use analytics::{CategoryTotals, InventorySummary, category_totals, summarize, total_value};
pub use csv::{CSV_HEADER, IMPORT_REORDER_THRESHOLD, ImportReport, SkippedLine, export_csv, import_csv};
pub use edit::{EditSession, EditState};
pub use item::{Item, ItemForm, MAX_PRICE};
pub use labels::LabelSelection;
pub use store::{InventoryStore, MergeOutcome};
