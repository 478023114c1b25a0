//! Application composition point.
//!
//! [`InventoryApp`] owns the store, the edit session and the label selection,
//! and wires every successful mutation to the two mandatory side effects:
//! persisting the collection and re-rendering analytics.

use stockscan_core::{Barcode, DomainError, DomainResult};
use stockscan_inventory::{
    EditSession, ImportReport, InventoryStore, InventorySummary, Item, ItemForm, LabelSelection,
    MergeOutcome, csv, summarize,
};

use crate::gateway::{PersistenceError, PersistenceGateway};
use crate::preferences::{THEME_KEY, Theme};
use crate::render::{BarcodeRenderer, ChartRenderer};

/// How a form submitted while not editing treats an existing barcode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmitMode {
    /// Reject with `DuplicateBarcode` so the user can be asked first.
    #[default]
    ConfirmMerge,
    /// Merge straight away.
    Merge,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(Item),
    Merged(Item),
    Updated(Item),
}

impl SubmitOutcome {
    pub fn item(&self) -> &Item {
        match self {
            SubmitOutcome::Created(i) | SubmitOutcome::Merged(i) | SubmitOutcome::Updated(i) => i,
        }
    }
}

impl From<MergeOutcome> for SubmitOutcome {
    fn from(value: MergeOutcome) -> Self {
        match value {
            MergeOutcome::Created(item) => SubmitOutcome::Created(item),
            MergeOutcome::Merged(item) => SubmitOutcome::Merged(item),
        }
    }
}

/// Result of a mutation that was applied in memory.
///
/// `warning` carries a failed save; the mutation itself still stands and the
/// next successful save catches the stored copy up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed<T> {
    pub value: T,
    pub warning: Option<PersistenceError>,
}

impl<T> Committed<T> {
    pub fn is_persisted(&self) -> bool {
        self.warning.is_none()
    }
}

pub struct InventoryApp<G, C> {
    store: InventoryStore,
    edit: EditSession,
    labels: LabelSelection,
    summary: InventorySummary,
    gateway: G,
    chart: C,
}

impl<G, C> InventoryApp<G, C>
where
    G: PersistenceGateway,
    C: ChartRenderer,
{
    /// Load the saved inventory and draw the initial chart.
    pub fn open(gateway: G, mut chart: C) -> Self {
        let (store, rejected) = InventoryStore::from_items(gateway.load());
        for err in &rejected {
            tracing::warn!("dropping stored item: {err}");
        }

        let summary = summarize(store.items());
        chart.render(&summary.category_totals);
        tracing::info!(items = store.len(), "inventory loaded");

        Self {
            store,
            edit: EditSession::new(),
            labels: LabelSelection::new(),
            summary,
            gateway,
            chart,
        }
    }

    pub fn store(&self) -> &InventoryStore {
        &self.store
    }

    pub fn items(&self) -> &[Item] {
        self.store.items()
    }

    /// Analytics as of the last mutation.
    pub fn summary(&self) -> &InventorySummary {
        &self.summary
    }

    pub fn edit_session(&self) -> &EditSession {
        &self.edit
    }

    pub fn labels(&self) -> &LabelSelection {
        &self.labels
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn chart(&self) -> &C {
        &self.chart
    }

    fn after_mutation(&mut self) -> Option<PersistenceError> {
        let warning = match self.gateway.save(self.store.items()) {
            Ok(()) => None,
            Err(err) => {
                tracing::warn!("inventory kept in memory only, save failed: {err}");
                Some(err)
            }
        };

        self.summary = summarize(self.store.items());
        self.chart.render(&self.summary.category_totals);
        warning
    }

    fn commit<T>(&mut self, value: T) -> Committed<T> {
        let warning = self.after_mutation();
        Committed { value, warning }
    }

    /// Form submit: an edit commit while editing, otherwise add or merge.
    pub fn submit(
        &mut self,
        form: &ItemForm,
        mode: SubmitMode,
    ) -> DomainResult<Committed<SubmitOutcome>> {
        let item = form.validate()?;

        if self.edit.is_editing() {
            return self
                .commit_edit(item)
                .map(|c| Committed {
                    value: SubmitOutcome::Updated(c.value),
                    warning: c.warning,
                });
        }

        match mode {
            SubmitMode::ConfirmMerge => self.add(item).map(|c| Committed {
                value: SubmitOutcome::Created(c.value),
                warning: c.warning,
            }),
            SubmitMode::Merge => self.merge_or_add(item).map(|c| Committed {
                value: c.value.into(),
                warning: c.warning,
            }),
        }
    }

    pub fn add(&mut self, item: Item) -> DomainResult<Committed<Item>> {
        let added = self.store.add(item)?.clone();
        tracing::info!(barcode = %added.barcode(), quantity = added.quantity(), "item added");
        Ok(self.commit(added))
    }

    pub fn merge_or_add(&mut self, item: Item) -> DomainResult<Committed<MergeOutcome>> {
        let outcome = self.store.merge_or_add(item)?;
        let item = outcome.item();
        if outcome.was_merged() {
            tracing::info!(barcode = %item.barcode(), quantity = item.quantity(), "item merged");
        } else {
            tracing::info!(barcode = %item.barcode(), quantity = item.quantity(), "item added");
        }
        Ok(self.commit(outcome))
    }

    /// Scan path for a known barcode: add `quantity` units, keep every other field.
    pub fn restock(&mut self, barcode: &str, quantity: u32) -> DomainResult<Committed<Item>> {
        let existing = self.store.find_by_barcode(barcode).ok_or(DomainError::NotFound)?;
        let incoming = Item::new(
            existing.barcode().clone(),
            existing.name(),
            existing.category(),
            quantity,
            existing.price(),
            existing.reorder_threshold(),
        )?;

        let restocked = self.store.merge_or_add(incoming)?.item().clone();
        tracing::info!(barcode = %restocked.barcode(), quantity = restocked.quantity(), "item restocked");
        Ok(self.commit(restocked))
    }

    /// Enter edit mode; returns the form pre-filled with the current values.
    pub fn begin_edit(&mut self, barcode: &str) -> DomainResult<ItemForm> {
        let item = self.edit.begin_edit(&self.store, barcode)?;
        tracing::debug!(barcode, "editing");
        Ok(ItemForm::from_item(item))
    }

    pub fn commit_edit(&mut self, item: Item) -> DomainResult<Committed<Item>> {
        let identity = self.edit.identity().cloned();
        let updated = self.edit.commit(&mut self.store, item).inspect_err(|err| {
            if *err == DomainError::NotFound {
                tracing::warn!(identity = ?identity, "edit target vanished; edit abandoned");
            }
        })?;

        if let Some(old) = identity.filter(|old| old != updated.barcode()) {
            if self.labels.deselect(&old) {
                self.labels.select(updated.barcode().clone());
            }
        }

        tracing::info!(barcode = %updated.barcode(), "item updated");
        Ok(self.commit(updated))
    }

    pub fn cancel_edit(&mut self) -> Option<Barcode> {
        self.edit.cancel()
    }

    pub fn delete(&mut self, barcode: &str) -> DomainResult<Committed<Item>> {
        let removed = self.store.delete(barcode)?;
        self.labels.retain_existing(&self.store);
        tracing::info!(barcode, "item deleted");
        Ok(self.commit(removed))
    }

    /// Remove every item; returns how many were removed.
    pub fn clear(&mut self) -> Committed<usize> {
        let removed = self.store.clear();
        self.labels.clear();
        tracing::info!(removed, "inventory cleared");
        self.commit(removed)
    }

    pub fn search(&self, query: &str) -> Vec<Item> {
        self.store.search(query)
    }

    pub fn low_stock(&self) -> Vec<Item> {
        self.store.low_stock()
    }

    pub fn export_csv(&self) -> String {
        csv::export_csv(self.store.items())
    }

    /// Merge a CSV document into the inventory.
    ///
    /// Persists and re-renders only if at least one line was applied.
    pub fn import_csv(&mut self, text: &str) -> Committed<ImportReport> {
        let report = csv::import_csv(&mut self.store, text);

        for skipped in &report.skipped {
            tracing::debug!(line = skipped.line_number, "skipped import line: {}", skipped.error);
        }
        tracing::info!(
            imported = report.imported,
            created = report.created,
            merged = report.merged,
            skipped = report.skipped_count(),
            "csv import finished"
        );

        if report.changed_store() {
            self.commit(report)
        } else {
            Committed {
                value: report,
                warning: None,
            }
        }
    }

    /// Flip label selection for an existing item.
    pub fn toggle_label(&mut self, barcode: &str) -> DomainResult<bool> {
        let item = self.store.find_by_barcode(barcode).ok_or(DomainError::NotFound)?;
        Ok(self.labels.toggle(item.barcode().clone()))
    }

    /// Render labels for the selected items, in store order.
    pub fn label_sheet(&self, renderer: &impl BarcodeRenderer) -> DomainResult<Vec<String>> {
        let items = self.labels.items(&self.store)?;
        Ok(items
            .into_iter()
            .map(|item| format!("{}\n{}", renderer.render(item.barcode()), item.name()))
            .collect())
    }

    pub fn theme(&self) -> Theme {
        self.gateway
            .load_preference(THEME_KEY)
            .and_then(|raw| match raw.parse::<Theme>() {
                Ok(theme) => Some(theme),
                Err(err) => {
                    tracing::warn!("ignoring stored theme: {err}");
                    None
                }
            })
            .unwrap_or_default()
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<Theme, PersistenceError> {
        self.gateway.save_preference(THEME_KEY, theme.as_str())?;
        tracing::info!(theme = theme.as_str(), "theme changed");
        Ok(theme)
    }

    pub fn toggle_theme(&mut self) -> Result<Theme, PersistenceError> {
        let next = self.theme().toggled();
        self.set_theme(next)
    }
}
