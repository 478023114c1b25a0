//! Selection of items to print barcode labels for.

use std::collections::HashSet;

use stockscan_core::{Barcode, DomainError, DomainResult};

use crate::item::Item;
use crate::store::InventoryStore;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSelection {
    selected: HashSet<Barcode>,
}

impl LabelSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, barcode: Barcode) {
        self.selected.insert(barcode);
    }

    pub fn deselect(&mut self, barcode: &Barcode) -> bool {
        self.selected.remove(barcode)
    }

    /// Flip selection; returns whether the barcode is now selected.
    pub fn toggle(&mut self, barcode: Barcode) -> bool {
        if self.selected.remove(&barcode) {
            false
        } else {
            self.selected.insert(barcode);
            true
        }
    }

    pub fn is_selected(&self, barcode: &Barcode) -> bool {
        self.selected.contains(barcode)
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Drop barcodes that no longer exist in the store.
    pub fn retain_existing(&mut self, store: &InventoryStore) {
        self.selected.retain(|code| store.contains(code.as_str()));
    }

    /// Selected items in store order.
    pub fn items<'s>(&self, store: &'s InventoryStore) -> DomainResult<Vec<&'s Item>> {
        if self.selected.is_empty() {
            return Err(DomainError::validation("no labels selected"));
        }
        Ok(store
            .iter()
            .filter(|item| self.selected.contains(item.barcode()))
            .collect())
    }
}
