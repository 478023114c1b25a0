//! Single in-progress edit, tracked by barcode identity.

use stockscan_core::{Barcode, DomainError, DomainResult};

use crate::item::Item;
use crate::store::InventoryStore;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditState {
    #[default]
    Idle,
    /// Barcode of the edited item as it was when editing began.
    Editing(Barcode),
}

/// Edit-mode state machine.
///
/// The target is resolved by the barcode captured at `begin_edit`, so a
/// barcode change typed into the form, or other items being deleted in the
/// meantime, never redirect the commit to the wrong item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditSession {
    state: EditState,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditState::Editing(_))
    }

    pub fn identity(&self) -> Option<&Barcode> {
        match &self.state {
            EditState::Idle => None,
            EditState::Editing(code) => Some(code),
        }
    }

    /// Start editing `barcode`, replacing any edit already in progress.
    ///
    /// On `NotFound` the current state is left as it was.
    pub fn begin_edit<'s>(
        &mut self,
        store: &'s InventoryStore,
        barcode: &str,
    ) -> DomainResult<&'s Item> {
        let item = store.find_by_barcode(barcode).ok_or(DomainError::NotFound)?;
        self.state = EditState::Editing(item.barcode().clone());
        Ok(item)
    }

    /// Write `new_item` over the edit target.
    ///
    /// - success: back to `Idle`
    /// - `NotFound` (target deleted meanwhile): back to `Idle`, error returned
    /// - `DuplicateBarcode`: stays `Editing` so the barcode can be corrected
    pub fn commit(&mut self, store: &mut InventoryStore, new_item: Item) -> DomainResult<Item> {
        let identity = match &self.state {
            EditState::Idle => return Err(DomainError::NotFound),
            EditState::Editing(code) => code.clone(),
        };

        match store.update_at(identity.as_str(), new_item) {
            Ok(updated) => {
                let updated = updated.clone();
                self.state = EditState::Idle;
                Ok(updated)
            }
            Err(DomainError::NotFound) => {
                self.state = EditState::Idle;
                Err(DomainError::NotFound)
            }
            Err(other) => Err(other),
        }
    }

    /// Abandon the edit; returns the identity that was being edited.
    pub fn cancel(&mut self) -> Option<Barcode> {
        match core::mem::take(&mut self.state) {
            EditState::Idle => None,
            EditState::Editing(code) => Some(code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn item(code: &str, name: &str, qty: u32) -> Item {
        Item::new(Barcode::parse(code).unwrap(), name, "Tools", qty, Decimal::ONE, 1).unwrap()
    }

    fn store() -> InventoryStore {
        let mut store = InventoryStore::new();
        store.add(item("100", "Hammer", 3)).unwrap();
        store.add(item("200", "Saw", 1)).unwrap();
        store
    }

    #[test]
    fn begin_edit_captures_identity() {
        let store = store();
        let mut session = EditSession::new();

        let target = session.begin_edit(&store, "200").unwrap();

        assert_eq!(target.name(), "Saw");
        assert_eq!(session.identity().unwrap().as_str(), "200");
        assert!(session.is_editing());
    }

    #[test]
    fn begin_edit_on_missing_item_keeps_state() {
        let store = store();
        let mut session = EditSession::new();

        assert_eq!(session.begin_edit(&store, "999").unwrap_err(), DomainError::NotFound);
        assert_eq!(session.state(), &EditState::Idle);

        session.begin_edit(&store, "100").unwrap();
        assert!(session.begin_edit(&store, "999").is_err());
        assert_eq!(session.identity().unwrap().as_str(), "100");
    }

    #[test]
    fn begin_edit_while_editing_switches_target() {
        let store = store();
        let mut session = EditSession::new();

        session.begin_edit(&store, "100").unwrap();
        session.begin_edit(&store, "200").unwrap();

        assert_eq!(session.identity().unwrap().as_str(), "200");
    }

    #[test]
    fn commit_updates_target_and_returns_to_idle() {
        let mut store = store();
        let mut session = EditSession::new();
        session.begin_edit(&store, "100").unwrap();

        let updated = session.commit(&mut store, item("101", "Claw Hammer", 4)).unwrap();

        assert_eq!(updated.barcode().as_str(), "101");
        assert_eq!(store.items()[0].name(), "Claw Hammer");
        assert!(store.find_by_barcode("100").is_none());
        assert!(!session.is_editing());
    }

    #[test]
    fn commit_after_target_deleted_is_not_found_and_idle() {
        let mut store = store();
        let mut session = EditSession::new();
        session.begin_edit(&store, "100").unwrap();

        store.delete("100").unwrap();
        let err = session.commit(&mut store, item("100", "Hammer", 9)).unwrap_err();

        assert_eq!(err, DomainError::NotFound);
        assert_eq!(session.state(), &EditState::Idle);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn commit_with_clashing_barcode_stays_editing() {
        let mut store = store();
        let mut session = EditSession::new();
        session.begin_edit(&store, "100").unwrap();

        let err = session.commit(&mut store, item("200", "Hammer", 3)).unwrap_err();

        assert_eq!(err, DomainError::DuplicateBarcode("200".to_string()));
        assert_eq!(session.identity().unwrap().as_str(), "100");
        assert_eq!(store.find_by_barcode("200").unwrap().name(), "Saw");
    }

    #[test]
    fn commit_while_idle_is_not_found() {
        let mut store = store();
        let mut session = EditSession::new();

        let err = session.commit(&mut store, item("100", "Hammer", 9)).unwrap_err();

        assert_eq!(err, DomainError::NotFound);
        assert_eq!(store.find_by_barcode("100").unwrap().quantity(), 3);
    }

    #[test]
    fn cancel_discards_without_touching_store() {
        let store_before = store();
        let store_after = store_before.clone();
        let mut session = EditSession::new();
        session.begin_edit(&store_before, "200").unwrap();

        assert_eq!(session.cancel().unwrap().as_str(), "200");
        assert_eq!(session.cancel(), None);
        assert_eq!(store_before, store_after);
    }
}
