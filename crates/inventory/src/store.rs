//! Ordered, barcode-unique item collection.

use stockscan_core::{Barcode, DomainError, DomainResult};

use crate::item::Item;

/// Result of [`InventoryStore::merge_or_add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// No item had this barcode; the incoming item was appended.
    Created(Item),
    /// An existing item absorbed the incoming one.
    Merged(Item),
}

impl MergeOutcome {
    pub fn item(&self) -> &Item {
        match self {
            MergeOutcome::Created(item) | MergeOutcome::Merged(item) => item,
        }
    }

    pub fn was_merged(&self) -> bool {
        matches!(self, MergeOutcome::Merged(_))
    }
}

/// In-memory inventory.
///
/// Insertion order is preserved and never changed by updates, so iteration
/// order is stable. Every mutating method either succeeds completely or leaves
/// the store untouched; no two items ever share a barcode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryStore {
    items: Vec<Item>,
}

impl InventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from persisted items.
    ///
    /// Items failing validation, and later duplicates of a barcode, are dropped
    /// and reported back so the caller can log them.
    pub fn from_items(items: impl IntoIterator<Item = Item>) -> (Self, Vec<DomainError>) {
        let mut store = Self::new();
        let mut rejected = Vec::new();

        for item in items {
            let result = item.validate().and_then(|()| store.add(item).map(|_| ()));
            if let Err(err) = result {
                rejected.push(err);
            }
        }

        (store, rejected)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position(&self, barcode: &str) -> Option<usize> {
        self.items.iter().position(|i| i.barcode().as_str() == barcode)
    }

    /// Exact barcode lookup.
    pub fn find_by_barcode(&self, barcode: &str) -> Option<&Item> {
        self.position(barcode).map(|idx| &self.items[idx])
    }

    pub fn contains(&self, barcode: &str) -> bool {
        self.position(barcode).is_some()
    }

    /// Append a new item; rejects an existing barcode outright.
    pub fn add(&mut self, item: Item) -> DomainResult<&Item> {
        if self.contains(item.barcode().as_str()) {
            return Err(DomainError::duplicate(item.barcode().as_str()));
        }
        self.items.push(item);
        let idx = self.items.len() - 1;
        Ok(&self.items[idx])
    }

    /// Scan path: merge into an existing barcode or append.
    pub fn merge_or_add(&mut self, item: Item) -> DomainResult<MergeOutcome> {
        match self.position(item.barcode().as_str()) {
            Some(idx) => {
                let existing = &mut self.items[idx];
                existing.absorb(&item)?;
                Ok(MergeOutcome::Merged(existing.clone()))
            }
            None => {
                let created = item.clone();
                self.items.push(item);
                Ok(MergeOutcome::Created(created))
            }
        }
    }

    /// Replace the item currently keyed by `identity` wholesale.
    ///
    /// The replacement may carry a different barcode, as long as no other item
    /// owns it. The item keeps its position.
    pub fn update_at(&mut self, identity: &str, new_item: Item) -> DomainResult<&Item> {
        let idx = self.position(identity).ok_or(DomainError::NotFound)?;

        let new_code = new_item.barcode().as_str();
        if new_code != identity && self.contains(new_code) {
            return Err(DomainError::duplicate(new_code));
        }

        self.items[idx] = new_item;
        Ok(&self.items[idx])
    }

    pub fn delete(&mut self, barcode: &str) -> DomainResult<Item> {
        let idx = self.position(barcode).ok_or(DomainError::NotFound)?;
        Ok(self.items.remove(idx))
    }

    /// Remove everything; returns how many items were dropped.
    pub fn clear(&mut self) -> usize {
        let removed = self.items.len();
        self.items.clear();
        removed
    }

    /// Case-insensitive substring match on name or barcode.
    ///
    /// An empty query matches every item.
    pub fn search(&self, query: &str) -> Vec<Item> {
        let needle = query.to_lowercase();
        self.items
            .iter()
            .filter(|item| {
                item.name().to_lowercase().contains(&needle)
                    || item.barcode().as_str().to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    /// Items at or below their reorder threshold, in store order.
    pub fn low_stock(&self) -> Vec<Item> {
        self.items.iter().filter(|i| i.is_low_stock()).cloned().collect()
    }

    /// Barcodes in store order.
    pub fn barcodes(&self) -> Vec<Barcode> {
        self.items.iter().map(|i| i.barcode().clone()).collect()
    }
}

impl<'a> IntoIterator for &'a InventoryStore {
    type Item = &'a Item;
    type IntoIter = core::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn item(code: &str, name: &str, qty: u32, price_cents: i64) -> Item {
        Item::new(
            Barcode::parse(code).unwrap(),
            name,
            "General",
            qty,
            Decimal::new(price_cents, 2),
            2,
        )
        .unwrap()
    }

    #[test]
    fn add_appends_in_insertion_order() {
        let mut store = InventoryStore::new();
        store.add(item("b", "Bolt", 1, 10)).unwrap();
        store.add(item("a", "Anchor", 1, 10)).unwrap();

        let codes: Vec<_> = store.iter().map(|i| i.barcode().as_str()).collect();
        assert_eq!(codes, vec!["b", "a"]);
    }

    #[test]
    fn add_rejects_duplicate_barcode() {
        let mut store = InventoryStore::new();
        store.add(item("001", "Nut", 1, 5)).unwrap();

        let err = store.add(item("001", "Other", 9, 5)).unwrap_err();

        assert_eq!(err, DomainError::DuplicateBarcode("001".to_string()));
        assert_eq!(store.len(), 1);
        assert_eq!(store.find_by_barcode("001").unwrap().name(), "Nut");
    }

    #[test]
    fn merge_or_add_creates_when_absent() {
        let mut store = InventoryStore::new();
        let outcome = store.merge_or_add(item("001", "Nut", 4, 5)).unwrap();

        assert!(!outcome.was_merged());
        assert_eq!(outcome.item().quantity(), 4);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn merge_or_add_sums_quantity_and_takes_latest_fields() {
        let mut store = InventoryStore::new();
        store.add(item("001", "Nut", 4, 5)).unwrap();
        store.add(item("002", "Washer", 7, 2)).unwrap();

        let outcome = store.merge_or_add(item("001", "Hex Nut", 6, 8)).unwrap();

        assert!(outcome.was_merged());
        let merged = store.find_by_barcode("001").unwrap();
        assert_eq!(merged.quantity(), 10);
        assert_eq!(merged.name(), "Hex Nut");
        assert_eq!(merged.price(), Decimal::new(8, 2));
        assert_eq!(store.find_by_barcode("002").unwrap().quantity(), 7);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn merge_past_the_quantity_limit_leaves_store_untouched() {
        let mut store = InventoryStore::new();
        store.add(item("001", "Nut", u32::MAX - 1, 5)).unwrap();

        let err = store.merge_or_add(item("001", "Hex Nut", 2, 8)).unwrap_err();

        assert!(matches!(err, DomainError::InvalidField { field: "quantity", .. }));
        let kept = store.find_by_barcode("001").unwrap();
        assert_eq!(kept.quantity(), u32::MAX - 1);
        assert_eq!(kept.name(), "Nut");
    }

    #[test]
    fn find_is_exact_match() {
        let mut store = InventoryStore::new();
        store.add(item("ABC", "Thing", 1, 1)).unwrap();

        assert!(store.find_by_barcode("ABC").is_some());
        assert!(store.find_by_barcode("abc").is_none());
        assert!(store.find_by_barcode("AB").is_none());
    }

    #[test]
    fn update_at_replaces_in_place_including_barcode() {
        let mut store = InventoryStore::new();
        store.add(item("1", "One", 1, 1)).unwrap();
        store.add(item("2", "Two", 2, 2)).unwrap();
        store.add(item("3", "Three", 3, 3)).unwrap();

        store.update_at("2", item("22", "Twenty-two", 22, 22)).unwrap();

        let codes: Vec<_> = store.iter().map(|i| i.barcode().as_str()).collect();
        assert_eq!(codes, vec!["1", "22", "3"]);
        assert!(store.find_by_barcode("2").is_none());
        assert_eq!(store.find_by_barcode("22").unwrap().quantity(), 22);
    }

    #[test]
    fn update_at_missing_identity_is_not_found() {
        let mut store = InventoryStore::new();
        store.add(item("1", "One", 1, 1)).unwrap();

        let err = store.update_at("9", item("9", "Nine", 9, 9)).unwrap_err();
        assert_eq!(err, DomainError::NotFound);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn update_at_cannot_steal_another_barcode() {
        let mut store = InventoryStore::new();
        store.add(item("1", "One", 1, 1)).unwrap();
        store.add(item("2", "Two", 2, 2)).unwrap();

        let err = store.update_at("1", item("2", "Clash", 5, 5)).unwrap_err();

        assert_eq!(err, DomainError::DuplicateBarcode("2".to_string()));
        assert_eq!(store.find_by_barcode("1").unwrap().name(), "One");
        assert_eq!(store.find_by_barcode("2").unwrap().name(), "Two");
    }

    #[test]
    fn delete_missing_barcode_leaves_store_unchanged() {
        let mut store = InventoryStore::new();
        store.add(item("1", "One", 1, 1)).unwrap();

        assert_eq!(store.delete("nope").unwrap_err(), DomainError::NotFound);
        assert_eq!(store.len(), 1);

        let removed = store.delete("1").unwrap();
        assert_eq!(removed.name(), "One");
        assert!(store.is_empty());
    }

    #[test]
    fn clear_empties_and_reports_count() {
        let mut store = InventoryStore::new();
        store.add(item("1", "One", 1, 1)).unwrap();
        store.add(item("2", "Two", 1, 1)).unwrap();

        assert_eq!(store.clear(), 2);
        assert!(store.is_empty());
        assert_eq!(store.clear(), 0);
    }

    #[test]
    fn search_matches_name_or_barcode_case_insensitively() {
        let mut store = InventoryStore::new();
        store.add(item("000", "ABCWidget", 1, 1)).unwrap();
        store.add(item("xyz", "Unrelated", 1, 1)).unwrap();
        store.add(item("abc123", "Other", 1, 1)).unwrap();

        let hits = store.search("abc");

        let codes: Vec<_> = hits.iter().map(|i| i.barcode().as_str()).collect();
        assert_eq!(codes, vec!["000", "abc123"]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn search_with_empty_query_returns_everything() {
        let mut store = InventoryStore::new();
        store.add(item("1", "One", 1, 1)).unwrap();
        store.add(item("2", "Two", 1, 1)).unwrap();
        assert_eq!(store.search("").len(), 2);
    }

    #[test]
    fn low_stock_lists_items_at_or_below_threshold() {
        let mut store = InventoryStore::new();
        store.add(item("1", "Low", 2, 1)).unwrap();
        store.add(item("2", "Fine", 3, 1)).unwrap();
        store.add(item("3", "Empty", 0, 1)).unwrap();

        let codes: Vec<_> = store
            .low_stock()
            .into_iter()
            .map(|i| i.barcode().to_string())
            .collect();
        assert_eq!(codes, vec!["1", "3"]);
    }

    #[test]
    fn from_items_drops_later_duplicates() {
        let (store, rejected) = InventoryStore::from_items(vec![
            item("1", "First", 1, 1),
            item("2", "Second", 1, 1),
            item("1", "Again", 9, 9),
        ]);

        assert_eq!(store.len(), 2);
        assert_eq!(store.find_by_barcode("1").unwrap().name(), "First");
        assert_eq!(rejected, vec![DomainError::DuplicateBarcode("1".to_string())]);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;
        use std::collections::HashSet;

        #[derive(Debug, Clone)]
        enum Op {
            Add(String, u32),
            Merge(String, u32),
        }

        fn op() -> impl Strategy<Value = Op> {
            let code = "[a-d]{1,2}";
            prop_oneof![
                (code, 0u32..1000).prop_map(|(c, q)| Op::Add(c, q)),
                (code, 0u32..1000).prop_map(|(c, q)| Op::Merge(c, q)),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: no sequence of add/merge produces duplicate barcodes.
            #[test]
            fn barcodes_stay_unique(ops in proptest::collection::vec(op(), 0..60)) {
                let mut store = InventoryStore::new();
                for op in ops {
                    match op {
                        Op::Add(code, qty) => { let _ = store.add(item(&code, "x", qty, 1)); }
                        Op::Merge(code, qty) => { store.merge_or_add(item(&code, "x", qty, 1)).unwrap(); }
                    }
                }

                let unique: HashSet<_> = store.iter().map(|i| i.barcode().clone()).collect();
                prop_assert_eq!(unique.len(), store.len());
            }

            /// Property: merging adds exactly the incoming quantity to the target only.
            #[test]
            fn merge_adds_exactly_incoming_quantity(
                quantities in proptest::collection::vec(0u32..10_000, 1..8),
                target in 0usize..8,
                incoming in 0u32..10_000,
            ) {
                let mut store = InventoryStore::new();
                for (idx, qty) in quantities.iter().enumerate() {
                    store.add(item(&format!("c{idx}"), "x", *qty, 1)).unwrap();
                }
                let target = target % quantities.len();
                let before: Vec<u32> = store.iter().map(|i| i.quantity()).collect();

                store.merge_or_add(item(&format!("c{target}"), "y", incoming, 1)).unwrap();

                for (idx, current) in store.iter().enumerate() {
                    if idx == target {
                        prop_assert_eq!(current.quantity(), before[idx] + incoming);
                    } else {
                        prop_assert_eq!(current.quantity(), before[idx]);
                    }
                }
                prop_assert_eq!(store.len(), quantities.len());
            }
        }
    }
}
