//! Derived inventory figures.
//!
//! Everything here is a pure function of the current items; nothing is cached
//! or persisted. Callers recompute after every mutation.

use rust_decimal::Decimal;
use serde::Serialize;

use stockscan_core::ValueObject;

use crate::item::Item;

/// Summed quantity per category, in first-seen category order.
///
/// Order is stable so chart legends do not reshuffle between renders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryTotals {
    entries: Vec<(String, u64)>,
}

impl ValueObject for CategoryTotals {}

impl CategoryTotals {
    fn add(&mut self, category: &str, quantity: u32) {
        match self.entries.iter_mut().find(|(c, _)| c == category) {
            Some((_, total)) => *total += u64::from(quantity),
            None => self.entries.push((category.to_string(), u64::from(quantity))),
        }
    }

    pub fn get(&self, category: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(c, _)| c == category)
            .map(|(_, total)| *total)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(c, t)| (c.as_str(), *t))
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|(c, _)| c.as_str()).collect()
    }

    pub fn values(&self) -> Vec<u64> {
        self.entries.iter().map(|(_, t)| *t).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Snapshot handed to renderers after each mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InventorySummary {
    pub total_items: usize,
    pub total_quantity: u64,
    pub total_value: Decimal,
    pub low_stock_items: usize,
    pub category_totals: CategoryTotals,
}

impl ValueObject for InventorySummary {}

/// Σ price × quantity. Zero for no items; saturates at `Decimal::MAX`.
pub fn total_value(items: &[Item]) -> Decimal {
    items
        .iter()
        .map(Item::value)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

pub fn category_totals(items: &[Item]) -> CategoryTotals {
    let mut totals = CategoryTotals::default();
    for item in items {
        totals.add(item.category(), item.quantity());
    }
    totals
}

pub fn summarize(items: &[Item]) -> InventorySummary {
    InventorySummary {
        total_items: items.len(),
        total_quantity: items.iter().map(|i| u64::from(i.quantity())).sum(),
        total_value: total_value(items),
        low_stock_items: items.iter().filter(|i| i.is_low_stock()).count(),
        category_totals: category_totals(items),
    }
}
