//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Inventory records are entities keyed by their barcode: two records with the
/// same barcode describe the same physical product, whatever their other fields.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// Whether `other` refers to the same entity.
    fn same_identity(&self, other: &Self) -> bool
    where
        Self: Sized,
    {
        self.id() == other.id()
    }
}
