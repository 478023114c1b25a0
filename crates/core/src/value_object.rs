//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have **no identity**: two values with the same attributes are
/// interchangeable. In this workspace that covers derived data such as
/// analytics summaries and per-category totals, which are recomputed from the
/// store after every mutation and never updated in place.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq)]
/// struct CategoryTotal {
///     category: String,
///     quantity: u64,
/// }
///
/// impl ValueObject for CategoryTotal {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
