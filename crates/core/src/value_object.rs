//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity** - they are defined entirely by their attribute
//! values. A `Coordinate` or a retention policy is a value object; an owned creature
//! (identified by its `ItemId`) is an entity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new one.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq)]
/// struct Threshold(u32);
///
/// impl ValueObject for Threshold {}
///
/// assert_eq!(Threshold(150), Threshold(150));
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
