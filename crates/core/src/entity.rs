//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Owned inventory records are entities: two records with the same handle are the
/// same creature even if their combat power or favorite flag changed between reads.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
