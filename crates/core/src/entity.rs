//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Products and movements are entities: two records with equal attributes but
/// different ids are different records.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}
