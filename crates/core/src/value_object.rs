//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity**; they are defined entirely by their
//! attribute values. Two value objects with the same values are equal.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new one.
///
/// ## Value Object vs Entity
///
/// - **Value Object**: `Price { cents: 430 }` equals any other `Price { cents: 430 }`
/// - **Entity**: `Product { id: 7, .. }` is product 7 whatever its name or price
///
/// Constructors of value objects are the place to enforce their validity, so
/// that holding one is proof the value is well-formed.
///
/// ```ignore
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// struct Price { cents: i64 }
///
/// impl ValueObject for Price {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
