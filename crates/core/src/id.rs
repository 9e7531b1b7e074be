//! Strongly-typed identifiers used across the domain.
//!
//! Ids are assigned by the store (database serials), so they wrap a plain
//! `i64` rather than a generated value.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a product.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(i64);

/// Identifier of a stock movement. Ordering matches insertion order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovementId(i64);

macro_rules! impl_serial_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Wrap a store-assigned serial value.
            pub fn new(value: i64) -> Self {
                Self(value)
            }

            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            /// Parses a non-negative decimal id.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .parse::<i64>()
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                if value < 0 {
                    return Err(DomainError::invalid_id(format!(
                        "{}: must be greater than or equal to zero",
                        $name
                    )));
                }
                Ok(Self(value))
            }
        }
    };
}

impl_serial_newtype!(ProductId, "ProductId");
impl_serial_newtype!(MovementId, "MovementId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_non_negative_ids() {
        assert_eq!("0".parse::<ProductId>().unwrap(), ProductId::new(0));
        assert_eq!("42".parse::<MovementId>().unwrap().get(), 42);
    }

    #[test]
    fn rejects_negative_and_malformed_ids() {
        assert!(matches!("-1".parse::<ProductId>(), Err(DomainError::InvalidId(_))));
        assert!(matches!("abc".parse::<ProductId>(), Err(DomainError::InvalidId(_))));
        assert!(matches!("".parse::<MovementId>(), Err(DomainError::InvalidId(_))));
    }

    #[test]
    fn ids_order_by_value() {
        assert!(MovementId::new(1) < MovementId::new(2));
    }
}
