//! Strongly-typed names used across the domain.
//!
//! Names are free text typed by staff. They are stored verbatim and compared
//! case-sensitively; the only rule is that they are not blank.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Garment type, e.g. "Jacket".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GarmentType(String);

/// Garment size, e.g. "M" or "42".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Size(String);

/// Name of the worker an item is issued to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WorkerName(String);

macro_rules! impl_name_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Validate and wrap a name. Blank input is rejected.
            pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(DomainError::validation(concat!($name, " cannot be empty")));
                }
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl core::borrow::Borrow<str> for $t {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $t {
            type Error = DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

impl_name_newtype!(GarmentType, "type");
impl_name_newtype!(Size, "size");
impl_name_newtype!(WorkerName, "worker");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_names_are_rejected() {
        assert_eq!(
            GarmentType::new("").unwrap_err(),
            DomainError::validation("type cannot be empty")
        );
        assert_eq!(
            Size::new("   ").unwrap_err(),
            DomainError::validation("size cannot be empty")
        );
        assert_eq!(
            "\t".parse::<WorkerName>().unwrap_err(),
            DomainError::validation("worker cannot be empty")
        );
    }

    #[test]
    fn names_are_kept_verbatim_and_case_sensitive() {
        let a = GarmentType::new("Jacket").unwrap();
        let b = GarmentType::new("jacket").unwrap();
        assert_ne!(a, b);
        assert_eq!(WorkerName::new(" Anna ").unwrap().as_str(), " Anna ");
    }

    #[test]
    fn serde_validates_on_the_way_in() {
        let ok: GarmentType = serde_json::from_str("\"Boots\"").unwrap();
        assert_eq!(ok.as_str(), "Boots");
        assert!(serde_json::from_str::<Size>("\"\"").is_err());
        assert_eq!(serde_json::to_string(&ok).unwrap(), "\"Boots\"");
    }
}
