//! Postal address entity attached to an employee.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Kind of address on file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AddressKind {
    Home,
    Mailing,
    Work,
    Temporary,
}

impl AddressKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressKind::Home => "HOME",
            AddressKind::Mailing => "MAILING",
            AddressKind::Work => "WORK",
            AddressKind::Temporary => "TEMPORARY",
        }
    }
}

impl fmt::Display for AddressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AddressKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HOME" => Ok(AddressKind::Home),
            "MAILING" => Ok(AddressKind::Mailing),
            "WORK" => Ok(AddressKind::Work),
            "TEMPORARY" => Ok(AddressKind::Temporary),
            other => Err(format!("unknown address kind '{other}'")),
        }
    }
}

/// A stored address row.
#[derive(Debug, Clone)]
pub struct Address {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub kind: AddressKind,
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Address {
    /// Human-readable single-line rendering, used in list responses.
    ///
    /// Joins the non-empty parts with ", "; an address with no parts renders
    /// as an empty string.
    pub fn full_address(&self) -> String {
        [&self.street, &self.city, &self.postal_code, &self.country]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Input data for creating an address alongside an employee.
#[derive(Debug, Clone)]
pub struct NewAddress {
    pub kind: AddressKind,
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(street: Option<&str>, city: Option<&str>) -> Address {
        Address {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            kind: AddressKind::Home,
            street: street.map(String::from),
            city: city.map(String::from),
            postal_code: None,
            country: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_full_address_joins_parts() {
        let a = address(Some("Main St 1"), Some("Springfield"));
        assert_eq!(a.full_address(), "Main St 1, Springfield");
    }

    #[test]
    fn test_full_address_skips_missing_parts() {
        let a = address(None, Some("Springfield"));
        assert_eq!(a.full_address(), "Springfield");

        let empty = address(None, None);
        assert_eq!(empty.full_address(), "");
    }

    #[test]
    fn test_kind_round_trip() {
        assert_eq!("HOME".parse::<AddressKind>().unwrap(), AddressKind::Home);
        assert_eq!(
            "mailing".parse::<AddressKind>().unwrap(),
            AddressKind::Mailing
        );
        assert!("CASTLE".parse::<AddressKind>().is_err());
    }
}
