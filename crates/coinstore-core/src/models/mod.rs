use std::fmt::{self, Display};

use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use time::Date;

use crate::storage::ValidationError;

pub mod asset;
pub mod quote;

/// A typed scalar attribute value. Index buckets are keyed by this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldValue {
    String(String),
    Decimal(Decimal),
    Date(Date),
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => f.write_str(s),
            FieldValue::Decimal(d) => write!(f, "{}", d),
            FieldValue::Date(d) => write!(f, "{}", d),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        FieldValue::Decimal(value)
    }
}

impl From<Date> for FieldValue {
    fn from(value: Date) -> Self {
        FieldValue::Date(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// How a record type obtains its identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdPolicy {
    /// The store assigns a fresh opaque identifier on first save.
    Generated,
    /// An attribute of the record doubles as its identifier.
    Natural,
}

/// A storable record type.
///
/// Table layout (identifier field, identifier policy and indexed fields) is
/// declared at compile time, so stores resolve queries without reflection.
pub trait Record: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    const TABLE: &'static str;
    const ID_FIELD: &'static str;
    const ID_POLICY: IdPolicy;
    const INDEXES: &'static [&'static str];

    /// Current identifier, `None` for a generated-id record not saved yet.
    fn id(&self) -> Option<RecordId>;

    /// Only called for `IdPolicy::Generated` types.
    fn assign_id(&mut self, _id: RecordId) {}

    fn field(&self, name: &str) -> Option<FieldValue>;

    fn validate(&self) -> Result<(), ValidationError>;

    fn is_indexed(field: &str) -> bool {
        Self::INDEXES.contains(&field)
    }
}

pub(crate) fn require(table: &'static str, field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField { table, field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use time::macros::date;

    use super::*;

    #[test]
    fn field_values_hash_by_value() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(FieldValue::from(dec!(10.50)));
        assert!(set.contains(&FieldValue::from(dec!(10.5))));
        set.insert(FieldValue::from("ETH"));
        assert!(set.contains(&FieldValue::String("ETH".to_string())));
    }

    #[test]
    fn field_value_display() {
        assert_eq!(FieldValue::from(date!(2021 - 03 - 01)).to_string(), "2021-03-01");
        assert_eq!(FieldValue::from(dec!(9816.25)).to_string(), "9816.25");
        assert_eq!(FieldValue::from("BTC").to_string(), "BTC");
    }

    #[test]
    fn require_rejects_blank() {
        assert!(require("quote", "code", "  ").is_err());
        assert!(require("quote", "code", "ETH").is_ok());
    }
}
