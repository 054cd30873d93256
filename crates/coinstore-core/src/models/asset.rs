use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use time::Date;

use super::{require, FieldValue, IdPolicy, Record, RecordId};
use crate::storage::ValidationError;

/// A crypto currency catalogue entry. `code` is the natural key, so saving
/// two assets with the same code keeps only the latest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptoAsset {
    pub code: String,
    pub name: String,
    pub description: String,
    pub creation_date: Date,
}

impl CryptoAsset {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        creation_date: Date,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            description: description.into(),
            creation_date,
        }
    }
}

impl Record for CryptoAsset {
    const TABLE: &'static str = "crypto_asset";
    const ID_FIELD: &'static str = "code";
    const ID_POLICY: IdPolicy = IdPolicy::Natural;
    const INDEXES: &'static [&'static str] = &["name"];

    fn id(&self) -> Option<RecordId> {
        if self.code.trim().is_empty() {
            None
        } else {
            Some(RecordId::from(self.code.as_str()))
        }
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "code" => Some(FieldValue::String(self.code.clone())),
            "name" => Some(FieldValue::String(self.name.clone())),
            "description" => Some(FieldValue::String(self.description.clone())),
            "creation_date" => Some(FieldValue::Date(self.creation_date)),
            _ => None,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(Self::TABLE, "code", &self.code)?;
        require(Self::TABLE, "name", &self.name)?;
        Ok(())
    }
}

impl Display for CryptoAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CryptoAsset[code={}, name={}, creation_date={}]",
            self.code, self.name, self.creation_date
        )
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    #[test]
    fn code_is_the_identifier() {
        let asset = CryptoAsset::new("ADA_TESTE", "Cardano", "", date!(2017 - 10 - 02));
        assert_eq!(asset.id(), Some(RecordId::from("ADA_TESTE")));
        assert_eq!(asset.field(CryptoAsset::ID_FIELD), Some(FieldValue::from("ADA_TESTE")));
    }

    #[test]
    fn blank_code_has_no_identifier() {
        let asset = CryptoAsset::new("", "Cardano", "", date!(2017 - 10 - 02));
        assert_eq!(asset.id(), None);
        assert_eq!(
            asset.validate(),
            Err(ValidationError::MissingField { table: "crypto_asset", field: "code" })
        );
    }

    #[test]
    fn name_is_required_description_is_not() {
        let asset = CryptoAsset::new("LINK_TESTE", "", "", date!(2017 - 09 - 21));
        assert_eq!(
            asset.validate(),
            Err(ValidationError::MissingField { table: "crypto_asset", field: "name" })
        );

        let asset = CryptoAsset::new("LINK_TESTE", "Chainlink", "", date!(2017 - 09 - 21));
        assert!(asset.validate().is_ok());
    }

    #[test]
    fn only_name_is_indexed() {
        assert!(CryptoAsset::is_indexed("name"));
        assert!(!CryptoAsset::is_indexed("description"));
    }
}
