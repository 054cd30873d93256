use std::{fmt::{self, Display}, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use super::{require, FieldValue, IdPolicy, Record, RecordId};
use crate::storage::ValidationError;

/// Currency a quotation is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Currency {
    Brl,
    Usd,
    Eur,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Brl => "BRL",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }

    /// The value stored in a quote's `currency` attribute.
    pub fn description(&self) -> &'static str {
        match self {
            Currency::Brl => "Real",
            Currency::Usd => "Dólar americano",
            Currency::Eur => "Euro",
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BRL" => Ok(Currency::Brl),
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            _ => Err(ValidationError::InvalidValue {
                field: "currency".to_string(),
                value: s.to_string(),
                reason: "expected one of BRL, USD, EUR".to_string(),
            }),
        }
    }
}

/// Price of a crypto asset on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub id: Option<RecordId>,
    pub date: Date,
    pub code: String,
    pub value: Decimal,
    pub currency: String,
}

impl Quote {
    pub fn new(date: Date, code: impl Into<String>, value: Decimal, currency: impl Into<String>) -> Self {
        Self {
            id: None,
            date,
            code: code.into(),
            value,
            currency: currency.into(),
        }
    }
}

impl Record for Quote {
    const TABLE: &'static str = "quote";
    const ID_FIELD: &'static str = "id";
    const ID_POLICY: IdPolicy = IdPolicy::Generated;
    const INDEXES: &'static [&'static str] = &["code", "currency"];

    fn id(&self) -> Option<RecordId> {
        self.id.clone()
    }

    fn assign_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => self.id.as_ref().map(|id| FieldValue::String(id.to_string())),
            "date" => Some(FieldValue::Date(self.date)),
            "code" => Some(FieldValue::String(self.code.clone())),
            "value" => Some(FieldValue::Decimal(self.value)),
            "currency" => Some(FieldValue::String(self.currency.clone())),
            _ => None,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(id) = &self.id {
            require(Self::TABLE, "id", id.as_str())?;
        }
        require(Self::TABLE, "code", &self.code)?;
        require(Self::TABLE, "currency", &self.currency)?;
        Ok(())
    }
}

impl Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.id.as_ref().map(RecordId::as_str).unwrap_or("-");
        write!(
            f,
            "Quote[id={}, date={}, code={}, value={}, currency={}]",
            id, self.date, self.code, self.value, self.currency
        )
    }
}
