//! Parsing of raw input strings into typed field values.

use rust_decimal::Decimal;
use time::{format_description, Date};

use crate::{models::quote::Currency, storage::ValidationError};

pub const DEFAULT_DATE_FORMAT: &str = "[day]/[month]/[year]";

/// Parses `raw` with a `time` format description such as `[day]/[month]/[year]`.
pub fn parse_date(field: &str, raw: &str, format: &str) -> Result<Date, ValidationError> {
    let items = format_description::parse_borrowed::<2>(format).map_err(|e| invalid(field, format, e))?;
    Date::parse(raw.trim(), &items).map_err(|e| invalid(field, raw, e))
}

pub fn parse_decimal(field: &str, raw: &str) -> Result<Decimal, ValidationError> {
    Decimal::from_str_exact(raw.trim()).map_err(|e| invalid(field, raw, e))
}

pub fn parse_currency(raw: &str) -> Result<Currency, ValidationError> {
    raw.parse()
}

fn invalid(field: &str, value: &str, reason: impl ToString) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use time::macros::date;

    use super::*;

    #[test]
    fn dates_use_day_month_year_by_default() {
        assert_eq!(parse_date("date", "30/06/2015", DEFAULT_DATE_FORMAT).unwrap(), date!(2015 - 06 - 30));
        assert_eq!(parse_date("date", " 02/10/2017 ", DEFAULT_DATE_FORMAT).unwrap(), date!(2017 - 10 - 02));
    }

    #[test]
    fn custom_date_format() {
        assert_eq!(
            parse_date("date", "2021-03-06", "[year]-[month]-[day]").unwrap(),
            date!(2021 - 03 - 06)
        );
    }

    #[test]
    fn bad_date_names_the_field() {
        match parse_date("creation_date", "31/02/2021", DEFAULT_DATE_FORMAT) {
            Err(ValidationError::InvalidValue { field, value, .. }) => {
                assert_eq!(field, "creation_date");
                assert_eq!(value, "31/02/2021");
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn bad_format_description_is_rejected() {
        assert!(parse_date("date", "01/03/2021", "[dia]/[mes]").is_err());
    }

    #[test]
    fn decimals_are_exact() {
        assert_eq!(parse_decimal("value", "10012.78").unwrap(), dec!(10012.78));
        assert_eq!(parse_decimal("value", "9957.20").unwrap().to_string(), "9957.20");
        assert!(parse_decimal("value", "ten").is_err());
    }

    #[test]
    fn currencies() {
        assert_eq!(parse_currency("brl").unwrap(), Currency::Brl);
        assert!(parse_currency("BTC").is_err());
    }
}
