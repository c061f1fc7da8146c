//! Value Objects for fulfillment

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self { Self(value.into()) }
            pub fn as_str(&self) -> &str { &self.0 }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str { &self.0 }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self { Self(value.to_string()) }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self { Self(value) }
        }
    };
}

string_id!(
    /// Order identifier
    OrderId
);
string_id!(
    /// Return identifier
    ReturnId
);
string_id!(
    /// Warehouse identifier, owned by the warehouse directory
    WarehouseId
);
string_id!(
    /// Identity of the staff member acting on a record
    StaffId
);
string_id!(ProductId);
string_id!(VariantId);

impl OrderId {
    pub fn generate() -> Self { Self(uuid::Uuid::now_v7().to_string()) }
}

impl ReturnId {
    pub fn generate() -> Self { Self(uuid::Uuid::now_v7().to_string()) }
}

/// Money value object
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money { amount: Decimal, currency: String }

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Self { Self { amount, currency: currency.to_uppercase() } }
    pub fn usd(amount: Decimal) -> Self { Self::new(amount, "USD") }
    pub fn zero(currency: &str) -> Self { Self::new(Decimal::ZERO, currency) }
    pub fn amount(&self) -> Decimal { self.amount }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency { return Err(MoneyError::CurrencyMismatch); }
        Ok(Money::new(self.amount + other.amount, &self.currency))
    }
    pub fn multiply(&self, qty: u32) -> Money { Money::new(self.amount * Decimal::from(qty), &self.currency) }
}

impl Default for Money { fn default() -> Self { Self::zero("USD") } }

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    #[error("currency mismatch")]
    CurrencyMismatch,
}

/// Shipping address captured at checkout. Never edited afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    pub phone: String,
    pub address_line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub postal_code: String,
    pub country: String,
}

impl ShippingAddress {
    pub fn validate(&self) -> Result<(), AddressError> {
        if self.full_name.trim().is_empty() { return Err(AddressError::MissingName); }
        if self.phone.trim().is_empty() { return Err(AddressError::MissingPhone); }
        if self.address_line1.trim().is_empty() { return Err(AddressError::MissingLine); }
        Ok(())
    }

    /// Case-insensitive substring match on the name or phone.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.full_name.to_lowercase().contains(&needle) || self.phone.to_lowercase().contains(&needle)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("shipping address requires a full name")]
    MissingName,
    #[error("shipping address requires a phone number")]
    MissingPhone,
    #[error("shipping address requires an address line")]
    MissingLine,
}

/// Parses an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0)).map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("2024-03-05T10:30:00+01:00"), Some(Utc.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap()));
        assert_eq!(parse_timestamp("2024-03-05"), Some(Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap()));
        assert_eq!(parse_timestamp("next tuesday"), None);
    }

    fn address() -> ShippingAddress {
        ShippingAddress {
            full_name: "Ada Obi".into(), phone: "+234 803 555 0101".into(), address_line1: "12 Marina".into(),
            city: "Lagos".into(), postal_code: "101001".into(), country: "NG".into(), ..Default::default()
        }
    }

    #[test]
    fn test_money_add() {
        let a = Money::usd(Decimal::new(100, 0));
        let b = Money::usd(Decimal::new(50, 0));
        assert_eq!(a.add(&b).unwrap().amount(), Decimal::new(150, 0));
        assert_eq!(a.add(&Money::zero("ngn")), Err(MoneyError::CurrencyMismatch));
    }

    #[test]
    fn test_address_search_is_case_insensitive() {
        let a = address();
        assert!(a.matches("ada"));
        assert!(a.matches("OBI"));
        assert!(a.matches("555"));
        assert!(!a.matches("marina"));
    }

    #[test]
    fn test_address_requires_name_and_phone() {
        assert!(address().validate().is_ok());
        let mut a = address();
        a.phone = "  ".into();
        assert_eq!(a.validate(), Err(AddressError::MissingPhone));
    }

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let id = WarehouseId::from("WH1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"WH1\"");
    }
}
