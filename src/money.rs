//! Monetary amounts.
//!
//! Amounts are stored as whole cents in `BIGINT` columns and surface at the
//! API edge as decimal dollars. Conversion between the two lives here only.

use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, ops::Add};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money {
    cents: i64,
}

impl Money {
    pub const ZERO: Money = Money { cents: 0 };

    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Rounds to the nearest cent, halves away from zero. Returns `None` when
    /// the amount does not fit in the cents column.
    pub fn from_dollars(dollars: Decimal) -> Option<Self> {
        let cents = (dollars * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()?;
        Some(Self { cents })
    }

    pub fn cents(&self) -> i64 {
        self.cents
    }

    pub fn dollars(&self) -> Decimal {
        Decimal::new(self.cents, 2)
    }

    pub fn is_negative(&self) -> bool {
        self.cents < 0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money::from_cents(self.cents.saturating_add(rhs.cents))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.dollars())
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Serialize::serialize(&self.dollars(), serializer)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let dollars = <Decimal as Deserialize>::deserialize(deserializer)?;
        Money::from_dollars(dollars)
            .ok_or_else(|| serde::de::Error::custom("amount out of range for a money value"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn converts_between_dollars_and_cents() {
        let m = Money::from_dollars(dec!(12.34)).unwrap();
        assert_eq!(m.cents(), 1234);
        assert_eq!(m.dollars(), dec!(12.34));
        assert_eq!(m.to_string(), "$12.34");
    }

    #[test]
    fn sub_cent_amounts_round_half_away_from_zero() {
        assert_eq!(Money::from_dollars(dec!(0.005)).unwrap().cents(), 1);
        assert_eq!(Money::from_dollars(dec!(-0.005)).unwrap().cents(), -1);
        assert_eq!(Money::from_dollars(dec!(2.344)).unwrap().cents(), 234);
    }

    #[test]
    fn serializes_as_decimal_dollars() {
        let json = serde_json::to_string(&Money::from_cents(4550)).unwrap();
        assert_eq!(json, "\"45.50\"");

        let parsed: Money = serde_json::from_str("19.999").unwrap();
        assert_eq!(parsed.cents(), 2000);
    }

    #[test]
    fn optional_money_fields_read_dollar_strings() {
        #[derive(Serialize, Deserialize)]
        struct Charges {
            freight: Option<Money>,
            fuel: Option<Money>,
        }

        let charges: Charges =
            serde_json::from_str(r#"{"freight": "45.50", "fuel": null}"#).unwrap();
        assert_eq!(charges.freight, Some(Money::from_cents(4550)));
        assert_eq!(charges.fuel, None);

        let json = serde_json::to_value(&charges).unwrap();
        assert_eq!(json["freight"], "45.50");
        assert!(json["fuel"].is_null());
    }

    proptest! {
        #[test]
        fn cents_survive_a_dollar_round_trip(cents in -1_000_000_000i64..1_000_000_000i64) {
            let m = Money::from_cents(cents);
            prop_assert_eq!(Money::from_dollars(m.dollars()), Some(m));
        }
    }
}
