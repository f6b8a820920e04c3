pub mod length_adjustments;
pub mod material_inventory;
pub mod material_orders;
pub mod materials;
pub mod tickets;
pub mod vendors;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use validator::ValidationError;

use crate::money::Money;

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`) in partial updates.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub(crate) fn validate_non_negative_feet(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut err = ValidationError::new("non_negative");
        err.message = Some("must not be negative".into());
        return Err(err);
    }
    Ok(())
}

pub(crate) fn validate_positive_feet(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        let mut err = ValidationError::new("positive");
        err.message = Some("must be greater than zero".into());
        return Err(err);
    }
    Ok(())
}

pub(crate) fn validate_non_zero_feet(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_zero() {
        let mut err = ValidationError::new("non_zero");
        err.message = Some("must not be zero".into());
        return Err(err);
    }
    Ok(())
}

pub(crate) fn validate_non_negative_money(value: &Money) -> Result<(), ValidationError> {
    if value.is_negative() {
        let mut err = ValidationError::new("non_negative_money");
        err.message = Some("amount must not be negative".into());
        return Err(err);
    }
    Ok(())
}

/// Rejects names and numbers that are only whitespace; they are stored
/// trimmed.
pub(crate) fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Trims and drops blank optional text.
pub(crate) fn clean_text(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        vendor_id: Option<Option<u32>>,
    }

    #[test]
    fn double_option_separates_missing_from_null() {
        let missing: Patch = serde_json::from_str("{}").unwrap();
        let null: Patch = serde_json::from_str(r#"{"vendor_id": null}"#).unwrap();
        let set: Patch = serde_json::from_str(r#"{"vendor_id": 7}"#).unwrap();
        assert_eq!(missing.vendor_id, None);
        assert_eq!(null.vendor_id, Some(None));
        assert_eq!(set.vendor_id, Some(Some(7)));
    }

    #[test]
    fn feet_validators() {
        assert!(validate_non_negative_feet(&dec!(0)).is_ok());
        assert!(validate_non_negative_feet(&dec!(-0.1)).is_err());
        assert!(validate_positive_feet(&dec!(0)).is_err());
        assert!(validate_positive_feet(&dec!(0.5)).is_ok());
        assert!(validate_non_zero_feet(&dec!(-3)).is_ok());
        assert!(validate_non_zero_feet(&dec!(0.00)).is_err());
    }

    #[test]
    fn blank_text_is_rejected() {
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("\t\n").is_err());
        assert!(validate_not_blank(" MV-1 ").is_ok());
    }

    #[test]
    fn clean_text_drops_blank_values() {
        assert_eq!(clean_text(Some("  ".into())), None);
        assert_eq!(clean_text(Some(" Gloss ".into())), Some("Gloss".into()));
        assert_eq!(clean_text(None), None);
    }
}
