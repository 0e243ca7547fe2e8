//! Tests for validation status types and tolerance checks.

#[cfg(test)]
mod tests {
    use crate::money::{Amount, QuotePrice, ShareQuantity};
    use crate::validation::{
        conversion_consistent, quote_consistent, ValidationIssue, ValidationStatus,
    };
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_default_is_ok() {
        assert!(ValidationStatus::default().is_ok());
        assert_eq!(ValidationStatus::default().issue(), None);
    }

    #[test]
    fn test_status_error_carries_issue() {
        let status =
            ValidationStatus::error(ValidationIssue::MissingSelection("security".to_string()));
        assert!(!status.is_ok());
        assert_eq!(
            status.issue(),
            Some(&ValidationIssue::MissingSelection("security".to_string()))
        );
    }

    #[test]
    fn test_issue_messages_name_the_field() {
        let issue = ValidationIssue::ZeroMandatoryAmount("total".to_string());
        assert_eq!(issue.to_string(), "'total' must not be zero");

        let issue = ValidationIssue::DuplicateEndpoints("accounts".to_string());
        assert_eq!(issue.to_string(), "source and target accounts must differ");
    }

    #[test]
    fn test_conversion_consistent_exact() {
        // 1000.00 * 0.90 = 900.00
        assert!(conversion_consistent(
            Amount::new(100_000),
            dec!(0.90),
            Amount::new(90_000)
        ));
    }

    #[test]
    fn test_conversion_consistent_within_rate_tolerance() {
        // effective rate 0.90009 vs entered 0.90: off by less than 0.0001
        assert!(conversion_consistent(
            Amount::new(100_000),
            dec!(0.90),
            Amount::new(90_009)
        ));
        // off by a full cent more than the scaled tolerance
        assert!(!conversion_consistent(
            Amount::new(100_000),
            dec!(0.90),
            Amount::new(90_011)
        ));
    }

    #[test]
    fn test_conversion_zero_base_requires_zero_term() {
        assert!(conversion_consistent(Amount::ZERO, dec!(0.90), Amount::ZERO));
        assert!(!conversion_consistent(
            Amount::ZERO,
            dec!(0.90),
            Amount::new(1)
        ));
    }

    #[test]
    fn test_quote_consistent_exact() {
        // 10 shares * 100.00 = 1000.00
        assert!(quote_consistent(
            ShareQuantity::from_whole(10),
            QuotePrice::from_decimal(dec!(100)).unwrap(),
            Amount::new(100_000)
        ));
    }

    #[test]
    fn test_quote_consistent_scales_with_shares() {
        // one quote unit (0.0001) over 1000 shares moves the lump sum by 0.10
        let shares = ShareQuantity::from_whole(1_000);
        let quote = QuotePrice::from_decimal(dec!(100)).unwrap();
        assert!(quote_consistent(shares, quote, Amount::new(10_000_010)));
        assert!(!quote_consistent(shares, quote, Amount::new(10_000_200)));
    }

    #[test]
    fn test_quote_consistent_ignores_zero_shares() {
        assert!(quote_consistent(
            ShareQuantity::ZERO,
            QuotePrice::ZERO,
            Amount::new(12_345)
        ));
    }
}
