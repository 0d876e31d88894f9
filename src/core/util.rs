use rust_decimal::{Decimal, RoundingStrategy};
use std::cmp::Ordering;

/// Rounds to cents, half away from zero.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `part / whole * 100`, or `None` when `whole` is zero or the result
/// overflows.
pub fn percent_of(part: Decimal, whole: Decimal) -> Option<Decimal> {
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
}

/// Sum of `values`, or `None` on overflow.
pub fn checked_sum(values: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
}

/// Ascending order for optional labels with `None` after every `Some`.
pub fn cmp_nulls_last(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_round2_midpoint() {
        assert_eq!(round2(dec("2.345")), dec("2.35"));
        assert_eq!(round2(dec("-2.345")), dec("-2.35"));
        assert_eq!(round2(dec("2.344")), dec("2.34"));
    }

    #[test]
    fn test_percent_of_zero_whole() {
        assert_eq!(percent_of(dec("50"), dec("200")), Some(dec("25")));
        assert_eq!(percent_of(dec("50"), Decimal::ZERO), None);
    }

    #[test]
    fn test_percent_of_overflow() {
        assert_eq!(percent_of(dec("10000000000000000000000000"), dec("0.01")), None);
        assert_eq!(percent_of(Decimal::MAX, dec("0.5")), None);
    }

    #[test]
    fn test_checked_sum() {
        assert_eq!(checked_sum([dec("1.5"), dec("2.5")]), Some(dec("4")));
        assert_eq!(checked_sum(Vec::new()), Some(Decimal::ZERO));
        let half = dec("50000000000000000000000000000");
        assert_eq!(checked_sum([half, half]), None);
    }

    #[test]
    fn test_nulls_sort_last() {
        let mut labels = vec![None, Some("b"), Some("a")];
        labels.sort_by(|a, b| cmp_nulls_last(*a, *b));
        assert_eq!(labels, vec![Some("a"), Some("b"), None]);
    }
}
