//! Expense split calculation
//!
//! Pure functions turning an expense total and a split policy into per-member
//! owed amounts. Every successful result sums exactly to the total: rounding
//! residue is handed out deterministically instead of being dropped.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{MessMateError, MessMateResult};
use crate::models::expense::percentages_balance;
use crate::models::{ExpenseSplit, MemberId, Money, SplitMethod};

/// A computed split: the member, the amount they owe and their percentage
pub type SplitResult = ExpenseSplit;

/// A requested percentage for one member in a custom split
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CustomShare {
    pub member_id: MemberId,
    pub percentage: f64,
}

impl CustomShare {
    pub fn new(member_id: MemberId, percentage: f64) -> Self {
        Self {
            member_id,
            percentage,
        }
    }
}

/// Resolve a split method tag, failing on anything unrecognized
pub fn split_method_from_tag(tag: &str) -> MessMateResult<SplitMethod> {
    SplitMethod::parse(tag)
        .ok_or_else(|| MessMateError::InvalidSplit(format!("Unknown split method '{}'", tag)))
}

/// Calculate splits for an expense
///
/// `participants` is the pool of members the expense may be shared among.
/// `custom` is required for [`SplitMethod::Custom`] and `excluded` must be
/// non-empty for [`SplitMethod::Exclude`].
pub fn calculate_splits(
    method: SplitMethod,
    amount: Money,
    participants: &[MemberId],
    custom: Option<&[CustomShare]>,
    excluded: Option<&[MemberId]>,
) -> MessMateResult<Vec<SplitResult>> {
    match method {
        SplitMethod::Equal => equal_split(amount, participants, excluded.unwrap_or(&[])),
        SplitMethod::Exclude => exclude_split(amount, participants, excluded.unwrap_or(&[])),
        SplitMethod::Custom => {
            let shares = custom.ok_or_else(|| {
                MessMateError::InvalidSplit("Custom split requires member percentages".into())
            })?;
            let pool = unique(participants);
            if let Some(outsider) = shares.iter().find(|s| !pool.contains(&s.member_id)) {
                return Err(MessMateError::InvalidSplit(format!(
                    "{} is not a participant of this expense",
                    outsider.member_id
                )));
            }
            custom_split(amount, shares)
        }
    }
}

/// Split a total equally among the participants not in `excluded`
///
/// Shares differ by at most one cent; the leftover cents go one apiece to the
/// first included members, so 100.00 among three is 33.34, 33.33, 33.33.
pub fn equal_split(
    amount: Money,
    participants: &[MemberId],
    excluded: &[MemberId],
) -> MessMateResult<Vec<SplitResult>> {
    require_positive(amount)?;

    let included: Vec<MemberId> = unique(participants)
        .into_iter()
        .filter(|id| !excluded.contains(id))
        .collect();

    if included.is_empty() {
        return Err(MessMateError::InvalidSplit(
            "No members left to share the expense".into(),
        ));
    }

    let count = included.len() as i64;
    let base = amount.cents() / count;
    let leftover = amount.cents() % count;
    let percentage = round_percentage(100.0 / count as f64);

    Ok(included
        .into_iter()
        .enumerate()
        .map(|(i, member_id)| {
            let extra = if (i as i64) < leftover { 1 } else { 0 };
            ExpenseSplit::new(member_id, Money::from_cents(base + extra), percentage)
        })
        .collect())
}

/// Equal split that must exclude at least one member
pub fn exclude_split(
    amount: Money,
    participants: &[MemberId],
    excluded: &[MemberId],
) -> MessMateResult<Vec<SplitResult>> {
    if excluded.is_empty() {
        return Err(MessMateError::InvalidSplit(
            "Exclude split needs at least one excluded member".into(),
        ));
    }
    equal_split(amount, participants, excluded)
}

/// Split a total by explicit percentages
///
/// Percentages must each lie in 0..=100 and sum to 100 within 0.01. The
/// rounding residue is added to the largest share, the earliest one on ties.
pub fn custom_split(amount: Money, shares: &[CustomShare]) -> MessMateResult<Vec<SplitResult>> {
    require_positive(amount)?;

    if shares.is_empty() {
        return Err(MessMateError::InvalidSplit(
            "Custom split needs at least one member".into(),
        ));
    }

    let mut seen = HashSet::new();
    for share in shares {
        if !share.percentage.is_finite() || !(0.0..=100.0).contains(&share.percentage) {
            return Err(MessMateError::InvalidSplit(format!(
                "Percentage {} for {} is outside 0-100",
                share.percentage, share.member_id
            )));
        }
        if !seen.insert(share.member_id) {
            return Err(MessMateError::InvalidSplit(format!(
                "{} appears more than once",
                share.member_id
            )));
        }
    }

    let total: f64 = shares.iter().map(|s| s.percentage).sum();
    if !percentages_balance(total) {
        return Err(MessMateError::InvalidSplit(format!(
            "Percentages sum to {:.2}, expected 100",
            total
        )));
    }

    let mut splits: Vec<SplitResult> = shares
        .iter()
        .map(|s| ExpenseSplit::new(s.member_id, amount.percentage(s.percentage), s.percentage))
        .collect();

    let residual = amount - splits.iter().map(|s| s.amount).sum::<Money>();
    if !residual.is_zero() {
        let mut largest = 0;
        for (i, split) in splits.iter().enumerate() {
            if split.amount > splits[largest].amount {
                largest = i;
            }
        }
        splits[largest].amount = splits[largest].amount + residual;
    }

    Ok(splits)
}

fn require_positive(amount: Money) -> MessMateResult<()> {
    if amount.is_positive() {
        Ok(())
    } else {
        Err(MessMateError::InvalidSplit(format!(
            "Expense amount must be positive, got {}",
            amount
        )))
    }
}

/// Drop repeated ids, keeping the first occurrence
fn unique(ids: &[MemberId]) -> Vec<MemberId> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

fn round_percentage(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn members(n: usize) -> Vec<MemberId> {
        (0..n).map(|_| MemberId::new()).collect()
    }

    fn cents(splits: &[SplitResult]) -> Vec<i64> {
        splits.iter().map(|s| s.amount.cents()).collect()
    }

    #[test]
    fn test_equal_split_hundred_among_three() {
        let ids = members(3);
        let splits = equal_split(Money::from_cents(10000), &ids, &[]).unwrap();

        assert_eq!(cents(&splits), vec![3334, 3333, 3333]);
        assert_eq!(splits[0].member_id, ids[0]);
        assert!(splits.iter().all(|s| s.percentage == 33.33));
    }

    #[rstest]
    #[case(10000, 4, vec![2500, 2500, 2500, 2500])]
    #[case(1000, 3, vec![334, 333, 333])]
    #[case(1001, 3, vec![334, 334, 333])]
    #[case(1, 2, vec![1, 0])]
    #[case(4999, 1, vec![4999])]
    fn test_equal_split_amounts(#[case] total: i64, #[case] n: usize, #[case] expected: Vec<i64>) {
        let splits = equal_split(Money::from_cents(total), &members(n), &[]).unwrap();
        assert_eq!(cents(&splits), expected);
    }

    #[test]
    fn test_equal_split_with_exclusions() {
        let ids = members(4);
        let splits = equal_split(Money::from_cents(9000), &ids, &[ids[0]]).unwrap();

        assert_eq!(splits.len(), 3);
        assert!(splits.iter().all(|s| s.member_id != ids[0]));
        assert_eq!(cents(&splits), vec![3000, 3000, 3000]);
    }

    #[test]
    fn test_equal_split_collapses_duplicates() {
        let ids = members(2);
        let with_dupes = vec![ids[0], ids[1], ids[0]];
        let splits = equal_split(Money::from_cents(1000), &with_dupes, &[]).unwrap();

        assert_eq!(splits.len(), 2);
        assert_eq!(cents(&splits), vec![500, 500]);
    }

    #[rstest]
    #[case(0)]
    #[case(-500)]
    fn test_equal_split_rejects_non_positive(#[case] total: i64) {
        let err = equal_split(Money::from_cents(total), &members(2), &[]).unwrap_err();
        assert!(matches!(err, MessMateError::InvalidSplit(_)));
    }

    #[test]
    fn test_equal_split_everyone_excluded() {
        let ids = members(2);
        let err = equal_split(Money::from_cents(1000), &ids, &ids).unwrap_err();
        assert!(matches!(err, MessMateError::InvalidSplit(_)));
    }

    #[test]
    fn test_exclude_split_requires_exclusions() {
        let err = exclude_split(Money::from_cents(1000), &members(3), &[]).unwrap_err();
        assert!(matches!(err, MessMateError::InvalidSplit(_)));
    }

    #[test]
    fn test_exclude_split() {
        let ids = members(3);
        let splits = exclude_split(Money::from_cents(1000), &ids, &[ids[2]]).unwrap();
        assert_eq!(cents(&splits), vec![500, 500]);
        assert_eq!(splits[0].percentage, 50.0);
    }

    #[test]
    fn test_custom_split_keeps_percentages() {
        let ids = members(3);
        let shares = vec![
            CustomShare::new(ids[0], 50.0),
            CustomShare::new(ids[1], 30.0),
            CustomShare::new(ids[2], 20.0),
        ];
        let splits = custom_split(Money::from_cents(12000), &shares).unwrap();

        assert_eq!(cents(&splits), vec![6000, 3600, 2400]);
        let percentages: Vec<f64> = splits.iter().map(|s| s.percentage).collect();
        assert_eq!(percentages, vec![50.0, 30.0, 20.0]);
    }

    #[test]
    fn test_custom_split_residual_goes_to_largest() {
        let ids = members(3);
        let shares = vec![
            CustomShare::new(ids[0], 33.33),
            CustomShare::new(ids[1], 33.34),
            CustomShare::new(ids[2], 33.33),
        ];
        let splits = custom_split(Money::from_cents(10000), &shares).unwrap();

        assert_eq!(cents(&splits), vec![3333, 3334, 3333]);

        let shares = vec![
            CustomShare::new(ids[0], 33.33),
            CustomShare::new(ids[1], 33.33),
            CustomShare::new(ids[2], 33.34),
        ];
        // every share of 1.00 rounds to 0.33, so the missing cent lands on the first
        let splits = custom_split(Money::from_cents(100), &shares).unwrap();
        assert_eq!(cents(&splits), vec![34, 33, 33]);
    }

    #[test]
    fn test_custom_split_residual_tie_breaks_to_first() {
        let ids = members(2);
        let shares = vec![CustomShare::new(ids[0], 50.0), CustomShare::new(ids[1], 50.0)];
        let splits = custom_split(Money::from_cents(1001), &shares).unwrap();

        // 5.005 rounds away from zero to 5.01 twice; the extra cent comes off the first
        assert_eq!(cents(&splits), vec![500, 501]);
    }

    #[rstest]
    #[case(vec![50.0, 40.0])]
    #[case(vec![50.0, 50.02])]
    #[case(vec![120.0, -20.0])]
    #[case(vec![f64::NAN, 100.0])]
    fn test_custom_split_rejects_bad_percentages(#[case] percentages: Vec<f64>) {
        let ids = members(percentages.len());
        let shares: Vec<_> = ids
            .iter()
            .zip(&percentages)
            .map(|(id, pct)| CustomShare::new(*id, *pct))
            .collect();

        let err = custom_split(Money::from_cents(1000), &shares).unwrap_err();
        assert!(matches!(err, MessMateError::InvalidSplit(_)));
    }

    #[test]
    fn test_custom_split_accepts_tolerance() {
        let ids = members(2);
        let shares = vec![CustomShare::new(ids[0], 50.0), CustomShare::new(ids[1], 50.01)];
        assert!(custom_split(Money::from_cents(1000), &shares).is_ok());
    }

    #[test]
    fn test_custom_split_rejects_duplicate_member() {
        let id = MemberId::new();
        let shares = vec![CustomShare::new(id, 50.0), CustomShare::new(id, 50.0)];
        assert!(custom_split(Money::from_cents(1000), &shares).is_err());
    }

    #[test]
    fn test_dispatch() {
        let ids = members(2);
        let amount = Money::from_cents(1000);

        let equal = calculate_splits(SplitMethod::Equal, amount, &ids, None, None).unwrap();
        assert_eq!(cents(&equal), vec![500, 500]);

        let err = calculate_splits(SplitMethod::Custom, amount, &ids, None, None).unwrap_err();
        assert!(matches!(err, MessMateError::InvalidSplit(_)));

        let err = calculate_splits(SplitMethod::Exclude, amount, &ids, None, None).unwrap_err();
        assert!(matches!(err, MessMateError::InvalidSplit(_)));

        let outsider = [CustomShare::new(MemberId::new(), 100.0)];
        let err = calculate_splits(SplitMethod::Custom, amount, &ids, Some(&outsider), None)
            .unwrap_err();
        assert!(matches!(err, MessMateError::InvalidSplit(_)));
    }

    #[rstest]
    #[case("equal", SplitMethod::Equal)]
    #[case("Custom", SplitMethod::Custom)]
    #[case(" exclude ", SplitMethod::Exclude)]
    fn test_split_method_from_tag(#[case] tag: &str, #[case] expected: SplitMethod) {
        assert_eq!(split_method_from_tag(tag).unwrap(), expected);
    }

    #[test]
    fn test_unknown_tag() {
        let err = split_method_from_tag("byweight").unwrap_err();
        assert!(matches!(err, MessMateError::InvalidSplit(_)));
    }

    proptest! {
        #[test]
        fn prop_equal_split_is_exact_and_fair(total in 1i64..10_000_000, n in 1usize..=20) {
            let splits = equal_split(Money::from_cents(total), &members(n), &[]).unwrap();

            prop_assert_eq!(splits.len(), n);
            prop_assert_eq!(splits.iter().map(|s| s.amount.cents()).sum::<i64>(), total);

            let exact = total as f64 / n as f64;
            for split in &splits {
                prop_assert!((split.amount.cents() as f64 - exact).abs() < 1.0);
            }
        }

        #[test]
        fn prop_custom_split_is_exact(
            total in 1_000i64..10_000_000,
            weights in prop::collection::vec(1u32..100, 1..=10),
        ) {
            // Build percentages with two decimals that sum to exactly 100
            let weight_sum: u32 = weights.iter().sum();
            let mut basis: Vec<i64> = weights
                .iter()
                .map(|w| (*w as i64 * 10_000) / weight_sum as i64)
                .collect();
            let short = 10_000 - basis.iter().sum::<i64>();
            basis[0] += short;

            let ids = members(basis.len());
            let shares: Vec<_> = ids
                .iter()
                .zip(&basis)
                .map(|(id, b)| CustomShare::new(*id, *b as f64 / 100.0))
                .collect();

            let splits = custom_split(Money::from_cents(total), &shares).unwrap();
            prop_assert_eq!(splits.iter().map(|s| s.amount.cents()).sum::<i64>(), total);
            for (split, share) in splits.iter().zip(&shares) {
                prop_assert_eq!(split.percentage, share.percentage);
                prop_assert!(!split.amount.is_negative());
            }
        }
    }
}
