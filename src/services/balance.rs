//! Balance aggregation
//!
//! Folds a mess's raw expense and fund records into per-member balances:
//!
//! ```text
//! balance = contributed - fair_share + paid_from_pocket
//! ```
//!
//! Nothing is cached; every call re-reads the records of the one mess it was
//! asked about.

use tracing::debug;

use crate::error::MessMateResult;
use crate::models::{
    BalanceBreakdown, FundBalance, FundRecordKind, MemberId, MessId, Money, NetBalance,
    SettlementSuggestion,
};
use crate::storage::{ExpenseQuery, FundRecordQuery, Storage};

use super::member::MemberService;
use super::mess::{require_elevated, require_member, MessService};
use super::settlement::simplify_settlements;

/// Service for balance calculations
pub struct BalanceService<'a> {
    storage: &'a Storage,
}

impl<'a> BalanceService<'a> {
    /// Create a new balance service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Balance of one member within one mess
    pub fn calculate_member_balance(
        &self,
        mess_id: MessId,
        member_id: MemberId,
    ) -> MessMateResult<BalanceBreakdown> {
        let mess = MessService::new(self.storage).require(mess_id)?;
        require_member(&mess, member_id)?;

        let contributed: Money = self
            .storage
            .fund_records
            .query(&FundRecordQuery::for_mess(mess_id).member(member_id))?
            .iter()
            .map(|r| r.signed_amount())
            .sum();

        let fair_share: Money = self
            .storage
            .expenses
            .query(&ExpenseQuery::for_mess(mess_id).split_member(member_id))?
            .iter()
            .filter_map(|e| e.split_for(member_id))
            .map(|s| s.amount)
            .sum();

        let paid_from_pocket: Money = self
            .storage
            .expenses
            .query(&ExpenseQuery::for_mess(mess_id).paid_by(member_id))?
            .iter()
            .map(|e| e.amount)
            .sum();

        let name = MemberService::new(self.storage).name_of(member_id)?;
        let breakdown =
            BalanceBreakdown::from_parts(member_id, name, contributed, fair_share, paid_from_pocket);

        debug!(
            mess = %mess_id,
            member = %member_id,
            contributed = %contributed,
            fair_share = %fair_share,
            paid_from_pocket = %paid_from_pocket,
            balance = %breakdown.balance,
            "member balance"
        );
        Ok(breakdown)
    }

    /// Balances of every current member, in roster order; owners and admins only
    pub fn get_all_balances(
        &self,
        mess_id: MessId,
        requester: MemberId,
    ) -> MessMateResult<Vec<BalanceBreakdown>> {
        let mess = MessService::new(self.storage).require(mess_id)?;
        require_elevated(&mess, requester)?;

        mess.member_ids()
            .into_iter()
            .map(|id| self.calculate_member_balance(mess_id, id))
            .collect()
    }

    /// Pooled-fund totals of a mess
    pub fn get_mess_fund_balance(&self, mess_id: MessId) -> MessMateResult<FundBalance> {
        MessService::new(self.storage).require(mess_id)?;

        let records = self
            .storage
            .fund_records
            .query(&FundRecordQuery::for_mess(mess_id))?;

        let contributions: Money = records
            .iter()
            .filter(|r| r.kind == FundRecordKind::Contribution)
            .map(|r| r.amount)
            .sum();
        let total_refunded: Money = records
            .iter()
            .filter(|r| r.kind == FundRecordKind::Refund)
            .map(|r| r.amount)
            .sum();
        let total_expenses: Money = self
            .storage
            .expenses
            .query(&ExpenseQuery::for_mess(mess_id))?
            .iter()
            .map(|e| e.amount)
            .sum();

        let total_collected = contributions - total_refunded;
        Ok(FundBalance {
            total_collected,
            total_refunded,
            total_expenses,
            balance: total_collected - total_expenses,
        })
    }

    /// Suggested transfers that would settle the mess; owners and admins only
    pub fn settlement_suggestions(
        &self,
        mess_id: MessId,
        requester: MemberId,
    ) -> MessMateResult<Vec<SettlementSuggestion>> {
        let balances = self.get_all_balances(mess_id, requester)?;
        let nets: Vec<NetBalance> = balances.iter().map(|b| b.net()).collect();

        let name_of = |id: MemberId| {
            balances
                .iter()
                .find(|b| b.member_id == id)
                .map(|b| b.member_name.clone())
                .unwrap_or_else(|| id.to_string())
        };

        let suggestions: Vec<SettlementSuggestion> = simplify_settlements(&nets)
            .into_iter()
            .map(|t| SettlementSuggestion {
                from: t.from,
                from_name: name_of(t.from),
                to: t.to,
                to_name: name_of(t.to),
                amount: t.amount,
            })
            .collect();

        debug!(mess = %mess_id, count = suggestions.len(), "settlement suggestions");
        Ok(suggestions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::MessMatePaths;
    use crate::error::MessMateError;
    use crate::models::{BalanceStatus, ExpenseCategory, MessRole};
    use crate::services::expense::{CreateExpenseInput, ExpenseService, SplitRequest};
    use crate::services::fund::{FundRecordInput, FundService};
    use crate::services::settlement::validate_simplification;
    use crate::services::split::CustomShare;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use tempfile::TempDir;

    struct Fixture {
        _temp_dir: TempDir,
        storage: Storage,
        mess: MessId,
        /// owner, bob, carol
        ids: Vec<MemberId>,
    }

    fn setup() -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let paths = MessMatePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();

        let members = MemberService::new(&storage);
        let ids: Vec<MemberId> = ["Owner", "Bob", "Carol"]
            .iter()
            .map(|n| members.add(n).unwrap().id)
            .collect();

        let messes = MessService::new(&storage);
        let mess = messes.create("Flat", ids[0], 6).unwrap().id;
        messes.join(mess, ids[1]).unwrap();
        messes.join(mess, ids[2]).unwrap();

        Fixture {
            _temp_dir: temp_dir,
            storage,
            mess,
            ids,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    fn spend(storage: &Storage, mess: MessId, payer: MemberId, cents: i64, split: SplitRequest) {
        ExpenseService::new(storage)
            .create(CreateExpenseInput {
                mess_id: mess,
                requester: payer,
                paid_by: payer,
                amount: Money::from_cents(cents),
                description: "Shared".into(),
                category: ExpenseCategory::Groceries,
                date: date(),
                split,
            })
            .unwrap();
    }

    fn contribute(storage: &Storage, mess: MessId, member: MemberId, cents: i64) {
        FundService::new(storage)
            .contribute(FundRecordInput {
                mess_id: mess,
                requester: member,
                member_id: member,
                amount: Money::from_cents(cents),
                date: date(),
                note: None,
            })
            .unwrap();
    }

    #[test]
    fn test_balance_formula() {
        let f = setup();
        // Bob pays 90.00 split three ways; Carol puts 20.00 in the fund
        spend(&f.storage, f.mess, f.ids[1], 9000, SplitRequest::equal());
        contribute(&f.storage, f.mess, f.ids[2], 2000);

        let service = BalanceService::new(&f.storage);

        let bob = service.calculate_member_balance(f.mess, f.ids[1]).unwrap();
        assert_eq!(bob.paid_from_pocket.cents(), 9000);
        assert_eq!(bob.fair_share.cents(), 3000);
        assert_eq!(bob.balance.cents(), 6000);
        assert_eq!(bob.status, BalanceStatus::Owed);
        assert_eq!(bob.member_name, "Bob");

        let carol = service.calculate_member_balance(f.mess, f.ids[2]).unwrap();
        assert_eq!(carol.contributed.cents(), 2000);
        assert_eq!(carol.balance.cents(), -1000);
        assert_eq!(carol.status, BalanceStatus::Owes);

        for b in [&bob, &carol] {
            assert_eq!(b.balance, b.contributed - b.fair_share + b.paid_from_pocket);
        }
    }

    #[test]
    fn test_refunds_reduce_contributed() {
        let f = setup();
        contribute(&f.storage, f.mess, f.ids[1], 5000);
        FundService::new(&f.storage)
            .refund(FundRecordInput {
                mess_id: f.mess,
                requester: f.ids[0],
                member_id: f.ids[1],
                amount: Money::from_cents(1500),
                date: date(),
                note: None,
            })
            .unwrap();

        let service = BalanceService::new(&f.storage);
        let bob = service.calculate_member_balance(f.mess, f.ids[1]).unwrap();
        assert_eq!(bob.contributed.cents(), 3500);

        let fund = service.get_mess_fund_balance(f.mess).unwrap();
        assert_eq!(fund.total_collected.cents(), 3500);
        assert_eq!(fund.total_refunded.cents(), 1500);
    }

    #[test]
    fn test_small_balance_is_settled() {
        let f = setup();
        // 1.00 split three ways leaves the payer 0.67 ahead
        spend(&f.storage, f.mess, f.ids[1], 100, SplitRequest::equal());

        let bob = BalanceService::new(&f.storage)
            .calculate_member_balance(f.mess, f.ids[1])
            .unwrap();
        assert_eq!(bob.balance.cents(), 67);
        assert_eq!(bob.status, BalanceStatus::Settled);
    }

    #[test]
    fn test_deleted_expenses_are_ignored() {
        let f = setup();
        spend(&f.storage, f.mess, f.ids[1], 9000, SplitRequest::equal());
        let expense_service = ExpenseService::new(&f.storage);
        let expense = expense_service
            .list(f.mess, f.ids[1], &Default::default())
            .unwrap()
            .remove(0);
        expense_service.delete(f.mess, f.ids[1], expense.id).unwrap();

        let bob = BalanceService::new(&f.storage)
            .calculate_member_balance(f.mess, f.ids[1])
            .unwrap();
        assert!(bob.balance.is_zero());
    }

    #[test]
    fn test_non_member_is_unauthorized() {
        let f = setup();
        let outsider = MemberService::new(&f.storage).add("Eve").unwrap().id;

        let err = BalanceService::new(&f.storage)
            .calculate_member_balance(f.mess, outsider)
            .unwrap_err();
        assert!(matches!(err, MessMateError::Unauthorized(_)));
    }

    #[test]
    fn test_all_balances_requires_elevated_role() {
        let f = setup();
        let service = BalanceService::new(&f.storage);

        let err = service.get_all_balances(f.mess, f.ids[1]).unwrap_err();
        assert!(matches!(err, MessMateError::Forbidden(_)));

        MessService::new(&f.storage)
            .set_role(f.mess, f.ids[0], f.ids[1], MessRole::Admin)
            .unwrap();
        let all = service.get_all_balances(f.mess, f.ids[1]).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].member_id, f.ids[0]);

        let single = service.calculate_member_balance(f.mess, f.ids[2]).unwrap();
        assert_eq!(all[2], single);
    }

    #[test]
    fn test_mess_isolation() {
        let f = setup();
        let other = MessService::new(&f.storage)
            .create("Office", f.ids[1], 6)
            .unwrap()
            .id;
        MessService::new(&f.storage).join(other, f.ids[2]).unwrap();

        spend(&f.storage, f.mess, f.ids[1], 9000, SplitRequest::equal());
        spend(&f.storage, other, f.ids[1], 5000, SplitRequest::equal());
        contribute(&f.storage, other, f.ids[2], 7000);

        let service = BalanceService::new(&f.storage);
        let bob_flat = service.calculate_member_balance(f.mess, f.ids[1]).unwrap();
        assert_eq!(bob_flat.paid_from_pocket.cents(), 9000);
        assert!(bob_flat.contributed.is_zero());

        let carol_flat = service.calculate_member_balance(f.mess, f.ids[2]).unwrap();
        assert!(carol_flat.contributed.is_zero());
        assert_eq!(carol_flat.fair_share.cents(), 3000);

        let fund = service.get_mess_fund_balance(f.mess).unwrap();
        assert!(fund.total_collected.is_zero());
        assert_eq!(fund.total_expenses.cents(), 9000);
        assert_eq!(fund.balance.cents(), -9000);
    }

    #[test]
    fn test_settlement_suggestions() {
        let f = setup();
        // Owner pays 120.00 for everyone, Bob pays 30.00 split with Carol only
        spend(&f.storage, f.mess, f.ids[0], 12000, SplitRequest::equal());
        spend(
            &f.storage,
            f.mess,
            f.ids[1],
            3000,
            SplitRequest::custom(vec![
                CustomShare::new(f.ids[1], 50.0),
                CustomShare::new(f.ids[2], 50.0),
            ]),
        );

        let service = BalanceService::new(&f.storage);
        let suggestions = service.settlement_suggestions(f.mess, f.ids[0]).unwrap();

        // Owner +80.00, Bob -25.00, Carol -55.00
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].from_name, "Carol");
        assert_eq!(suggestions[0].to_name, "Owner");
        assert_eq!(suggestions[0].amount.cents(), 5500);
        assert_eq!(suggestions[1].from_name, "Bob");
        assert_eq!(suggestions[1].amount.cents(), 2500);

        let nets: Vec<NetBalance> = service
            .get_all_balances(f.mess, f.ids[0])
            .unwrap()
            .iter()
            .map(|b| b.net())
            .collect();
        let txns: Vec<_> = suggestions
            .iter()
            .map(|s| crate::models::SettlementTransaction {
                from: s.from,
                to: s.to,
                amount: s.amount,
            })
            .collect();
        assert!(validate_simplification(&nets, &txns));

        let err = service.settlement_suggestions(f.mess, f.ids[2]).unwrap_err();
        assert!(matches!(err, MessMateError::Forbidden(_)));
    }

    /// One recorded event: (kind, member index, cents)
    ///
    /// Kinds: 0 equal expense, 1 expense excluding the next member,
    /// 2 contribution, 3 refund issued by the owner.
    fn record_event(f: &Fixture, (kind, who, cents): (u8, usize, i64)) {
        let member = f.ids[who];
        match kind {
            0 => spend(&f.storage, f.mess, member, cents, SplitRequest::equal()),
            1 => {
                let skipped = f.ids[(who + 1) % f.ids.len()];
                spend(
                    &f.storage,
                    f.mess,
                    member,
                    cents,
                    SplitRequest::excluding(vec![skipped]),
                )
            }
            2 => contribute(&f.storage, f.mess, member, cents),
            _ => {
                FundService::new(&f.storage)
                    .refund(FundRecordInput {
                        mess_id: f.mess,
                        requester: f.ids[0],
                        member_id: member,
                        amount: Money::from_cents(cents),
                        date: date(),
                        note: None,
                    })
                    .unwrap();
            }
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_balances_follow_the_ledger(
            events in prop::collection::vec((0u8..4, 0usize..3, 1i64..1_000_000), 1..12),
        ) {
            let f = setup();
            for event in &events {
                record_event(&f, *event);
            }

            let service = BalanceService::new(&f.storage);
            let balances = service.get_all_balances(f.mess, f.ids[0]).unwrap();
            let fund = service.get_mess_fund_balance(f.mess).unwrap();

            for b in &balances {
                prop_assert_eq!(b.balance, b.contributed - b.fair_share + b.paid_from_pocket);
                prop_assert_eq!(b.status, BalanceStatus::classify(b.balance));
            }

            let total_balance: Money = balances.iter().map(|b| b.balance).sum();
            let total_share: Money = balances.iter().map(|b| b.fair_share).sum();
            let total_paid: Money = balances.iter().map(|b| b.paid_from_pocket).sum();

            // Shares cover every expense exactly, so the members' balances
            // add up to what the fund collected
            prop_assert_eq!(total_share, fund.total_expenses);
            prop_assert_eq!(total_paid, fund.total_expenses);
            prop_assert_eq!(total_balance, fund.total_collected);
            prop_assert_eq!(total_balance - total_paid, fund.balance);
        }
    }
}
