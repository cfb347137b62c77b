//! Balance computation and greedy debt settlement.
//!
//! Everything here is a pure function of the expense snapshot handed in; no
//! state is kept between calls, so a report can be computed concurrently from
//! any number of callers.

use super::expense::Expense;
use super::member::{Member, MemberMap};
use super::money::Balance;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;

/// Balances closer to zero than this are treated as settled.
pub const SETTLEMENT_EPSILON: Decimal = dec!(0.01);

/// How suggested transfer amounts are rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Keep the exact transfer amount.
    Exact,
    /// Round half away from zero to the given number of decimal places.
    DecimalPlaces(u32),
}

impl Default for Rounding {
    fn default() -> Self {
        Rounding::DecimalPlaces(0)
    }
}

impl Rounding {
    pub fn apply(&self, value: Decimal) -> Decimal {
        match self {
            Rounding::Exact => value,
            Rounding::DecimalPlaces(dp) => {
                value.round_dp_with_strategy(*dp, RoundingStrategy::MidpointAwayFromZero)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementPolicy {
    pub epsilon: Decimal,
    pub rounding: Rounding,
}

impl Default for SettlementPolicy {
    fn default() -> Self {
        Self {
            epsilon: SETTLEMENT_EPSILON,
            rounding: Rounding::default(),
        }
    }
}

/// A suggested payment from a debtor to a creditor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transfer {
    pub from: Member,
    pub to: Member,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementReport {
    pub total_amount: Decimal,
    pub member_paid: MemberMap<Balance>,
    pub member_share: MemberMap<Balance>,
    pub member_balance: MemberMap<Balance>,
    pub transactions: Vec<Transfer>,
}

impl Default for SettlementReport {
    fn default() -> Self {
        Self {
            total_amount: Decimal::ZERO,
            member_paid: MemberMap::default(),
            member_share: MemberMap::default(),
            member_balance: MemberMap::default(),
            transactions: Vec::new(),
        }
    }
}

impl SettlementReport {
    /// Members who paid for or took part in at least one active expense.
    pub fn involved_members(&self) -> Vec<Member> {
        Member::ALL
            .into_iter()
            .filter(|&m| {
                self.member_paid[m] != Balance::ZERO || self.member_share[m] != Balance::ZERO
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.total_amount.is_zero() && self.transactions.is_empty()
    }
}

/// Computes who paid what, who owes what, and how to settle up.
///
/// Inactive expenses are skipped. An empty snapshot yields an empty report.
pub fn compute_summary(expenses: &[Expense], policy: &SettlementPolicy) -> SettlementReport {
    let mut report = SettlementReport::default();

    for expense in expenses.iter().filter(|e| e.is_active) {
        let amount: Balance = expense.amount.into();
        report.total_amount += amount.value();
        report.member_paid[expense.paid_by] += amount;

        // Creation rejects empty participant lists; guard the division anyway
        if expense.participants.is_empty() {
            continue;
        }
        let share = expense.amount.share(expense.participants.len());
        for &participant in &expense.participants {
            report.member_share[participant] += share;
        }
    }

    for member in Member::ALL {
        report.member_balance[member] = report.member_paid[member] - report.member_share[member];
    }

    report.transactions = settle(&report.member_balance, policy);
    report
}

/// Greedy two-pointer matching of the largest debtor against the largest
/// creditor.
///
/// Not guaranteed to use the fewest possible transfers, but deterministic:
/// ties are broken by member order.
pub fn settle(balances: &MemberMap<Balance>, policy: &SettlementPolicy) -> Vec<Transfer> {
    let epsilon = policy.epsilon;

    let mut debtors: Vec<(Member, Decimal)> = balances
        .iter()
        .filter(|(_, b)| b.value() < Decimal::ZERO && !b.is_settled(epsilon))
        .map(|(m, b)| (m, b.value()))
        .collect();
    debtors.sort_by(|a, b| a.1.cmp(&b.1));

    let mut creditors: Vec<(Member, Decimal)> = balances
        .iter()
        .filter(|(_, b)| b.value() > Decimal::ZERO && !b.is_settled(epsilon))
        .map(|(m, b)| (m, b.value()))
        .collect();
    creditors.sort_by(|a, b| b.1.cmp(&a.1));

    let mut transfers = Vec::new();
    let (mut d, mut c) = (0, 0);
    let mut debt_left = debtors.first().map_or(Decimal::ZERO, |(_, b)| b.abs());
    let mut credit_left = creditors.first().map_or(Decimal::ZERO, |(_, b)| *b);

    while d < debtors.len() && c < creditors.len() {
        let transfer = debt_left.min(credit_left);
        let amount = policy.rounding.apply(transfer);
        if !amount.is_zero() {
            transfers.push(Transfer {
                from: debtors[d].0,
                to: creditors[c].0,
                amount,
            });
        }

        debt_left -= transfer;
        credit_left -= transfer;

        if debt_left.abs() < epsilon {
            d += 1;
            debt_left = debtors.get(d).map_or(Decimal::ZERO, |(_, b)| b.abs());
        }
        if credit_left.abs() < epsilon {
            c += 1;
            credit_left = creditors.get(c).map_or(Decimal::ZERO, |(_, b)| *b);
        }
    }

    transfers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::expense::{ExpenseDraft, ExpenseId};
    use crate::domain::money::Amount;
    use rust_decimal_macros::dec;

    fn expense(id: u64, amount: Decimal, paid_by: Member, participants: &[Member]) -> Expense {
        Expense::from_draft(
            ExpenseId(id),
            ExpenseDraft {
                amount: Amount::new(amount).unwrap(),
                description: format!("expense {}", id),
                paid_by,
                participants: participants.to_vec(),
                is_active: true,
            },
        )
    }

    fn exact() -> SettlementPolicy {
        SettlementPolicy {
            rounding: Rounding::Exact,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_input_yields_empty_report() {
        let report = compute_summary(&[], &SettlementPolicy::default());
        assert_eq!(report, SettlementReport::default());
        assert!(report.is_empty());
        assert!(report.involved_members().is_empty());
    }

    #[test]
    fn test_three_member_scenario() {
        use Member::{Binh as B, Hong as A, Minh as C};
        let expenses = vec![
            expense(1, dec!(300), A, &[A, B, C]),
            expense(2, dec!(150), B, &[B, C]),
        ];

        let report = compute_summary(&expenses, &SettlementPolicy::default());

        assert_eq!(report.total_amount, dec!(450));
        assert_eq!(report.member_paid[A], Balance::new(dec!(300)));
        assert_eq!(report.member_paid[B], Balance::new(dec!(150)));
        assert_eq!(report.member_paid[C], Balance::ZERO);
        assert_eq!(report.member_share[A], Balance::new(dec!(100)));
        assert_eq!(report.member_share[B], Balance::new(dec!(175)));
        assert_eq!(report.member_share[C], Balance::new(dec!(175)));
        assert_eq!(report.member_balance[A], Balance::new(dec!(200)));
        assert_eq!(report.member_balance[B], Balance::new(dec!(-25)));
        assert_eq!(report.member_balance[C], Balance::new(dec!(-175)));

        assert_eq!(
            report.transactions,
            vec![
                Transfer {
                    from: C,
                    to: A,
                    amount: dec!(175)
                },
                Transfer {
                    from: B,
                    to: A,
                    amount: dec!(25)
                },
            ]
        );
        assert_eq!(report.involved_members(), vec![A, B, C]);
    }

    #[test]
    fn test_self_paid_expense_needs_no_transfers() {
        let report = compute_summary(
            &[expense(1, dec!(100), Member::Hong, &[Member::Hong])],
            &SettlementPolicy::default(),
        );
        assert!(report.member_balance.values().all(|b| *b == Balance::ZERO));
        assert!(report.transactions.is_empty());
        assert_eq!(report.total_amount, dec!(100));
    }

    #[test]
    fn test_inactive_expenses_are_ignored() {
        let mut removed = expense(2, dec!(999), Member::Hai, &[Member::Hai, Member::Quan]);
        removed.is_active = false;
        let expenses = vec![
            expense(1, dec!(50), Member::Tuan, &[Member::Tuan, Member::Thang]),
            removed,
        ];

        let report = compute_summary(&expenses, &SettlementPolicy::default());
        assert_eq!(report.total_amount, dec!(50));
        assert_eq!(report.member_paid[Member::Hai], Balance::ZERO);
        assert_eq!(
            report.transactions,
            vec![Transfer {
                from: Member::Thang,
                to: Member::Tuan,
                amount: dec!(25)
            }]
        );
    }

    #[test]
    fn test_participant_only_member_has_negative_balance() {
        let report = compute_summary(
            &[expense(1, dec!(90), Member::Binh, &[Member::Binh, Member::Other])],
            &SettlementPolicy::default(),
        );
        assert_eq!(report.member_paid[Member::Other], Balance::ZERO);
        assert_eq!(report.member_balance[Member::Other], Balance::new(dec!(-45)));
    }

    #[test]
    fn test_duplicate_participant_counts_twice() {
        let report = compute_summary(
            &[expense(
                1,
                dec!(90),
                Member::Hong,
                &[Member::Hong, Member::Binh, Member::Binh],
            )],
            &SettlementPolicy::default(),
        );
        assert_eq!(report.member_share[Member::Binh], Balance::new(dec!(60)));
        assert_eq!(report.member_balance[Member::Hong], Balance::new(dec!(60)));
    }

    #[test]
    fn test_balances_sum_to_zero_with_uneven_division() {
        let expenses = vec![
            expense(1, dec!(100), Member::Hong, &[Member::Hong, Member::Binh, Member::Minh]),
            expense(2, dec!(10), Member::Minh, &[Member::Hong, Member::Binh, Member::Minh]),
        ];
        let report = compute_summary(&expenses, &exact());
        let total: Balance = report.member_balance.values().sum();
        assert!(total.is_settled(SETTLEMENT_EPSILON));
    }

    #[test]
    fn test_exact_transfers_settle_every_balance() {
        let expenses = vec![
            expense(1, dec!(100), Member::Hong, &[Member::Hong, Member::Binh, Member::Minh]),
            expense(2, dec!(47.5), Member::Binh, &[Member::Binh, Member::Tuan]),
            expense(3, dec!(12), Member::Tuan, &[Member::Hong, Member::Tuan, Member::Hai]),
        ];
        let report = compute_summary(&expenses, &exact());

        let mut remaining = report.member_balance;
        for transfer in &report.transactions {
            remaining[transfer.from] += Balance::new(transfer.amount);
            remaining[transfer.to] -= Balance::new(transfer.amount);
        }
        assert!(remaining.values().all(|b| b.is_settled(SETTLEMENT_EPSILON)));
    }

    #[test]
    fn test_whole_unit_rounding() {
        let expenses = vec![expense(
            1,
            dec!(100),
            Member::Hong,
            &[Member::Hong, Member::Binh, Member::Minh],
        )];
        let report = compute_summary(&expenses, &SettlementPolicy::default());

        // 33.33... each, rounded to whole units
        assert_eq!(report.transactions.len(), 2);
        assert!(report.transactions.iter().all(|t| t.amount == dec!(33)));
        assert!(report.transactions.iter().all(|t| t.to == Member::Hong));
    }

    #[test]
    fn test_settle_skips_balances_within_epsilon() {
        let mut balances: MemberMap<Balance> = MemberMap::default();
        balances[Member::Hong] = Balance::new(dec!(0.005));
        balances[Member::Binh] = Balance::new(dec!(-0.005));
        assert!(settle(&balances, &SettlementPolicy::default()).is_empty());
    }

    #[test]
    fn test_settle_largest_first_ordering() {
        let mut balances: MemberMap<Balance> = MemberMap::default();
        balances[Member::Hong] = Balance::new(dec!(30));
        balances[Member::Binh] = Balance::new(dec!(70));
        balances[Member::Minh] = Balance::new(dec!(-60));
        balances[Member::Tuan] = Balance::new(dec!(-40));

        let transfers = settle(&balances, &SettlementPolicy::default());
        assert_eq!(
            transfers,
            vec![
                Transfer {
                    from: Member::Minh,
                    to: Member::Binh,
                    amount: dec!(60)
                },
                Transfer {
                    from: Member::Tuan,
                    to: Member::Binh,
                    amount: dec!(10)
                },
                Transfer {
                    from: Member::Tuan,
                    to: Member::Hong,
                    amount: dec!(30)
                },
            ]
        );
    }

    #[test]
    fn test_rounding_modes() {
        assert_eq!(Rounding::default().apply(dec!(2.5)), dec!(3));
        assert_eq!(Rounding::default().apply(dec!(2.49)), dec!(2));
        assert_eq!(Rounding::DecimalPlaces(2).apply(dec!(1.005)), dec!(1.01));
        assert_eq!(Rounding::Exact.apply(dec!(1.005)), dec!(1.005));
    }
}
