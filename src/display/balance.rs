//! Balance and settlement display formatting

use crate::models::{BalanceBreakdown, BalanceStatus, FundBalance, SettlementSuggestion};

use super::fit;

fn status_label(status: BalanceStatus) -> &'static str {
    match status {
        BalanceStatus::Settled => "settled",
        BalanceStatus::Owed => "is owed",
        BalanceStatus::Owes => "owes",
    }
}

/// Format a single member's balance with its components
pub fn format_balance_details(balance: &BalanceBreakdown, symbol: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Balance for {}\n", balance.member_name));
    output.push_str(&format!(
        "  Contributed:       {:>12}\n",
        balance.contributed.format_with_symbol(symbol)
    ));
    output.push_str(&format!(
        "  Fair share:        {:>12}\n",
        balance.fair_share.format_with_symbol(symbol)
    ));
    output.push_str(&format!(
        "  Paid from pocket:  {:>12}\n",
        balance.paid_from_pocket.format_with_symbol(symbol)
    ));
    output.push_str(&format!("  {}\n", "-".repeat(32)));
    output.push_str(&format!(
        "  Balance:           {:>12}  ({})\n",
        balance.balance.format_with_symbol(symbol),
        status_label(balance.status)
    ));

    output
}

/// Format every member's balance as a table
pub fn format_balance_table(balances: &[BalanceBreakdown], symbol: &str) -> String {
    if balances.is_empty() {
        return "No members found.\n".to_string();
    }

    let name_width = balances
        .iter()
        .map(|b| b.member_name.chars().count())
        .max()
        .unwrap_or(6)
        .clamp(6, 24);

    let mut output = String::new();
    output.push_str(&format!(
        "{}  {:>12}  {:>12}  {:>12}  {:>12}  {}\n",
        fit("Member", name_width),
        "Contributed",
        "Fair share",
        "Paid",
        "Balance",
        "Status"
    ));
    output.push_str(&"-".repeat(name_width + 68));
    output.push('\n');

    for b in balances {
        output.push_str(&format!(
            "{}  {:>12}  {:>12}  {:>12}  {:>12}  {}\n",
            fit(&b.member_name, name_width),
            b.contributed.format_with_symbol(symbol),
            b.fair_share.format_with_symbol(symbol),
            b.paid_from_pocket.format_with_symbol(symbol),
            b.balance.format_with_symbol(symbol),
            status_label(b.status)
        ));
    }

    output
}

/// Format pooled-fund totals
pub fn format_fund_balance(mess_name: &str, fund: &FundBalance, symbol: &str) -> String {
    let mut output = String::new();
    output.push_str(&format!("Fund for {}\n", mess_name));
    output.push_str(&format!(
        "  Collected (net):  {:>12}\n",
        fund.total_collected.format_with_symbol(symbol)
    ));
    output.push_str(&format!(
        "  Refunded:         {:>12}\n",
        fund.total_refunded.format_with_symbol(symbol)
    ));
    output.push_str(&format!(
        "  Expenses:         {:>12}\n",
        fund.total_expenses.format_with_symbol(symbol)
    ));
    output.push_str(&format!(
        "  Balance:          {:>12}\n",
        fund.balance.format_with_symbol(symbol)
    ));
    output
}

/// Format settlement suggestions as "from pays to" lines
pub fn format_settlements(suggestions: &[SettlementSuggestion], symbol: &str) -> String {
    if suggestions.is_empty() {
        return "Everyone is settled up.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!("Suggested settlements ({}):\n", suggestions.len()));
    for (i, s) in suggestions.iter().enumerate() {
        output.push_str(&format!(
            "  {}. {} pays {} {}\n",
            i + 1,
            s.from_name,
            s.to_name,
            s.amount.format_with_symbol(symbol)
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MemberId, Money};

    #[test]
    fn test_balance_details() {
        let breakdown = BalanceBreakdown::from_parts(
            MemberId::new(),
            "Bob",
            Money::from_cents(2000),
            Money::from_cents(3000),
            Money::from_cents(9000),
        );
        let output = format_balance_details(&breakdown, "$");

        assert!(output.contains("Balance for Bob"));
        assert!(output.contains("$80.00"));
        assert!(output.contains("is owed"));
    }

    #[test]
    fn test_settlements() {
        let suggestion = SettlementSuggestion {
            from: MemberId::new(),
            from_name: "Carol".into(),
            to: MemberId::new(),
            to_name: "Owner".into(),
            amount: Money::from_cents(5500),
        };
        let output = format_settlements(&[suggestion], "€");
        assert!(output.contains("1. Carol pays Owner €55.00"));

        assert_eq!(format_settlements(&[], "$"), "Everyone is settled up.\n");
    }

    #[test]
    fn test_balance_table_shows_negative_amounts() {
        let breakdown = BalanceBreakdown::from_parts(
            MemberId::new(),
            "Carol",
            Money::zero(),
            Money::from_cents(1050),
            Money::zero(),
        );
        let output = format_balance_table(&[breakdown], "$");
        assert!(output.contains("-$10.50"));
        assert!(output.contains("owes"));
    }
}
