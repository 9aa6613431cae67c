//! Expense display formatting
//!
//! Formats expense lists and single expenses with their splits.

use std::collections::HashMap;

use crate::models::{Expense, MemberId};

use super::fit;

fn name(names: &HashMap<MemberId, String>, id: &MemberId) -> String {
    names.get(id).cloned().unwrap_or_else(|| id.to_string())
}

/// Format expenses as a register, newest first as given
pub fn format_expense_list(
    expenses: &[Expense],
    names: &HashMap<MemberId, String>,
    symbol: &str,
) -> String {
    if expenses.is_empty() {
        return "No expenses found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:12}  {:10}  {}  {}  {:>12}  {}\n",
        "ID",
        "Date",
        fit("Description", 24),
        fit("Paid by", 12),
        "Amount",
        "Split"
    ));
    output.push_str(&"-".repeat(84));
    output.push('\n');

    for expense in expenses {
        output.push_str(&format!(
            "{:12}  {:10}  {}  {}  {:>12}  {} ({})\n",
            expense.id.to_string(),
            expense.date.format("%Y-%m-%d"),
            fit(&expense.description, 24),
            fit(&name(names, &expense.paid_by), 12),
            expense.amount.format_with_symbol(symbol),
            expense.split_method,
            expense.splits.len()
        ));
    }

    let total: crate::models::Money = expenses.iter().map(|e| e.amount).sum();
    output.push_str(&"-".repeat(84));
    output.push('\n');
    output.push_str(&format!(
        "{:12}  {:10}  {}  {}  {:>12}\n",
        "TOTAL",
        "",
        fit("", 24),
        fit("", 12),
        total.format_with_symbol(symbol)
    ));

    output
}

/// Format one expense with its splits
pub fn format_expense_details(
    expense: &Expense,
    names: &HashMap<MemberId, String>,
    symbol: &str,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("Expense:     {}\n", expense.id));
    output.push_str(&format!("Date:        {}\n", expense.date.format("%Y-%m-%d")));
    output.push_str(&format!("Description: {}\n", expense.description));
    output.push_str(&format!("Category:    {}\n", expense.category));
    output.push_str(&format!(
        "Amount:      {}\n",
        expense.amount.format_with_symbol(symbol)
    ));
    output.push_str(&format!("Paid by:     {}\n", name(names, &expense.paid_by)));
    output.push_str(&format!("Logged by:   {}\n", name(names, &expense.created_by)));
    output.push_str(&format!("Split:       {}\n", expense.split_method));

    output.push_str("\nShares:\n");
    for split in &expense.splits {
        output.push_str(&format!(
            "  {}  {:>12}  {:>6.2}%\n",
            fit(&name(names, &split.member_id), 16),
            split.amount.format_with_symbol(symbol),
            split.percentage
        ));
    }

    output
}
