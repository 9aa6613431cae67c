//! Fund record display formatting

use std::collections::HashMap;

use crate::models::{FundRecord, MemberId};

use super::fit;

/// Format fund records as a register
pub fn format_fund_records(
    records: &[FundRecord],
    names: &HashMap<MemberId, String>,
    symbol: &str,
) -> String {
    if records.is_empty() {
        return "No fund records found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:13}  {:10}  {:12}  {}  {:>12}  {}\n",
        "ID",
        "Date",
        "Kind",
        fit("Member", 16),
        "Amount",
        "Note"
    ));
    output.push_str(&"-".repeat(80));
    output.push('\n');

    for record in records {
        let member = names
            .get(&record.member_id)
            .cloned()
            .unwrap_or_else(|| record.member_id.to_string());

        output.push_str(&format!(
            "{:13}  {:10}  {:12}  {}  {:>12}  {}\n",
            record.id.to_string(),
            record.date.format("%Y-%m-%d"),
            record.kind.to_string(),
            fit(&member, 16),
            record.signed_amount().format_with_symbol(symbol),
            record.note
        ));
    }

    let net: crate::models::Money = records.iter().map(|r| r.signed_amount()).sum();
    output.push_str(&format!("\nNet collected: {}\n", net.format_with_symbol(symbol)));

    output
}
