//! CSV export
//!
//! One row per member balance or per suggested transfer. Amounts are plain
//! decimals so spreadsheets can sum them.

use std::io::Write;

use crate::error::{MessMateError, MessMateResult};
use crate::models::{BalanceBreakdown, SettlementSuggestion};

fn export_err(e: csv::Error) -> MessMateError {
    MessMateError::Export(e.to_string())
}

/// Write member balances as CSV
pub fn write_balances_csv<W: Write>(
    balances: &[BalanceBreakdown],
    writer: &mut W,
) -> MessMateResult<()> {
    let mut csv = csv::Writer::from_writer(writer);

    csv.write_record([
        "Member ID",
        "Member",
        "Contributed",
        "Fair Share",
        "Paid From Pocket",
        "Balance",
        "Status",
    ])
    .map_err(export_err)?;

    for b in balances {
        csv.write_record([
            b.member_id.as_uuid().to_string(),
            b.member_name.clone(),
            b.contributed.to_decimal_string(),
            b.fair_share.to_decimal_string(),
            b.paid_from_pocket.to_decimal_string(),
            b.balance.to_decimal_string(),
            b.status.to_string(),
        ])
        .map_err(export_err)?;
    }

    csv.flush().map_err(|e| MessMateError::Export(e.to_string()))
}

/// Write settlement suggestions as CSV
pub fn write_settlements_csv<W: Write>(
    suggestions: &[SettlementSuggestion],
    writer: &mut W,
) -> MessMateResult<()> {
    let mut csv = csv::Writer::from_writer(writer);

    csv.write_record(["From", "To", "Amount"])
        .map_err(export_err)?;

    for s in suggestions {
        csv.write_record([
            s.from_name.as_str(),
            s.to_name.as_str(),
            s.amount.to_decimal_string().as_str(),
        ])
        .map_err(export_err)?;
    }

    csv.flush().map_err(|e| MessMateError::Export(e.to_string()))
}
