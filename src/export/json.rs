//! JSON export
//!
//! Balance and settlement reports with a small versioned header.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::error::{MessMateError, MessMateResult};
use crate::models::{BalanceBreakdown, FundBalance, MemberId, MessId, SettlementSuggestion};
use crate::services::{BalanceService, MessService};
use crate::storage::Storage;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Header fields shared by every report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportHeader {
    /// Schema version for compatibility checking
    pub schema_version: String,
    pub exported_at: DateTime<Utc>,
    /// Application version that created the export
    pub app_version: String,
    pub mess_id: MessId,
    pub mess_name: String,
}

impl ExportHeader {
    fn for_mess(storage: &Storage, mess_id: MessId) -> MessMateResult<Self> {
        let mess = MessService::new(storage).require(mess_id)?;
        Ok(Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            mess_id,
            mess_name: mess.name,
        })
    }
}

/// Every member's balance plus the fund totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceExport {
    #[serde(flatten)]
    pub header: ExportHeader,
    pub fund: FundBalance,
    pub balances: Vec<BalanceBreakdown>,
}

impl BalanceExport {
    /// Build the report; requires an owner or admin
    pub fn build(storage: &Storage, mess_id: MessId, requester: MemberId) -> MessMateResult<Self> {
        let service = BalanceService::new(storage);
        let balances = service.get_all_balances(mess_id, requester)?;
        Ok(Self {
            header: ExportHeader::for_mess(storage, mess_id)?,
            fund: service.get_mess_fund_balance(mess_id)?,
            balances,
        })
    }
}

/// Suggested settlement transfers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementExport {
    #[serde(flatten)]
    pub header: ExportHeader,
    pub settlements: Vec<SettlementSuggestion>,
}

impl SettlementExport {
    /// Build the report; requires an owner or admin
    pub fn build(storage: &Storage, mess_id: MessId, requester: MemberId) -> MessMateResult<Self> {
        let settlements = BalanceService::new(storage).settlement_suggestions(mess_id, requester)?;
        Ok(Self {
            header: ExportHeader::for_mess(storage, mess_id)?,
            settlements,
        })
    }
}

/// Write a report as pretty-printed JSON
pub fn write_json<T: Serialize, W: Write>(report: &T, writer: &mut W) -> MessMateResult<()> {
    serde_json::to_writer_pretty(&mut *writer, report)
        .map_err(|e| MessMateError::Export(e.to_string()))?;
    writeln!(writer).map_err(|e| MessMateError::Export(e.to_string()))?;
    Ok(())
}
