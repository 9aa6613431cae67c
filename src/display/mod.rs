//! Display formatting for terminal output
//!
//! Every formatter returns a `String`; printing is left to the CLI layer.
//! Money is rendered with the configured currency symbol.

pub mod balance;
pub mod expense;
pub mod fund;
pub mod mess;

pub use balance::{
    format_balance_details, format_balance_table, format_fund_balance, format_settlements,
};
pub use expense::{format_expense_details, format_expense_list};
pub use fund::format_fund_records;
pub use mess::{format_member_list, format_mess_details, format_mess_list};

/// Pad or cut a string to exactly `width` characters
pub(crate) fn fit(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len <= width {
        format!("{:width$}", s, width = width)
    } else if width <= 3 {
        s.chars().take(width).collect()
    } else {
        let cut: String = s.chars().take(width - 3).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdefgh", 6), "abc...");
        assert_eq!(fit("Crème brûlée", 8), "Crème...");
    }
}
