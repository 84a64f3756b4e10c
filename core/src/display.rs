/// Output formatting: denomination conversion and plain-text tables.
///
/// Amounts are held in nanos (9 decimal places). 1 unit = 1_000_000_000 nanos.
use crate::network::{Account, Transaction};
use crate::sync::Page;
use crate::web_data::WebData;

const NANOS_PER_UNIT: u64 = 1_000_000_000;

/// Convert nanos to a decimal string.
/// Examples: 1_500_000_000 -> "1.500000000", 0 -> "0.000000000"
#[must_use]
pub fn format_amount(nanos: u64) -> String {
    let whole = nanos / NANOS_PER_UNIT;
    let frac = nanos % NANOS_PER_UNIT;
    format!("{whole}.{frac:09}")
}

/// Parse a decimal amount string into nanos.
/// Accepts: "1.5" -> 1_500_000_000, "1" -> 1_000_000_000, "0.001" -> 1_000_000
///
/// Zero parses fine; callers that need a positive amount check for it.
#[must_use = "parsing result should be checked"]
pub fn parse_amount(input: &str) -> Result<u64, String> {
    let input = input.trim();

    if input.is_empty() {
        return Err("Amount cannot be empty".to_string());
    }

    if input.starts_with('-') {
        return Err("Amount must be positive".to_string());
    }

    let (whole_str, frac_str) = match input.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (input, ""),
    };
    if frac_str.contains('.') {
        return Err("Invalid amount format. Use decimal units like '1.5' or '0.001'.".to_string());
    }

    let whole: u64 = if whole_str.is_empty() {
        0
    } else {
        whole_str
            .parse()
            .map_err(|_| format!("Invalid whole part: '{whole_str}'"))?
    };

    let frac_nanos = if frac_str.is_empty() {
        // "1." is treated as "1.0"
        0
    } else if frac_str.len() > 9 {
        return Err("Too many decimal places. Up to 9 are supported.".to_string());
    } else if !frac_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("Invalid fractional part: '{frac_str}'"));
    } else {
        let padded = format!("{frac_str:0<9}");
        padded
            .parse::<u64>()
            .map_err(|_| format!("Invalid fractional part: '{frac_str}'"))?
    };

    whole
        .checked_mul(NANOS_PER_UNIT)
        .and_then(|w| w.checked_add(frac_nanos))
        .ok_or_else(|| "Amount too large".to_string())
}

/// Shorten a long hex address to `0x1234…abcd`.
#[must_use]
pub fn abbreviate(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 14 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}

/// Balances table: address, available, locked, total.
#[must_use]
pub fn format_accounts(accounts: &[Account]) -> String {
    if accounts.is_empty() {
        return "No accounts.".to_string();
    }

    let mut lines = Vec::with_capacity(accounts.len() + 1);
    lines.push(format!(
        "{:<4} {:<66} {:>22} {:>22} {:>22}",
        "#", "Address", "Available", "Locked", "Total"
    ));
    for (idx, account) in accounts.iter().enumerate() {
        lines.push(format!(
            "{:<4} {:<66} {:>22} {:>22} {:>22}",
            idx,
            account.address,
            format_amount(account.available),
            format_amount(account.locked),
            format_amount(account.total()),
        ));
    }
    lines.join("\n")
}

/// One page of history. Rows are numbered downwards from the page's window
/// end, so the newest row of a full page carries the highest number.
#[must_use]
pub fn format_transactions(page: &Page, txs: &[Transaction]) -> String {
    if txs.is_empty() {
        return "No transactions found.".to_string();
    }

    let mut lines = Vec::with_capacity(txs.len());
    for (idx, tx) in txs.iter().enumerate() {
        let number = page.to.saturating_sub(idx as u64);
        let direction = if tx.from == page.address {
            format!("-> {}", abbreviate(&tx.to))
        } else {
            format!("<- {}", abbreviate(&tx.from))
        };
        let memo = if tx.memo.is_empty() {
            String::new()
        } else {
            format!("  \"{}\"", tx.memo)
        };
        lines.push(format!(
            "{number:>5}  {:<8}  {direction:<18}  {:>20}  {}{memo}",
            tx.kind.to_string(),
            format_amount(tx.value),
            tx.timestamp.format("%Y-%m-%d %H:%M:%S"),
        ));
    }
    lines.join("\n")
}

/// Render any fetch state with the same four-way wording the views use.
#[must_use]
pub fn render<T>(data: &WebData<T>, loading: &str, succeeded: impl FnOnce(&T) -> String) -> String {
    data.as_ref().fold(
        String::new,
        || loading.to_string(),
        succeeded,
        |msg| format!("Error: {msg}"),
    )
}
