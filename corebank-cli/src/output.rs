//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use corebank_core::OperationResult;
use rust_decimal::Decimal;
use serde::Serialize;

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Print `data` wrapped in a successful `OperationResult`
pub fn json<T: Serialize>(data: T) -> anyhow::Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(&OperationResult::ok(data))?
    );
    Ok(())
}

/// Print a failed `OperationResult`, carrying the error kind when known
pub fn json_error(err: &anyhow::Error) {
    let result: OperationResult<()> = match err.downcast_ref::<corebank_core::Error>() {
        Some(core_error) => OperationResult {
            error_kind: Some(core_error.kind().to_string()),
            ..OperationResult::fail(core_error.to_string())
        },
        None => OperationResult::fail(format!("{:#}", err)),
    };
    match serde_json::to_string_pretty(&result) {
        Ok(s) => println!("{}", s),
        Err(_) => error(&format!("{:#}", err)),
    }
}

/// Format an amount with thousands separators: `1,000,000.00`
pub fn format_money(amount: Decimal) -> String {
    let text = format!("{:.2}", amount);
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("{}{}.{}", sign, grouped, fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(Decimal::new(100_000_000, 2)), "1,000,000.00");
        assert_eq!(format_money(Decimal::new(75_000_000, 2)), "750,000.00");
        assert_eq!(format_money(Decimal::new(1_050, 2)), "10.50");
        assert_eq!(format_money(Decimal::ZERO), "0.00");
        assert_eq!(format_money(Decimal::new(-123_456, 2)), "-1,234.56");
    }
}
