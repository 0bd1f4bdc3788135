use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Trade side (buy or sell)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Buy => "buy",
            TradeSide::Sell => "sell",
        }
    }
}

impl FromStr for TradeSide {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" | "b" => Ok(TradeSide::Buy),
            "sell" | "s" => Ok(TradeSide::Sell),
            _ => Err(()),
        }
    }
}

/// A single tradebook entry, immutable once loaded
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trade {
    pub trade_date: NaiveDate,
    pub symbol: String,
    pub side: TradeSide,
    pub quantity: Decimal,
    pub price: Decimal,
}

/// Voucher classification on a cash ledger row
///
/// Only bank receipts and payments feed invested capital; everything else
/// (brokerage journals, settlement vouchers) passes through untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum VoucherType {
    BankReceipts,
    BankPayments,
    Other(String),
}

impl VoucherType {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "Bank Receipts" => VoucherType::BankReceipts,
            "Bank Payments" => VoucherType::BankPayments,
            other => VoucherType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            VoucherType::BankReceipts => "Bank Receipts",
            VoucherType::BankPayments => "Bank Payments",
            VoucherType::Other(s) => s,
        }
    }
}

/// A single cash ledger entry with the broker's running net balance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CashEntry {
    pub posting_date: NaiveDate,
    pub voucher: VoucherType,
    pub debit: Decimal,
    pub credit: Decimal,
    pub net_balance: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_side_conversions() {
        assert_eq!(TradeSide::Buy.as_str(), "buy");
        assert_eq!(TradeSide::Sell.as_str(), "sell");

        assert_eq!("buy".parse::<TradeSide>().ok(), Some(TradeSide::Buy));
        assert_eq!("BUY".parse::<TradeSide>().ok(), Some(TradeSide::Buy));
        assert_eq!("b".parse::<TradeSide>().ok(), Some(TradeSide::Buy));
        assert_eq!("sell".parse::<TradeSide>().ok(), Some(TradeSide::Sell));
        assert_eq!(" Sell ".parse::<TradeSide>().ok(), Some(TradeSide::Sell));
        assert_eq!("s".parse::<TradeSide>().ok(), Some(TradeSide::Sell));

        assert_eq!("hold".parse::<TradeSide>().ok(), None);
        assert_eq!("".parse::<TradeSide>().ok(), None);
    }

    #[test]
    fn test_voucher_type_parse() {
        assert_eq!(
            VoucherType::parse("Bank Receipts"),
            VoucherType::BankReceipts
        );
        assert_eq!(
            VoucherType::parse(" Bank Payments "),
            VoucherType::BankPayments
        );
        assert_eq!(
            VoucherType::parse("Book Voucher"),
            VoucherType::Other("Book Voucher".to_string())
        );
        assert_eq!(VoucherType::parse("Book Voucher").as_str(), "Book Voucher");
    }
}
