use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::ledger::{Trade, TradeSide};

/// Point-in-time position emitted by the replay fold
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub symbol: String,
    pub quantity: Decimal,
    pub average_cost: Decimal,
    pub invested_value: Decimal,
}

/// Running position for a single symbol during replay
#[derive(Debug, Default)]
struct RunningPosition {
    quantity: Decimal,
    invested_value: Decimal,
}

impl RunningPosition {
    /// Apply one trade under the source accounting rule: a sell reduces
    /// invested value at the sale price (not at average cost), and any
    /// trade that brings the net quantity to zero resets invested value
    /// to zero outright.
    fn apply(&mut self, trade: &Trade) {
        match trade.side {
            TradeSide::Buy => {
                self.quantity += trade.quantity;
                if self.quantity.is_zero() {
                    self.invested_value = Decimal::ZERO;
                } else {
                    self.invested_value += trade.quantity * trade.price;
                }
            }
            TradeSide::Sell => {
                self.quantity -= trade.quantity;
                if self.quantity.is_zero() {
                    self.invested_value = Decimal::ZERO;
                } else {
                    self.invested_value -= trade.quantity * trade.price;
                }
            }
        }
    }
}

/// Replay trades dated within `[start, cutoff]` into a holdings snapshot.
///
/// Trades must arrive in non-decreasing date order (same-day rows in file
/// order), which `TradeLedger` guarantees. Symbols whose net quantity ends
/// at or below zero are dropped: fully exited, or an unsupported short.
/// Output is sorted by symbol ascending.
pub fn replay(trades: &[Trade], start: NaiveDate, cutoff: NaiveDate) -> Vec<Holding> {
    let mut positions: BTreeMap<&str, RunningPosition> = BTreeMap::new();

    for trade in trades
        .iter()
        .filter(|t| t.trade_date >= start && t.trade_date <= cutoff)
    {
        positions
            .entry(trade.symbol.as_str())
            .or_default()
            .apply(trade);
    }

    positions
        .into_iter()
        .filter(|(_, position)| position.quantity > Decimal::ZERO)
        .map(|(symbol, position)| Holding {
            symbol: symbol.to_string(),
            average_cost: position.invested_value / position.quantity,
            quantity: position.quantity,
            invested_value: position.invested_value,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 5, d).unwrap()
    }

    fn buy(day: u32, symbol: &str, qty: i64, price: i64) -> Trade {
        Trade {
            trade_date: date(day),
            symbol: symbol.to_string(),
            side: TradeSide::Buy,
            quantity: Decimal::from(qty),
            price: Decimal::from(price),
        }
    }

    fn sell(day: u32, symbol: &str, qty: i64, price: i64) -> Trade {
        Trade {
            trade_date: date(day),
            symbol: symbol.to_string(),
            side: TradeSide::Sell,
            quantity: Decimal::from(qty),
            price: Decimal::from(price),
        }
    }

    #[test]
    fn test_partial_sell_reduces_at_sale_price() {
        // buy 10@100 then sell 4@120: invested = 1000 - 480 = 520,
        // average cost = 520/6 = 86.67 - the sale price, not the running
        // average, is what comes out of invested value.
        let trades = vec![buy(1, "RELIANCE", 10, 100), sell(3, "RELIANCE", 4, 120)];
        let holdings = replay(&trades, date(1), date(3));

        assert_eq!(holdings.len(), 1);
        let h = &holdings[0];
        assert_eq!(h.quantity, dec!(6));
        assert_eq!(h.invested_value, dec!(520));
        assert_eq!(h.average_cost.round_dp(2), dec!(86.67));
    }

    #[test]
    fn test_full_exit_resets_invested_value() {
        // buy 10@100 then sell 10@150: the position vanishes and the cost
        // basis is reset to zero, not left at 1000 - 1500 = -500.
        let trades = vec![buy(1, "TCS", 10, 100), sell(3, "TCS", 10, 150)];
        assert!(replay(&trades, date(1), date(3)).is_empty());

        // Re-entering after the exit starts from a clean basis.
        let mut trades = trades;
        trades.push(buy(5, "TCS", 4, 200));
        let holdings = replay(&trades, date(1), date(5));
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].quantity, dec!(4));
        assert_eq!(holdings[0].invested_value, dec!(800));
        assert_eq!(holdings[0].average_cost, dec!(200));
    }

    #[test]
    fn test_invariant_invested_equals_quantity_times_average() {
        let trades = vec![
            buy(1, "INFY", 10, 650),
            buy(2, "INFY", 5, 700),
            sell(4, "INFY", 3, 710),
        ];
        let holdings = replay(&trades, date(1), date(30));

        for h in &holdings {
            assert!(h.quantity > Decimal::ZERO);
            assert_eq!(h.invested_value, h.quantity * h.average_cost);
        }
    }

    #[test]
    fn test_cutoff_excludes_later_trades() {
        let trades = vec![buy(1, "INFY", 10, 650), sell(5, "INFY", 10, 700)];

        // As of day 3 the sell has not happened yet.
        let holdings = replay(&trades, date(1), date(3));
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].quantity, dec!(10));

        // As of day 5 the position is fully exited.
        assert!(replay(&trades, date(1), date(5)).is_empty());
    }

    #[test]
    fn test_trades_before_start_are_ignored() {
        let trades = vec![buy(1, "INFY", 10, 650), buy(10, "INFY", 5, 700)];
        let holdings = replay(&trades, date(5), date(30));

        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].quantity, dec!(5));
        assert_eq!(holdings[0].invested_value, dec!(3500));
    }

    #[test]
    fn test_output_sorted_by_symbol() {
        let trades = vec![
            buy(1, "TCS", 1, 2000),
            buy(1, "INFY", 1, 650),
            buy(1, "RELIANCE", 1, 1400),
        ];
        let holdings = replay(&trades, date(1), date(1));

        let symbols: Vec<&str> = holdings.iter().map(|h| h.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["INFY", "RELIANCE", "TCS"]);
    }

    #[test]
    fn test_oversold_symbol_dropped_silently() {
        // Net quantity below zero: treated as fully exited/invalid short,
        // not an error.
        let trades = vec![buy(1, "INFY", 5, 650), sell(2, "INFY", 8, 660)];
        assert!(replay(&trades, date(1), date(2)).is_empty());
    }

    #[test]
    fn test_successive_cutoffs_apply_only_new_trades() {
        let trades = vec![
            buy(1, "INFY", 10, 650),
            sell(3, "INFY", 4, 660),
            buy(6, "INFY", 2, 640),
        ];

        let at_day3 = replay(&trades, date(1), date(3));
        let at_day6 = replay(&trades, date(1), date(6));

        // Day-6 snapshot equals the day-3 snapshot with the (3, 6] trades
        // folded on top.
        assert_eq!(at_day3[0].quantity, dec!(6));
        assert_eq!(at_day6[0].quantity, dec!(6) + dec!(2));
        assert_eq!(
            at_day6[0].invested_value,
            at_day3[0].invested_value + dec!(2) * dec!(640)
        );
    }
}
