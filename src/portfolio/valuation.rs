use anyhow::Context;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{Result, TrackerError};
use crate::instruments::InstrumentMap;
use crate::portfolio::Holding;
use crate::pricing::QuoteSource;

/// A holding priced against market data
#[derive(Debug, Clone, PartialEq)]
pub struct ValuedHolding {
    pub symbol: String,
    pub quantity: Decimal,
    pub average_cost: Decimal,
    pub invested_value: Decimal,
    pub last_price: Decimal,
    pub current_value: Decimal,
    pub pnl: Decimal,
    pub pct_change: Decimal,
}

/// A fully priced snapshot as of a date
#[derive(Debug, Clone, Default)]
pub struct ValuedPortfolio {
    pub as_of: Option<NaiveDate>,
    pub positions: Vec<ValuedHolding>,
}

impl ValuedPortfolio {
    pub fn total_invested(&self) -> Decimal {
        self.positions.iter().map(|p| p.invested_value).sum()
    }

    pub fn total_value(&self) -> Decimal {
        self.positions.iter().map(|p| p.current_value).sum()
    }

    pub fn total_pnl(&self) -> Decimal {
        self.positions.iter().map(|p| p.pnl).sum()
    }
}

/// Price a holdings snapshot as of `as_of`.
///
/// One quote lookup per instrument per call; callers running this daily
/// should layer a cache underneath the `QuoteSource` (see `QuoteService`).
/// The percentage change is a fraction, and a zero invested value is a
/// typed `UndefinedRatio` rather than a silent division.
pub async fn value_portfolio<Q: QuoteSource + ?Sized>(
    holdings: &[Holding],
    instruments: &InstrumentMap,
    quotes: &Q,
    as_of: NaiveDate,
) -> Result<ValuedPortfolio> {
    let mut positions = Vec::with_capacity(holdings.len());

    for holding in holdings {
        let code = instruments.market_code(&holding.symbol)?;
        let quote = quotes
            .quote_on_or_after(code, as_of)
            .await
            .with_context(|| format!("pricing {} ({}) as of {}", holding.symbol, code, as_of))?;

        let last_price = quote.close.round_dp(2);
        let current_value = last_price * holding.quantity;
        let pnl = current_value - holding.invested_value;

        if holding.invested_value.is_zero() {
            return Err(TrackerError::UndefinedRatio { what: "% change" }).with_context(|| {
                format!(
                    "{} has zero invested value as of {}",
                    holding.symbol, as_of
                )
            });
        }
        let pct_change = pnl / holding.invested_value;

        positions.push(ValuedHolding {
            symbol: holding.symbol.clone(),
            quantity: holding.quantity,
            average_cost: holding.average_cost,
            invested_value: holding.invested_value,
            last_price,
            current_value,
            pnl,
            pct_change,
        });
    }

    Ok(ValuedPortfolio {
        as_of: Some(as_of),
        positions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::StaticQuotes;
    use rust_decimal_macros::dec;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 5, d).unwrap()
    }

    fn holding(symbol: &str, qty: Decimal, invested: Decimal) -> Holding {
        Holding {
            symbol: symbol.to_string(),
            quantity: qty,
            average_cost: invested / qty,
            invested_value: invested,
        }
    }

    fn nse_map() -> InstrumentMap {
        InstrumentMap::from_pairs(vec![
            ("RELIANCE".to_string(), "RELIANCE.NS".to_string()),
            ("TCS".to_string(), "TCS.NS".to_string()),
        ])
    }

    #[tokio::test]
    async fn test_value_portfolio_prices_and_derives() {
        let holdings = vec![
            holding("RELIANCE", dec!(10), dec!(14000)),
            holding("TCS", dec!(5), dec!(10000)),
        ];
        let mut quotes = StaticQuotes::new();
        quotes.add("RELIANCE.NS", date(8), None, dec!(1450.128));
        quotes.add("TCS.NS", date(8), None, dec!(1900));

        let valued = value_portfolio(&holdings, &nse_map(), &quotes, date(8))
            .await
            .unwrap();

        assert_eq!(valued.positions.len(), 2);

        let reliance = &valued.positions[0];
        // Quoted close rounds to 2 decimal places before valuation.
        assert_eq!(reliance.last_price, dec!(1450.13));
        assert_eq!(reliance.current_value, dec!(14501.30));
        assert_eq!(reliance.pnl, dec!(501.30));
        assert_eq!(reliance.pct_change, dec!(501.30) / dec!(14000));

        assert_eq!(valued.total_invested(), dec!(24000));
        assert_eq!(valued.total_value(), dec!(14501.30) + dec!(9500));
        assert_eq!(valued.total_pnl(), dec!(501.30) + dec!(-500));
    }

    #[tokio::test]
    async fn test_unmapped_symbol_is_typed_error() {
        let holdings = vec![holding("WIPRO", dec!(1), dec!(100))];
        let quotes = StaticQuotes::new();

        let err = value_portfolio(&holdings, &nse_map(), &quotes, date(8))
            .await
            .unwrap_err();
        match err.downcast_ref::<TrackerError>() {
            Some(TrackerError::UnknownInstrument(sym)) => assert_eq!(sym, "WIPRO"),
            other => panic!("unexpected kind: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_zero_invested_value_is_undefined_ratio() {
        // Reachable state: buy 10@100 then sell 5@200 leaves quantity 5
        // with invested value exactly zero.
        let holdings = vec![Holding {
            symbol: "RELIANCE".to_string(),
            quantity: dec!(5),
            average_cost: Decimal::ZERO,
            invested_value: Decimal::ZERO,
        }];
        let mut quotes = StaticQuotes::new();
        quotes.add("RELIANCE.NS", date(8), None, dec!(1450));

        let err = value_portfolio(&holdings, &nse_map(), &quotes, date(8))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TrackerError>(),
            Some(TrackerError::UndefinedRatio { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_holdings_value_to_empty_snapshot() {
        let quotes = StaticQuotes::new();
        let valued = value_portfolio(&[], &nse_map(), &quotes, date(8))
            .await
            .unwrap();

        assert!(valued.positions.is_empty());
        assert_eq!(valued.total_value(), Decimal::ZERO);
        assert_eq!(valued.total_pnl(), Decimal::ZERO);
    }
}
