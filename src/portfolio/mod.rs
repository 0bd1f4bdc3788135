// Portfolio module - trade replay and mark-to-market valuation

pub mod replay;
pub mod valuation;

pub use replay::{replay, Holding};
pub use valuation::{value_portfolio, ValuedHolding, ValuedPortfolio};
