// 8.0 pricing.rs: quote provider interface. the core is agnostic to where
// quotes come from (an external feed, a cache, a fixture table); it only
// needs one price per symbol at placement time. the real feed lives in its
// own service, so the in-process implementation here is a fixture table.

use crate::types::{Price, Symbol, Timestamp};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A point-in-time quote for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub symbol: Symbol,
    pub price: Price,
    pub as_of: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    #[error("no quote available for {0}")]
    Unavailable(Symbol),

    #[error("quote feed failure: {0}")]
    FeedFailure(String),
}

pub trait PricingProvider: Send + Sync {
    fn quote(&self, symbol: &Symbol) -> Result<QuoteSnapshot, PricingError>;
}

// 8.1: in-memory quote table. set_quote installs or replaces the current
// price for a symbol; quote() fails for symbols never set, which is exactly
// the "feed has nothing for this instrument" case upstream.
#[derive(Debug, Default)]
pub struct StaticPricing {
    quotes: RwLock<HashMap<Symbol, Price>>,
}

impl StaticPricing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_quote(&self, symbol: Symbol, price: Price) {
        self.quotes.write().insert(symbol, price);
    }
}

impl PricingProvider for StaticPricing {
    fn quote(&self, symbol: &Symbol) -> Result<QuoteSnapshot, PricingError> {
        let quotes = self.quotes.read();
        let price = quotes
            .get(symbol)
            .copied()
            .ok_or_else(|| PricingError::Unavailable(symbol.clone()))?;
        Ok(QuoteSnapshot {
            symbol: symbol.clone(),
            price,
            as_of: Timestamp::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn quote_roundtrip() {
        let pricing = StaticPricing::new();
        pricing.set_quote(Symbol::new("AAPL"), Price::new_unchecked(dec!(187.5)));

        let snapshot = pricing.quote(&Symbol::new("AAPL")).unwrap();
        assert_eq!(snapshot.price.value(), dec!(187.5));
        assert_eq!(snapshot.symbol, Symbol::new("AAPL"));
    }

    #[test]
    fn unknown_symbol_is_unavailable() {
        let pricing = StaticPricing::new();
        let err = pricing.quote(&Symbol::new("NOPE")).unwrap_err();
        assert_eq!(err, PricingError::Unavailable(Symbol::new("NOPE")));
    }

    #[test]
    fn set_quote_replaces() {
        let pricing = StaticPricing::new();
        let symbol = Symbol::new("MSFT");
        pricing.set_quote(symbol.clone(), Price::new_unchecked(dec!(400)));
        pricing.set_quote(symbol.clone(), Price::new_unchecked(dec!(410)));
        assert_eq!(pricing.quote(&symbol).unwrap().price.value(), dec!(410));
    }
}
