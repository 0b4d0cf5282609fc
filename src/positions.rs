// 11.0 positions.rs: per-user holdings, one row per (user, symbol). every
// trade applies a signed quantity delta: positive for a buy, negative for a
// sell. increases average the entry price, reductions keep it, a flip
// through zero takes the fill price as the new basis.

use crate::types::{Price, Symbol, UserId};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A user's net holding in one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: Symbol,
    /// Net quantity; negative means short.
    pub quantity: Decimal,
    pub average_price: Price,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    #[error("quantity delta must be non-zero")]
    ZeroQuantity,

    #[error("position store unavailable: {0}")]
    StoreUnavailable(String),
}

pub trait PositionBook: Send + Sync {
    /// Applies one trade's signed quantity delta at the execution price.
    fn apply_delta(
        &self,
        user_id: UserId,
        symbol: &Symbol,
        delta: Decimal,
        price: Price,
    ) -> Result<(), PositionError>;

    /// All non-flat holdings for the user, sorted by symbol.
    fn holdings_for(&self, user_id: UserId) -> Vec<Holding>;
}

#[derive(Debug, Default)]
pub struct InMemoryPositionBook {
    holdings: Mutex<HashMap<UserId, HashMap<Symbol, Holding>>>,
}

impl InMemoryPositionBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn holding(&self, user_id: UserId, symbol: &Symbol) -> Option<Holding> {
        self.holdings
            .lock()
            .get(&user_id)
            .and_then(|per_symbol| per_symbol.get(symbol))
            .cloned()
    }
}

// 11.1: the averaging rule. same-direction increase takes the quantity
// weighted average of the old basis and the fill; a reduction leaves the
// basis alone; crossing zero restarts the basis at the fill price.
fn merge(existing: Option<&Holding>, symbol: &Symbol, delta: Decimal, price: Price) -> Holding {
    let Some(existing) = existing else {
        return Holding {
            symbol: symbol.clone(),
            quantity: delta,
            average_price: price,
        };
    };

    let old_quantity = existing.quantity;
    let new_quantity = old_quantity + delta;

    let same_direction = (old_quantity > Decimal::ZERO) == (delta > Decimal::ZERO);
    let flipped = !new_quantity.is_zero()
        && !old_quantity.is_zero()
        && (new_quantity > Decimal::ZERO) != (old_quantity > Decimal::ZERO);

    let average_price = if old_quantity.is_zero() || flipped {
        price
    } else if same_direction {
        let old_notional = existing.average_price.value() * old_quantity.abs();
        let add_notional = price.value() * delta.abs();
        Price::new_unchecked((old_notional + add_notional) / new_quantity.abs())
    } else {
        existing.average_price
    };

    Holding {
        symbol: symbol.clone(),
        quantity: new_quantity,
        average_price,
    }
}

impl PositionBook for InMemoryPositionBook {
    fn apply_delta(
        &self,
        user_id: UserId,
        symbol: &Symbol,
        delta: Decimal,
        price: Price,
    ) -> Result<(), PositionError> {
        if delta.is_zero() {
            return Err(PositionError::ZeroQuantity);
        }

        let mut holdings = self.holdings.lock();
        let per_symbol = holdings.entry(user_id).or_default();
        let updated = merge(per_symbol.get(symbol), symbol, delta, price);

        if updated.quantity.is_zero() {
            per_symbol.remove(symbol);
        } else {
            per_symbol.insert(symbol.clone(), updated);
        }
        Ok(())
    }

    fn holdings_for(&self, user_id: UserId) -> Vec<Holding> {
        let holdings = self.holdings.lock();
        let mut out: Vec<Holding> = holdings
            .get(&user_id)
            .map(|per_symbol| per_symbol.values().cloned().collect())
            .unwrap_or_default();
        out.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        out
    }
}
