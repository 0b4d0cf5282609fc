// 4.0: the journal row. written exactly once per placement that reaches the
// journal step, never mutated or deleted afterwards. everything downstream
// of the journal (commission, positions, notification) keys off this record.

use crate::types::{OrderKind, Price, Side, Symbol, Timestamp, TradeId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub trade_id: TradeId,
    pub user_id: UserId,
    pub symbol: Symbol,
    pub quantity: Decimal,
    pub price: Price,
    pub side: Side,
    pub kind: OrderKind,
    pub executed_at: Timestamp,
}

impl TradeRecord {
    pub fn new(
        user_id: UserId,
        symbol: Symbol,
        quantity: Decimal,
        price: Price,
        side: Side,
        kind: OrderKind,
        executed_at: Timestamp,
    ) -> Self {
        Self {
            trade_id: TradeId::new(),
            user_id,
            symbol,
            quantity,
            price,
            side,
            kind,
            executed_at,
        }
    }

    /// Trade notional: price times quantity. Commission is computed on this.
    pub fn notional(&self) -> Decimal {
        self.price.value() * self.quantity
    }
}
