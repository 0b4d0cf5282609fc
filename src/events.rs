// 6.0: every observable step of a placement produces an event. used for
// audit trails and reconciliation after a fail-open placement. the
// EventPayload enum lists all event types.

use crate::notify::NotificationId;
use crate::types::{OrderId, OrderKind, Price, Side, Symbol, Timestamp, TradeId, UserId};
use crate::wallet::PaymentId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: Timestamp,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(id: EventId, timestamp: Timestamp, payload: EventPayload) -> Self {
        Self {
            id,
            timestamp,
            payload,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    // placement lifecycle
    OrderAccepted(OrderAcceptedEvent),
    TradeJournaled(TradeJournaledEvent),

    // book outcomes
    Fill(FillEvent),
    OrderRested(OrderRestedEvent),
    OrderDiscarded(OrderDiscardedEvent),

    // downstream side effects
    CommissionCharged(CommissionChargedEvent),
    CommissionSkipped(CommissionSkippedEvent),
    PositionUpdated(PositionUpdatedEvent),
    NotificationSent(NotificationSentEvent),
    NotificationFailed(NotificationFailedEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAcceptedEvent {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub symbol: Symbol,
    pub side: Side,
    pub kind: OrderKind,
    pub quantity: Decimal,
    pub price: Price,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeJournaledEvent {
    pub trade_id: TradeId,
    pub user_id: UserId,
    pub symbol: Symbol,
    pub quantity: Decimal,
    pub price: Price,
    pub side: Side,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillEvent {
    pub symbol: Symbol,
    pub maker_order_id: OrderId,
    pub taker_order_id: OrderId,
    pub price: Price,
    pub quantity: Decimal,
    pub taker_side: Side,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRestedEvent {
    pub order_id: OrderId,
    pub symbol: Symbol,
    pub side: Side,
    pub remaining: Decimal,
    pub price: Price,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDiscardedEvent {
    pub order_id: OrderId,
    pub symbol: Symbol,
    pub unfilled: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionChargedEvent {
    pub trade_id: TradeId,
    pub user_id: UserId,
    pub amount: Decimal,
    pub payment_id: PaymentId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionSkippedEvent {
    pub trade_id: TradeId,
    /// Below the minimum payable threshold; not worth an external charge.
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionUpdatedEvent {
    pub user_id: UserId,
    pub symbol: Symbol,
    pub delta: Decimal,
    pub price: Price,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSentEvent {
    pub user_id: UserId,
    pub notification_id: NotificationId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationFailedEvent {
    pub user_id: UserId,
    pub reason: String,
}
