//! The order-placement saga.
//!
//! `TradeOrchestrator` drives one placement through a fixed step sequence:
//! pricing, funds custody (buys only), trade journal, book matching,
//! commission settlement, position update, notification. The steps are not
//! transactional and there is no rollback anywhere: everything before the
//! journal write fails closed (no durable effect, safe to retry the whole
//! request), everything after it fails open (the trade stands and the error
//! reports which downstream side effect is missing). That asymmetry is the
//! defining contract of this module and must not be "fixed" with
//! compensation logic.

use crate::config::OrchestratorConfig;
use crate::events::{
    CommissionChargedEvent, CommissionSkippedEvent, Event, EventId, EventPayload, FillEvent,
    NotificationFailedEvent, NotificationSentEvent, OrderAcceptedEvent, OrderDiscardedEvent,
    OrderRestedEvent, PositionUpdatedEvent, TradeJournaledEvent,
};
use crate::journal::{JournalError, TradeJournal};
use crate::notify::NotificationDispatcher;
use crate::order::{MatchResult, Order, OrderStatus};
use crate::positions::{PositionBook, PositionError};
use crate::pricing::{PricingError, PricingProvider};
use crate::registry::BookRegistry;
use crate::trade::TradeRecord;
use crate::types::{OrderId, OrderKind, Price, Side, Symbol, Timestamp, TradeId, UserId};
use crate::wallet::{PaymentMethod, WalletError, WalletLedger};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

// 5.0: placement failures. variants before the journal write carry no trade
// id because nothing durable happened; variants after it carry the id of
// the trade that stands.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlaceOrderError {
    #[error("invalid order: {0}")]
    Validation(String),

    #[error(transparent)]
    PricingUnavailable(#[from] PricingError),

    #[error("insufficient funds: need {required}, have {available}")]
    InsufficientFunds { required: Decimal, available: Decimal },

    #[error("wallet error: {0}")]
    Wallet(WalletError),

    #[error(transparent)]
    JournalWrite(#[from] JournalError),

    #[error("trade {trade_id} stands but commission settlement failed: {source}")]
    CommissionCharge { trade_id: TradeId, source: WalletError },

    #[error("trade {trade_id} stands but position update failed: {source}")]
    PositionUpdate { trade_id: TradeId, source: PositionError },
}

impl PlaceOrderError {
    /// The journaled trade this error refers to, if the failure happened
    /// after the journal write. Callers must treat such trades as recorded
    /// but incomplete and reconcile out of band.
    pub fn trade_id(&self) -> Option<TradeId> {
        match self {
            PlaceOrderError::CommissionCharge { trade_id, .. }
            | PlaceOrderError::PositionUpdate { trade_id, .. } => Some(*trade_id),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct AuditLog {
    events: Vec<Event>,
    next_id: u64,
}

impl AuditLog {
    fn new() -> Self {
        Self {
            events: Vec::new(),
            next_id: 1,
        }
    }

    fn push(&mut self, payload: EventPayload, max: usize) {
        let event = Event::new(EventId(self.next_id), Timestamp::now(), payload);
        self.next_id += 1;
        self.events.push(event);
        if self.events.len() > max {
            let drain = self.events.len() - max;
            self.events.drain(0..drain);
        }
    }
}

// 5.1: the orchestrator. owns the book registry, talks to everything else
// through collaborator traits; each collaborator call blocks before the
// next step runs.
pub struct TradeOrchestrator {
    config: OrchestratorConfig,
    books: BookRegistry,
    pricing: Arc<dyn PricingProvider>,
    wallet: Arc<dyn WalletLedger>,
    journal: Arc<dyn TradeJournal>,
    positions: Arc<dyn PositionBook>,
    notifier: Arc<dyn NotificationDispatcher>,
    audit: Mutex<AuditLog>,
    next_order_id: AtomicU64,
}

impl TradeOrchestrator {
    pub fn new(
        config: OrchestratorConfig,
        pricing: Arc<dyn PricingProvider>,
        wallet: Arc<dyn WalletLedger>,
        journal: Arc<dyn TradeJournal>,
        positions: Arc<dyn PositionBook>,
        notifier: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            config,
            books: BookRegistry::new(),
            pricing,
            wallet,
            journal,
            positions,
            notifier,
            audit: Mutex::new(AuditLog::new()),
            next_order_id: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn books(&self) -> &BookRegistry {
        &self.books
    }

    pub fn recent_events(&self, count: usize) -> Vec<Event> {
        let audit = self.audit.lock();
        let start = audit.events.len().saturating_sub(count);
        audit.events[start..].to_vec()
    }

    fn emit(&self, payload: EventPayload) {
        self.audit.lock().push(payload, self.config.max_events);
    }

    fn next_order_id(&self) -> OrderId {
        OrderId(self.next_order_id.fetch_add(1, Ordering::Relaxed))
    }

    // 5.2: the saga. step order is fixed; see the module docs for the
    // partial-failure contract per step.
    pub fn place_order(
        &self,
        user_id: UserId,
        symbol: Symbol,
        limit_price_or_zero: Decimal,
        quantity: Decimal,
        side: Side,
    ) -> Result<TradeId, PlaceOrderError> {
        if quantity <= Decimal::ZERO {
            return Err(PlaceOrderError::Validation(format!(
                "quantity must be positive, got {quantity}"
            )));
        }
        if limit_price_or_zero < Decimal::ZERO {
            return Err(PlaceOrderError::Validation(format!(
                "limit price must be non-negative, got {limit_price_or_zero}"
            )));
        }

        // step 1: price resolution. the quote must succeed even when a
        // user-supplied limit overrides it as the execution price.
        let quote = self.pricing.quote(&symbol)?;
        let kind = if limit_price_or_zero > Decimal::ZERO {
            OrderKind::Limit
        } else {
            OrderKind::Market
        };
        let price = match kind {
            OrderKind::Limit => Price::new_unchecked(limit_price_or_zero),
            OrderKind::Market => quote.price,
        };
        debug!(%symbol, %price, quote = %quote.price, ?kind, "price resolved");

        // step 2: funds reservation, buys only. the ledger's withdraw is a
        // single atomic check-then-debit.
        if side == Side::Buy {
            let cost = price.value() * quantity;
            match self.wallet.withdraw(user_id, cost) {
                Ok(new_balance) => {
                    debug!(%user_id, %cost, %new_balance, "trade cost reserved")
                }
                Err(WalletError::InsufficientFunds {
                    required,
                    available,
                }) => {
                    return Err(PlaceOrderError::InsufficientFunds {
                        required,
                        available,
                    })
                }
                Err(e) => return Err(PlaceOrderError::Wallet(e)),
            }
        }

        // step 3: journal write. from here on the trade has happened and no
        // later failure retracts it.
        let record = TradeRecord::new(
            user_id,
            symbol.clone(),
            quantity,
            price,
            side,
            kind,
            Timestamp::now(),
        );
        let trade_id = record.trade_id;
        self.journal.insert(record.clone())?;
        self.emit(EventPayload::TradeJournaled(TradeJournaledEvent {
            trade_id,
            user_id,
            symbol: symbol.clone(),
            quantity,
            price,
            side,
        }));
        info!(%trade_id, %user_id, %symbol, %side, %quantity, %price, "trade journaled");

        // step 3.5: matching. the order meets whatever liquidity rests in
        // the symbol's book; the outcome never changes the return value.
        self.run_book_step(user_id, &symbol, side, kind, quantity, price);

        // step 4: commission settlement. fail-open past here.
        self.settle_commission(user_id, trade_id, record.notional())?;

        // step 5: position update, signed by side.
        let delta = side.sign() * quantity;
        if let Err(source) = self.positions.apply_delta(user_id, &symbol, delta, price) {
            warn!(%trade_id, %user_id, %source, "position update failed after journal");
            return Err(PlaceOrderError::PositionUpdate { trade_id, source });
        }
        self.emit(EventPayload::PositionUpdated(PositionUpdatedEvent {
            user_id,
            symbol: symbol.clone(),
            delta,
            price,
        }));

        // step 6: notification, best effort. never alters the result.
        self.send_confirmation(user_id, &symbol, side, quantity, price);

        Ok(trade_id)
    }

    /// All journaled trades for the user in journal insertion order. Pure
    /// read, no side effects.
    pub fn trade_history(&self, user_id: UserId) -> Vec<TradeRecord> {
        self.journal.trades_for(user_id)
    }

    fn run_book_step(
        &self,
        user_id: UserId,
        symbol: &Symbol,
        side: Side,
        kind: OrderKind,
        quantity: Decimal,
        price: Price,
    ) {
        let order_id = self.next_order_id();
        self.emit(EventPayload::OrderAccepted(OrderAcceptedEvent {
            order_id,
            user_id,
            symbol: symbol.clone(),
            side,
            kind,
            quantity,
            price,
        }));

        let now = Timestamp::now();
        let order = match kind {
            OrderKind::Market => {
                Order::market(order_id, user_id, symbol.clone(), side, quantity, now)
            }
            OrderKind::Limit => {
                Order::limit(order_id, user_id, symbol.clone(), side, quantity, price, now)
            }
        };

        let book = self.books.get_or_create(symbol);
        let result = {
            let mut book = book.lock();
            match kind {
                OrderKind::Market => book.submit_market(order),
                OrderKind::Limit => book.submit_limit(order),
            }
        };
        self.record_match(symbol, side, &result, price);
    }

    fn record_match(&self, symbol: &Symbol, side: Side, result: &MatchResult, price: Price) {
        for fill in &result.fills {
            debug!(
                %symbol,
                price = %fill.price,
                quantity = %fill.quantity,
                "fill at maker price"
            );
            self.emit(EventPayload::Fill(FillEvent {
                symbol: symbol.clone(),
                maker_order_id: fill.maker_order_id,
                taker_order_id: fill.taker_order_id,
                price: fill.price,
                quantity: fill.quantity,
                taker_side: fill.taker_side,
            }));
        }
        match result.status {
            OrderStatus::Filled => {}
            OrderStatus::Rested => {
                self.emit(EventPayload::OrderRested(OrderRestedEvent {
                    order_id: result.order_id,
                    symbol: symbol.clone(),
                    side,
                    remaining: result.remaining,
                    price,
                }));
            }
            OrderStatus::Discarded => {
                debug!(%symbol, unfilled = %result.remaining, "market remainder discarded");
                self.emit(EventPayload::OrderDiscarded(OrderDiscardedEvent {
                    order_id: result.order_id,
                    symbol: symbol.clone(),
                    unfilled: result.remaining,
                }));
            }
        }
    }

    fn settle_commission(
        &self,
        user_id: UserId,
        trade_id: TradeId,
        notional: Decimal,
    ) -> Result<(), PlaceOrderError> {
        let commission = self.config.commission_for(notional);
        if commission < self.config.min_commission {
            debug!(%trade_id, %commission, "commission below minimum, skipping settlement");
            self.emit(EventPayload::CommissionSkipped(CommissionSkippedEvent {
                trade_id,
                amount: commission,
            }));
            return Ok(());
        }

        match self
            .wallet
            .charge(user_id, commission, PaymentMethod::Wallet)
        {
            Ok(payment_id) => {
                self.emit(EventPayload::CommissionCharged(CommissionChargedEvent {
                    trade_id,
                    user_id,
                    amount: commission,
                    payment_id,
                }));
                Ok(())
            }
            Err(source) => {
                warn!(%trade_id, %user_id, %commission, %source, "commission charge failed after journal");
                Err(PlaceOrderError::CommissionCharge { trade_id, source })
            }
        }
    }

    fn send_confirmation(
        &self,
        user_id: UserId,
        symbol: &Symbol,
        side: Side,
        quantity: Decimal,
        price: Price,
    ) {
        let message = format!(
            "Your {side} order for {quantity} shares of {symbol} is executed at {price}"
        );
        match self
            .notifier
            .notify(user_id, &message, self.config.notify_channel)
        {
            Ok(notification_id) => {
                self.emit(EventPayload::NotificationSent(NotificationSentEvent {
                    user_id,
                    notification_id,
                }));
            }
            Err(e) => {
                // swallowed by contract: the trade outcome is already decided
                warn!(%user_id, error = %e, "trade confirmation failed");
                self.emit(EventPayload::NotificationFailed(NotificationFailedEvent {
                    user_id,
                    reason: e.to_string(),
                }));
            }
        }
    }
}
