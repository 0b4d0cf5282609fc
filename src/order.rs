//! Orders and the per-symbol book.
//!
//! One book per instrument. Matching is price-time priority: best price
//! first, FIFO within a price level, fills always execute at the resting
//! (maker) order's price. Market remainders are discarded, limit remainders
//! rest on their own side.

use crate::types::{OrderId, OrderKind, Price, Side, Symbol, Timestamp, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// 2.0: a single order. `remaining` is mutable and strictly positive while
// the order is tracked; an order at zero is removed from the book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub symbol: Symbol,
    pub side: Side,
    pub kind: OrderKind,
    pub quantity: Decimal,
    pub remaining: Decimal,
    pub limit_price: Option<Price>,
    pub submitted_at: Timestamp,
    /// Book-assigned submission sequence, tie-break within a price level.
    pub sequence: u64,
}

impl Order {
    pub fn limit(
        id: OrderId,
        user_id: UserId,
        symbol: Symbol,
        side: Side,
        quantity: Decimal,
        price: Price,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id,
            user_id,
            symbol,
            side,
            kind: OrderKind::Limit,
            quantity,
            remaining: quantity,
            limit_price: Some(price),
            submitted_at: timestamp,
            sequence: 0,
        }
    }

    pub fn market(
        id: OrderId,
        user_id: UserId,
        symbol: Symbol,
        side: Side,
        quantity: Decimal,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id,
            user_id,
            symbol,
            side,
            kind: OrderKind::Market,
            quantity,
            remaining: quantity,
            limit_price: None,
            submitted_at: timestamp,
            sequence: 0,
        }
    }

    pub fn is_filled(&self) -> bool {
        self.remaining.is_zero()
    }

    pub fn fill(&mut self, quantity: Decimal) {
        debug_assert!(quantity <= self.remaining, "cannot fill more than remaining");
        self.remaining -= quantity;
    }
}

// 2.1: priority key. `sort_price` is side-adjusted (asks store the price,
// bids store its negation) so the best order on either side is always the
// first map entry. ties resolve by submission sequence, FIFO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct BookKey {
    sort_price: Decimal,
    sequence: u64,
}

impl BookKey {
    fn new(side: Side, price: Price, sequence: u64) -> Self {
        let sort_price = match side {
            Side::Buy => -price.value(),
            Side::Sell => price.value(),
        };
        Self { sort_price, sequence }
    }
}

/// A fill between a resting maker and an incoming taker. Always priced at
/// the maker's limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fill {
    pub maker_order_id: OrderId,
    pub maker_user_id: UserId,
    pub taker_order_id: OrderId,
    pub taker_user_id: UserId,
    pub price: Price,
    pub quantity: Decimal,
    pub taker_side: Side,
}

/// Terminal disposition of an incoming order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Fully matched against resting liquidity.
    Filled,
    /// Limit order with remaining quantity now resting in the book.
    Rested,
    /// Market order that exhausted the opposite side; the remainder is gone.
    /// This is a partial fill, not an error.
    Discarded,
}

#[derive(Debug, Clone)]
pub struct MatchResult {
    pub order_id: OrderId,
    pub fills: Vec<Fill>,
    pub remaining: Decimal,
    pub status: OrderStatus,
}

impl MatchResult {
    pub fn filled_quantity(&self) -> Decimal {
        self.fills.iter().map(|f| f.quantity).sum()
    }

    pub fn is_fully_filled(&self) -> bool {
        self.status == OrderStatus::Filled
    }
}

/// One price level of the book, aggregated for depth snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: Price,
    pub total_quantity: Decimal,
    pub order_count: usize,
}

/// 2.2: the book itself. two disjoint priority maps; an order lives on
// exactly one side at a time.
#[derive(Debug, Clone)]
pub struct OrderBook {
    pub symbol: Symbol,
    bids: BTreeMap<BookKey, Order>,
    asks: BTreeMap<BookKey, Order>,
    next_sequence: u64,
}

impl OrderBook {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            next_sequence: 1,
        }
    }

    fn next_sequence(&mut self) -> u64 {
        let seq = self.next_sequence;
        self.next_sequence += 1;
        seq
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.values().next().and_then(|o| o.limit_price)
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.values().next().and_then(|o| o.limit_price)
    }

    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask.value() - bid.value()),
            _ => None,
        }
    }

    pub fn mid_price(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => {
                Price::new((bid.value() + ask.value()) / Decimal::TWO)
            }
            _ => None,
        }
    }

    pub fn order_count(&self) -> usize {
        self.bids.len() + self.asks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    /// Outside an in-progress match this must always be false: matching
    /// runs to exhaustion before a remainder rests.
    pub fn is_crossed(&self) -> bool {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => bid >= ask,
            _ => false,
        }
    }

    /// Bid depth aggregated per price level, best first.
    pub fn bid_levels(&self, max_levels: usize) -> Vec<PriceLevel> {
        Self::levels(self.bids.values(), max_levels)
    }

    /// Ask depth aggregated per price level, best first.
    pub fn ask_levels(&self, max_levels: usize) -> Vec<PriceLevel> {
        Self::levels(self.asks.values(), max_levels)
    }

    fn levels<'a>(orders: impl Iterator<Item = &'a Order>, max_levels: usize) -> Vec<PriceLevel> {
        let mut out: Vec<PriceLevel> = Vec::new();
        let mut current_price: Option<Price> = None;
        for order in orders {
            let price = order.limit_price.expect("resting order must have a price");
            if Some(price) != current_price {
                if out.len() >= max_levels {
                    break;
                }
                current_price = Some(price);
                out.push(PriceLevel {
                    price,
                    total_quantity: Decimal::ZERO,
                    order_count: 0,
                });
            }
            if let Some(level) = out.last_mut() {
                level.total_quantity += order.remaining;
                level.order_count += 1;
            }
        }
        out
    }

    // 2.3: market order. consumes the opposite side best-first until the
    // taker is filled or liquidity runs out. the leftover never rests.
    pub fn submit_market(&mut self, mut order: Order) -> MatchResult {
        debug_assert_eq!(order.kind, OrderKind::Market);
        order.sequence = self.next_sequence();

        let fills = self.match_incoming(&mut order, None);

        let status = if order.is_filled() {
            OrderStatus::Filled
        } else {
            OrderStatus::Discarded
        };

        MatchResult {
            order_id: order.id,
            remaining: order.remaining,
            fills,
            status,
        }
    }

    // 2.4: limit order. matches only while the opposite best price crosses
    // the limit; the remainder rests on the order's own side.
    pub fn submit_limit(&mut self, mut order: Order) -> MatchResult {
        debug_assert_eq!(order.kind, OrderKind::Limit);
        let limit = order.limit_price.expect("limit order must carry a price");
        order.sequence = self.next_sequence();

        let fills = self.match_incoming(&mut order, Some(limit));

        let status = if order.is_filled() {
            OrderStatus::Filled
        } else {
            let key = BookKey::new(order.side, limit, order.sequence);
            match order.side {
                Side::Buy => self.bids.insert(key, order.clone()),
                Side::Sell => self.asks.insert(key, order.clone()),
            };
            OrderStatus::Rested
        };

        MatchResult {
            order_id: order.id,
            remaining: order.remaining,
            fills,
            status,
        }
    }

    // 2.5: the shared matching loop. `limit` of None never stops on price
    // (market order); Some(p) stops as soon as the best opposite no longer
    // crosses p. makers are updated in place and removed at zero remaining.
    fn match_incoming(&mut self, order: &mut Order, limit: Option<Price>) -> Vec<Fill> {
        let mut fills = Vec::new();
        let opposite = match order.side {
            Side::Buy => &mut self.asks,
            Side::Sell => &mut self.bids,
        };

        while !order.is_filled() {
            let Some((&key, maker)) = opposite.iter_mut().next() else {
                break;
            };
            let maker_price = maker.limit_price.expect("resting order must have a price");

            if let Some(limit) = limit {
                let crosses = match order.side {
                    Side::Buy => maker_price <= limit,
                    Side::Sell => maker_price >= limit,
                };
                if !crosses {
                    break;
                }
            }

            let fill_quantity = order.remaining.min(maker.remaining);
            fills.push(Fill {
                maker_order_id: maker.id,
                maker_user_id: maker.user_id,
                taker_order_id: order.id,
                taker_user_id: order.user_id,
                price: maker_price,
                quantity: fill_quantity,
                taker_side: order.side,
            });

            order.fill(fill_quantity);
            maker.fill(fill_quantity);
            let maker_filled = maker.is_filled();

            if maker_filled {
                opposite.remove(&key);
            }
        }

        fills
    }
}
