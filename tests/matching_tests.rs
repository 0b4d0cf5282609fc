//! Matching engine behavior through the public API.

use exchange_core::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn symbol() -> Symbol {
    Symbol::new("AAPL")
}

fn ask(id: u64, qty: Decimal, price: Decimal) -> Order {
    Order::limit(
        OrderId(id),
        UserId(100 + id),
        symbol(),
        Side::Sell,
        qty,
        Price::new_unchecked(price),
        Timestamp::from_millis(id as i64),
    )
}

fn bid(id: u64, qty: Decimal, price: Decimal) -> Order {
    Order::limit(
        OrderId(id),
        UserId(100 + id),
        symbol(),
        Side::Buy,
        qty,
        Price::new_unchecked(price),
        Timestamp::from_millis(id as i64),
    )
}

fn market_buy(id: u64, qty: Decimal) -> Order {
    Order::market(
        OrderId(id),
        UserId(100 + id),
        symbol(),
        Side::Buy,
        qty,
        Timestamp::from_millis(id as i64),
    )
}

#[test]
fn best_price_wins_regardless_of_insertion_order() {
    let mut book = OrderBook::new(symbol());
    book.submit_limit(ask(1, dec!(7), dec!(101)));
    book.submit_limit(ask(2, dec!(7), dec!(100)));
    book.submit_limit(ask(3, dec!(7), dec!(102)));

    // market buy for exactly the 100-priced order's quantity
    let result = book.submit_market(market_buy(4, dec!(7)));

    assert!(result.is_fully_filled());
    assert_eq!(result.fills.len(), 1);
    assert_eq!(result.fills[0].price.value(), dec!(100));
    assert_eq!(result.fills[0].maker_order_id, OrderId(2));
    // 101 and 102 untouched
    assert_eq!(book.best_ask().unwrap().value(), dec!(101));
    assert_eq!(book.order_count(), 2);
}

#[test]
fn equal_prices_fill_first_in_first_out() {
    let mut book = OrderBook::new(symbol());
    book.submit_limit(ask(1, dec!(10), dec!(100)));
    book.submit_limit(ask(2, dec!(10), dec!(100)));

    // smaller than either resting quantity: only the earlier order trades
    let result = book.submit_market(market_buy(3, dec!(5)));

    assert_eq!(result.fills.len(), 1);
    assert_eq!(result.fills[0].maker_order_id, OrderId(1));
    assert_eq!(result.fills[0].quantity, dec!(5));
}

#[test]
fn market_partial_fill_is_terminal() {
    let mut book = OrderBook::new(symbol());
    book.submit_limit(ask(1, dec!(100), dec!(50)));

    let result = book.submit_market(market_buy(2, dec!(150)));

    assert_eq!(result.status, OrderStatus::Discarded);
    assert_eq!(result.filled_quantity(), dec!(100));
    assert_eq!(result.fills[0].price.value(), dec!(50));
    assert_eq!(result.remaining, dec!(50));
    // the remainder did not rest and nothing is left on either side
    assert!(book.is_empty());
}

#[test]
fn limit_rests_then_later_sell_crosses_at_maker_price() {
    let mut book = OrderBook::new(symbol());

    let rested = book.submit_limit(bid(1, dec!(10), dec!(150)));
    assert_eq!(rested.status, OrderStatus::Rested);
    assert_eq!(book.bid_levels(1)[0].total_quantity, dec!(10));

    // best bid 150 >= 140: crosses, executes at the resting bid's price
    let result = book.submit_limit(ask(2, dec!(6), dec!(140)));
    assert!(result.is_fully_filled());
    assert_eq!(result.fills[0].price.value(), dec!(150));
    assert_eq!(result.fills[0].quantity, dec!(6));

    let bids = book.bid_levels(1);
    assert_eq!(bids[0].total_quantity, dec!(4));
    assert_eq!(bids[0].price.value(), dec!(150));
    assert!(book.best_ask().is_none());
}

#[test]
fn non_crossing_limit_rests_without_fills() {
    let mut book = OrderBook::new(symbol());
    book.submit_limit(ask(1, dec!(5), dec!(105)));

    let result = book.submit_limit(bid(2, dec!(5), dec!(104)));
    assert_eq!(result.status, OrderStatus::Rested);
    assert!(result.fills.is_empty());
    assert!(!book.is_crossed());
    assert_eq!(book.spread().unwrap(), dec!(1));
}

#[test]
fn taker_walks_the_ask_ladder() {
    let mut book = OrderBook::new(symbol());
    book.submit_limit(ask(1, dec!(2), dec!(100)));
    book.submit_limit(ask(2, dec!(2), dec!(101)));
    book.submit_limit(ask(3, dec!(2), dec!(103)));

    // crosses 100 and 101 but not 103; remainder rests at 102
    let result = book.submit_limit(bid(4, dec!(6), dec!(102)));

    assert_eq!(result.fills.len(), 2);
    assert_eq!(result.fills[0].price.value(), dec!(100));
    assert_eq!(result.fills[1].price.value(), dec!(101));
    assert_eq!(result.status, OrderStatus::Rested);
    assert_eq!(result.remaining, dec!(2));
    assert_eq!(book.best_bid().unwrap().value(), dec!(102));
    assert_eq!(book.best_ask().unwrap().value(), dec!(103));
    assert!(!book.is_crossed());
}

#[test]
fn partially_consumed_maker_keeps_its_queue_position() {
    let mut book = OrderBook::new(symbol());
    book.submit_limit(ask(1, dec!(10), dec!(100)));
    book.submit_limit(ask(2, dec!(10), dec!(100)));

    book.submit_market(market_buy(3, dec!(4)));
    // order 1 still has 6 left and still trades before order 2
    let result = book.submit_market(market_buy(4, dec!(8)));

    assert_eq!(result.fills.len(), 2);
    assert_eq!(result.fills[0].maker_order_id, OrderId(1));
    assert_eq!(result.fills[0].quantity, dec!(6));
    assert_eq!(result.fills[1].maker_order_id, OrderId(2));
    assert_eq!(result.fills[1].quantity, dec!(2));
}

#[test]
fn registry_routes_symbols_to_their_own_books() {
    let registry = BookRegistry::new();
    let aapl = registry.get_or_create(&Symbol::new("AAPL"));
    aapl.lock().submit_limit(ask(1, dec!(5), dec!(100)));

    let msft = registry.get_or_create(&Symbol::new("MSFT"));
    assert!(msft.lock().is_empty());
    assert_eq!(registry.get_or_create(&Symbol::new("AAPL")).lock().order_count(), 1);
}
