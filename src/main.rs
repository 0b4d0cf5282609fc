//! Exchange Core Simulation.
//!
//! Walks the matching engine and the placement saga through their main
//! paths: price-time matching, resting limit orders, the happy-path saga,
//! the fail-closed and fail-open error branches, and history reads.

use exchange_core::*;
use rust_decimal_macros::dec;
use std::sync::Arc;

fn main() {
    println!("Exchange Core Simulation");
    println!("Matching engine + order-placement saga\n");

    scenario_1_price_time_matching();
    scenario_2_resting_and_cross();
    scenario_3_saga_happy_path();
    scenario_4_insufficient_funds();
    scenario_5_partial_failure();

    println!("\nAll simulations completed successfully.");
}

fn seeded_orchestrator() -> (
    Arc<InMemoryWallet>,
    Arc<InMemoryJournal>,
    Arc<InMemoryPositionBook>,
    Arc<RecordingDispatcher>,
    TradeOrchestrator,
) {
    let pricing = Arc::new(StaticPricing::new());
    pricing.set_quote(Symbol::new("AAPL"), Price::new_unchecked(dec!(150)));
    pricing.set_quote(Symbol::new("MSFT"), Price::new_unchecked(dec!(400)));

    let wallet = Arc::new(InMemoryWallet::new());
    let journal = Arc::new(InMemoryJournal::new());
    let positions = Arc::new(InMemoryPositionBook::new());
    let notifier = Arc::new(RecordingDispatcher::new());

    let orchestrator = TradeOrchestrator::new(
        OrchestratorConfig::default(),
        pricing,
        Arc::clone(&wallet) as Arc<dyn WalletLedger>,
        Arc::clone(&journal) as Arc<dyn TradeJournal>,
        Arc::clone(&positions) as Arc<dyn PositionBook>,
        Arc::clone(&notifier) as Arc<dyn NotificationDispatcher>,
    );

    (wallet, journal, positions, notifier, orchestrator)
}

/// Direct book usage: best price wins, FIFO within a level.
fn scenario_1_price_time_matching() {
    println!("Scenario 1: Price-Time Matching\n");

    let mut book = OrderBook::new(Symbol::new("AAPL"));
    let asks = [(1u64, dec!(101)), (2, dec!(100)), (3, dec!(102))];
    for (id, price) in asks {
        book.submit_limit(Order::limit(
            OrderId(id),
            UserId(id),
            Symbol::new("AAPL"),
            Side::Sell,
            dec!(5),
            Price::new_unchecked(price),
            Timestamp::now(),
        ));
        println!("  ask #{id}: 5 @ {price}");
    }

    let result = book.submit_market(Order::market(
        OrderId(10),
        UserId(10),
        Symbol::new("AAPL"),
        Side::Buy,
        dec!(5),
        Timestamp::now(),
    ));
    let fill = &result.fills[0];
    println!(
        "  market buy 5 -> filled {} @ {} against ask #{:?}\n",
        fill.quantity, fill.price, fill.maker_order_id
    );
}

/// A limit order rests, a later crossing order executes at the maker price.
fn scenario_2_resting_and_cross() {
    println!("Scenario 2: Resting Limit, Later Cross\n");

    let mut book = OrderBook::new(Symbol::new("MSFT"));
    let rested = book.submit_limit(Order::limit(
        OrderId(1),
        UserId(1),
        Symbol::new("MSFT"),
        Side::Buy,
        dec!(10),
        Price::new_unchecked(dec!(150)),
        Timestamp::now(),
    ));
    println!("  limit buy 10 @ 150 -> {:?}", rested.status);

    let crossed = book.submit_limit(Order::limit(
        OrderId(2),
        UserId(2),
        Symbol::new("MSFT"),
        Side::Sell,
        dec!(6),
        Price::new_unchecked(dec!(140)),
        Timestamp::now(),
    ));
    println!(
        "  limit sell 6 @ 140 -> {} filled at maker price {}",
        crossed.filled_quantity(),
        crossed.fills[0].price
    );
    println!(
        "  resting bid now {} @ {}\n",
        book.bid_levels(1)[0].total_quantity,
        book.best_bid().unwrap()
    );
}

/// Full saga: pricing, custody, journal, commission, position, notification.
fn scenario_3_saga_happy_path() {
    println!("Scenario 3: Saga Happy Path\n");

    let (wallet, _journal, positions, notifier, orchestrator) = seeded_orchestrator();
    let alice = UserId(1);
    wallet.deposit(alice, dec!(100_000)).unwrap();

    let trade_id = orchestrator
        .place_order(alice, Symbol::new("AAPL"), dec!(0), dec!(100), Side::Buy)
        .unwrap();

    println!("  trade id: {trade_id}");
    println!("  wallet after cost + commission: {}", wallet.balance(alice).unwrap());
    let holding = &positions.holdings_for(alice)[0];
    println!(
        "  holding: {} {} @ avg {}",
        holding.quantity, holding.symbol, holding.average_price
    );
    println!("  notification: {}\n", notifier.sent_to(alice)[0].message);
}

/// A buy that the wallet cannot cover aborts with no side effects.
fn scenario_4_insufficient_funds() {
    println!("Scenario 4: Insufficient Funds\n");

    let (wallet, journal, _positions, _notifier, orchestrator) = seeded_orchestrator();
    let bob = UserId(2);
    wallet.deposit(bob, dec!(50)).unwrap();

    let err = orchestrator
        .place_order(bob, Symbol::new("AAPL"), dec!(100), dec!(1), Side::Buy)
        .unwrap_err();
    println!("  rejected: {err}");
    println!(
        "  balance untouched: {}, journal rows: {}\n",
        wallet.balance(bob).unwrap(),
        journal.len()
    );
}

/// Commission settlement fails after the journal write: the trade stands
/// and the error carries its id.
fn scenario_5_partial_failure() {
    println!("Scenario 5: Fail-Open After the Journal\n");

    let (wallet, _journal, _positions, _notifier, orchestrator) = seeded_orchestrator();
    let carol = UserId(3);
    // exactly the trade cost: the 15-unit commission charge will bounce
    wallet.deposit(carol, dec!(15_000)).unwrap();

    let err = orchestrator
        .place_order(carol, Symbol::new("AAPL"), dec!(0), dec!(100), Side::Buy)
        .unwrap_err();
    let trade_id = err.trade_id().expect("post-journal failure carries the trade id");

    println!("  error: {err}");
    let history = orchestrator.trade_history(carol);
    println!(
        "  trade {} is journaled anyway ({} row(s) in history)",
        trade_id,
        history.len()
    );
}
