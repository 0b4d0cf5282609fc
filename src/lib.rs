// exchange-core: symbol-keyed exchange core.
// two halves: the in-memory matching engine and the order-placement saga
// that sequences pricing, custody, journaling, commission, positions and
// notification across independent services.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: UserId, Symbol, Side, Price, Timestamp
//   2.x  order.rs: orders, the per-symbol book, price-time matching
//   3.x  registry.rs: symbol -> book map with atomic get-or-create
//   4.x  trade.rs: immutable journal rows
//   5.x  saga.rs: TradeOrchestrator: the placement workflow + error contract
//   6.x  events.rs: audit events emitted per saga step
//   7.x  config.rs: commission schedule and orchestrator knobs
//   8.x  pricing.rs: quote provider interface (mocked in-memory)
//   9.x  wallet.rs: balance custody + payment flow (mocked in-memory)
//   10.x journal.rs: trade journal interface (mocked in-memory)
//   11.x positions.rs: per-user holdings, signed deltas (mocked in-memory)
//   12.x notify.rs: notification dispatch interface (mocked in-memory)

// matching core
pub mod order;
pub mod registry;
pub mod trade;
pub mod types;

// placement workflow
pub mod config;
pub mod events;
pub mod saga;

// collaborator interfaces
pub mod journal;
pub mod notify;
pub mod positions;
pub mod pricing;
pub mod wallet;

// re exports for convenience
pub use config::*;
pub use events::*;
pub use journal::*;
pub use notify::*;
pub use order::*;
pub use positions::*;
pub use pricing::*;
pub use registry::*;
pub use saga::*;
pub use trade::*;
pub use types::*;
pub use wallet::*;
