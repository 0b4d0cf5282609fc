// 7.0 config.rs: orchestrator knobs. commission schedule, the channel trade
// confirmations go out on, and the audit buffer bound.

use crate::notify::Channel;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Commission as a fraction of trade notional.
    pub commission_rate: Decimal,
    /// Commissions below this are skipped rather than settled externally;
    /// payment rails reject sub-unit charges.
    pub min_commission: Decimal,
    /// Channel used for trade confirmations.
    pub notify_channel: Channel,
    /// Audit events retained; oldest are dropped past this.
    pub max_events: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            commission_rate: dec!(0.001), // 10 bps of notional
            min_commission: dec!(1),
            notify_channel: Channel::Email,
            max_events: 10_000,
        }
    }
}

impl OrchestratorConfig {
    pub fn commission_for(&self, notional: Decimal) -> Decimal {
        if notional <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        notional * self.commission_rate
    }
}
