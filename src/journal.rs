// 10.0 journal.rs: the trade journal. append-only; once a row is in, it
// stays in regardless of what fails downstream. reads return rows in
// insertion order.

use crate::trade::TradeRecord;
use crate::types::UserId;
use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JournalError {
    #[error("journal write failed: {0}")]
    WriteFailed(String),
}

pub trait TradeJournal: Send + Sync {
    fn insert(&self, record: TradeRecord) -> Result<(), JournalError>;

    /// All journaled trades for the user, insertion order. Pure read.
    fn trades_for(&self, user_id: UserId) -> Vec<TradeRecord>;
}

#[derive(Debug, Default)]
pub struct InMemoryJournal {
    rows: Mutex<Vec<TradeRecord>>,
}

impl InMemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.lock().is_empty()
    }
}

impl TradeJournal for InMemoryJournal {
    fn insert(&self, record: TradeRecord) -> Result<(), JournalError> {
        self.rows.lock().push(record);
        Ok(())
    }

    fn trades_for(&self, user_id: UserId) -> Vec<TradeRecord> {
        self.rows
            .lock()
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }
}
