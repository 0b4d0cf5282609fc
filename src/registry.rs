// 3.0: symbol -> book map. single source of truth for which OrderBook
// instance serves a symbol. get-or-create is atomic: concurrent first
// requests for a new symbol observe exactly one book. books live for the
// registry's lifetime, there is no delete.

use crate::order::OrderBook;
use crate::types::Symbol;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// A book handle. All mutation of one book must go through its lock;
/// the matching loop is not safe under interleaved mutation.
pub type SharedBook = Arc<Mutex<OrderBook>>;

#[derive(Debug, Default)]
pub struct BookRegistry {
    books: Mutex<HashMap<Symbol, SharedBook>>,
}

impl BookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the book for `symbol`, creating it on first request. The
    /// same instance is returned for the same symbol forever after.
    pub fn get_or_create(&self, symbol: &Symbol) -> SharedBook {
        let mut books = self.books.lock();
        books
            .entry(symbol.clone())
            .or_insert_with(|| Arc::new(Mutex::new(OrderBook::new(symbol.clone()))))
            .clone()
    }

    /// Returns the book for `symbol` if one exists, without creating it.
    pub fn get(&self, symbol: &Symbol) -> Option<SharedBook> {
        self.books.lock().get(symbol).cloned()
    }

    pub fn symbols(&self) -> Vec<Symbol> {
        let mut symbols: Vec<Symbol> = self.books.lock().keys().cloned().collect();
        symbols.sort();
        symbols
    }

    pub fn len(&self) -> usize {
        self.books.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.lock().is_empty()
    }
}
