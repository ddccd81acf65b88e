//! Transaction lifecycle events
//!
//! Observers register on the store and run synchronously at the two
//! well-defined transition points: scope entry (`Start`) and scope exit
//! (`Commit`). `Commit` fires exactly once per transaction scope regardless
//! of outcome, mirroring the settle point of the scope itself.

use docstore_core::TransactionData;
use parking_lot::RwLock;

/// Lifecycle transition points observable on a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionEvent {
    /// A new transaction scope was entered
    Start,
    /// A transaction scope settled (committed or rolled back)
    Commit,
}

/// Registered lifecycle observer
pub type TransactionListener = Box<dyn Fn(&TransactionData) + Send + Sync>;

/// Listener registry owned by the store instance
#[derive(Default)]
pub(crate) struct Listeners {
    entries: RwLock<Vec<(TransactionEvent, TransactionListener)>>,
}

impl Listeners {
    pub(crate) fn register(&self, event: TransactionEvent, listener: TransactionListener) {
        self.entries.write().push((event, listener));
    }

    pub(crate) fn emit(&self, event: TransactionEvent, data: &TransactionData) {
        for (registered, listener) in self.entries.read().iter() {
            if *registered == event {
                listener(data);
            }
        }
    }
}
