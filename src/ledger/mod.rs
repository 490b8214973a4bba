//! Ledger domain models, persistence-friendly types, and the recurrence engine.

pub mod category;
pub mod dates;
pub mod frequency;
pub mod id;
pub mod recurring;
pub mod transaction;
pub mod window;

pub use category::{default_categories, Category};
pub use dates::parse_calendar_date;
pub use frequency::Frequency;
pub use id::RecordId;
pub use recurring::{
    materialize, Materialization, NewRecurringRule, PersistedOccurrences, RecurringRule,
};
pub use transaction::{sort_newest_first, NewTransaction, Transaction, TransactionKind};
pub use window::{DateWindow, Timeframe};
