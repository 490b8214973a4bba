pub mod json_backend;
pub mod kv;

use chrono::NaiveDate;

use crate::{
    errors::LedgerError,
    ledger::{Category, NewRecurringRule, NewTransaction, RecordId, RecurringRule, Transaction},
};

pub type Result<T> = std::result::Result<T, LedgerError>;

pub const TRANSACTIONS_KEY: &str = "keena_transactions";
pub const CATEGORIES_KEY: &str = "keena_categories";
pub const RECURRING_RULES_KEY: &str = "keena_recurring_transactions";
pub const THEME_KEY: &str = "theme";
pub const AUTH_KEY: &str = "isAuthenticated";

/// Raw get/set-by-key storage, the equivalent of a browser's local storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// A stored record that could not be decoded. The raw record stays in storage.
#[derive(Debug)]
pub struct RejectedRecord {
    pub id: Option<RecordId>,
    /// Generating rule and date, when the raw record still carries both.
    pub occurrence: Option<(RecordId, NaiveDate)>,
    pub error: LedgerError,
}

/// Transactions as loaded, newest first, with the records that failed to decode.
#[derive(Debug, Default)]
pub struct LoadedTransactions {
    pub transactions: Vec<Transaction>,
    pub rejected: Vec<RejectedRecord>,
}

/// Recurring rules as loaded, together with the records that failed to decode.
#[derive(Debug, Default)]
pub struct LoadedRules {
    pub rules: Vec<RecurringRule>,
    pub rejected: Vec<RejectedRecord>,
}

/// Persistence gateway for the three ledger collections and the session flags.
pub trait StorageBackend: Send + Sync {
    fn load_transaction_records(&self) -> Result<LoadedTransactions>;
    /// All decodable transactions, newest first.
    fn load_transactions(&self) -> Result<Vec<Transaction>> {
        Ok(self.load_transaction_records()?.transactions)
    }
    /// Stores a new transaction under a freshly assigned id.
    fn insert_transaction(&self, data: NewTransaction) -> Result<Transaction>;
    /// Stores a transaction that already carries an id. A colliding id is replaced
    /// with a fresh one; the stored record is returned.
    fn append_transaction(&self, transaction: Transaction) -> Result<Transaction>;
    fn update_transaction(&self, transaction: Transaction) -> Result<Transaction>;
    fn delete_transaction(&self, id: &RecordId) -> Result<()>;

    /// Stored categories; the default set is written when none exist.
    fn load_categories(&self) -> Result<Vec<Category>>;
    fn save_categories(&self, categories: &[Category]) -> Result<()>;

    fn load_recurring_rules(&self) -> Result<LoadedRules>;
    fn insert_recurring_rule(&self, data: NewRecurringRule) -> Result<RecurringRule>;
    /// Full replace by id; fails with [`LedgerError::RuleNotFound`] for unknown ids.
    fn save_recurring_rule(&self, rule: RecurringRule) -> Result<RecurringRule>;
    fn delete_recurring_rule(&self, id: &RecordId) -> Result<()>;

    fn get_setting(&self, key: &str) -> Result<Option<String>>;
    fn set_setting(&self, key: &str, value: &str) -> Result<()>;
    fn remove_setting(&self, key: &str) -> Result<()>;
}

pub use json_backend::JsonStorage;
pub use kv::{FileKv, MemoryKv};
