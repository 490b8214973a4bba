#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::NaiveDate;
use keena_core::{
    config::{Config, ConfigManager},
    core::{FixedClock, Session},
    errors::LedgerError,
    ledger::{
        Category, Frequency, NewRecurringRule, NewTransaction, RecordId, RecurringRule,
        Transaction, TransactionKind,
    },
    storage::{JsonStorage, LoadedRules, LoadedTransactions, MemoryKv, StorageBackend},
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates an isolated base directory and a config manager rooted in it.
pub fn setup_test_env() -> (PathBuf, ConfigManager) {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);

    let config_manager =
        ConfigManager::with_base_dir(base.clone()).expect("create config manager for temp dir");
    (base, config_manager)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn expense_rule(title: &str, frequency: Frequency, start: NaiveDate) -> NewRecurringRule {
    NewRecurringRule::new(title, 10.0, TransactionKind::Expense, "Tagihan", frequency, start)
}

pub fn session_on<S>(storage: S, today: NaiveDate) -> Session
where
    S: StorageBackend + 'static,
{
    Session::open(
        Box::new(storage),
        Box::new(FixedClock::new(today)),
        &Config::default(),
    )
}

/// Asserts that no rule produced two transactions for the same date.
pub fn assert_no_duplicate_occurrences(transactions: &[Transaction]) {
    let mut seen = std::collections::HashSet::new();
    for txn in transactions {
        if let Some(rule_id) = &txn.recurring_rule_id {
            assert!(
                seen.insert((rule_id.clone(), txn.date)),
                "duplicate occurrence for rule {rule_id} on {}",
                txn.date
            );
        }
    }
}

/// Storage wrapper that fails selected writes for chosen rules.
pub struct FailingStorage {
    inner: JsonStorage<MemoryKv>,
    fail_append_for: Mutex<Option<RecordId>>,
    fail_save_for: Mutex<Option<RecordId>>,
}

impl FailingStorage {
    pub fn new(inner: JsonStorage<MemoryKv>) -> Self {
        Self {
            inner,
            fail_append_for: Mutex::new(None),
            fail_save_for: Mutex::new(None),
        }
    }

    pub fn inner(&self) -> &JsonStorage<MemoryKv> {
        &self.inner
    }

    pub fn fail_appends_for(&self, rule_id: Option<RecordId>) {
        *self.fail_append_for.lock().expect("lock") = rule_id;
    }

    pub fn fail_saves_for(&self, rule_id: Option<RecordId>) {
        *self.fail_save_for.lock().expect("lock") = rule_id;
    }
}

impl StorageBackend for FailingStorage {
    fn load_transaction_records(&self) -> Result<LoadedTransactions, LedgerError> {
        self.inner.load_transaction_records()
    }

    fn insert_transaction(&self, data: NewTransaction) -> Result<Transaction, LedgerError> {
        self.inner.insert_transaction(data)
    }

    fn append_transaction(&self, transaction: Transaction) -> Result<Transaction, LedgerError> {
        let target = self.fail_append_for.lock().expect("lock").clone();
        if target.is_some() && transaction.recurring_rule_id == target {
            return Err(LedgerError::Persistence("injected append failure".into()));
        }
        self.inner.append_transaction(transaction)
    }

    fn update_transaction(&self, transaction: Transaction) -> Result<Transaction, LedgerError> {
        self.inner.update_transaction(transaction)
    }

    fn delete_transaction(&self, id: &RecordId) -> Result<(), LedgerError> {
        self.inner.delete_transaction(id)
    }

    fn load_categories(&self) -> Result<Vec<Category>, LedgerError> {
        self.inner.load_categories()
    }

    fn save_categories(&self, categories: &[Category]) -> Result<(), LedgerError> {
        self.inner.save_categories(categories)
    }

    fn load_recurring_rules(&self) -> Result<LoadedRules, LedgerError> {
        self.inner.load_recurring_rules()
    }

    fn insert_recurring_rule(&self, data: NewRecurringRule) -> Result<RecurringRule, LedgerError> {
        self.inner.insert_recurring_rule(data)
    }

    fn save_recurring_rule(&self, rule: RecurringRule) -> Result<RecurringRule, LedgerError> {
        if self.fail_save_for.lock().expect("lock").as_ref() == Some(&rule.id) {
            return Err(LedgerError::Persistence("injected save failure".into()));
        }
        self.inner.save_recurring_rule(rule)
    }

    fn delete_recurring_rule(&self, id: &RecordId) -> Result<(), LedgerError> {
        self.inner.delete_recurring_rule(id)
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>, LedgerError> {
        self.inner.get_setting(key)
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<(), LedgerError> {
        self.inner.set_setting(key, value)
    }

    fn remove_setting(&self, key: &str) -> Result<(), LedgerError> {
        self.inner.remove_setting(key)
    }
}
