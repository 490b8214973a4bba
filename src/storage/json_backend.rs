use std::path::PathBuf;

use serde::de::DeserializeOwned;
use chrono::NaiveDate;
use serde_json::Value;

use crate::{
    errors::LedgerError,
    ledger::{
        dates::{parse_calendar_date, INVALID_DATE_MARKER},
        default_categories, sort_newest_first, Category, NewRecurringRule, NewTransaction,
        RecordId, RecurringRule, Transaction,
    },
};

use super::{
    FileKv, KeyValueStore, LoadedRules, LoadedTransactions, MemoryKv, RejectedRecord, Result,
    StorageBackend, CATEGORIES_KEY, RECURRING_RULES_KEY, TRANSACTIONS_KEY,
};

/// Gateway that keeps each collection as a JSON array under a fixed key.
///
/// Collections are rewritten whole on every change. Mutations work on the raw
/// JSON records so that entries which fail to decode are carried along untouched.
#[derive(Debug)]
pub struct JsonStorage<K: KeyValueStore> {
    kv: K,
}

impl JsonStorage<MemoryKv> {
    pub fn in_memory() -> Self {
        Self::new(MemoryKv::new())
    }
}

impl JsonStorage<FileKv> {
    pub fn open_dir(root: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self::new(FileKv::new(root)?))
    }
}

impl<K: KeyValueStore> JsonStorage<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }

    fn read_raw(&self, key: &str) -> Result<Option<Vec<Value>>> {
        match self.kv.get(key)? {
            Some(data) if !data.trim().is_empty() => Ok(Some(serde_json::from_str(&data)?)),
            _ => Ok(None),
        }
    }

    fn write_raw(&self, key: &str, records: &[Value]) -> Result<()> {
        let json = serde_json::to_string(records)?;
        self.kv.set(key, &json)
    }

    fn raw_transactions(&self) -> Result<Vec<Value>> {
        Ok(self.read_raw(TRANSACTIONS_KEY)?.unwrap_or_default())
    }

    fn raw_rules(&self) -> Result<Vec<Value>> {
        Ok(self.read_raw(RECURRING_RULES_KEY)?.unwrap_or_default())
    }

    fn prepend_transaction(&self, transaction: Transaction) -> Result<Transaction> {
        let mut records = self.raw_transactions()?;
        records.insert(0, serde_json::to_value(&transaction)?);
        self.write_raw(TRANSACTIONS_KEY, &records)?;
        Ok(transaction)
    }
}

impl<K: KeyValueStore> StorageBackend for JsonStorage<K> {
    fn load_transaction_records(&self) -> Result<LoadedTransactions> {
        let (mut transactions, rejected) = decode_all::<Transaction>(self.raw_transactions()?);
        for record in &rejected {
            tracing::warn!(
                id = record.id.as_ref().map_or("<unknown>", RecordId::as_str),
                error = %record.error,
                "skipping unreadable transaction record"
            );
        }
        sort_newest_first(&mut transactions);
        Ok(LoadedTransactions {
            transactions,
            rejected,
        })
    }

    fn insert_transaction(&self, data: NewTransaction) -> Result<Transaction> {
        self.prepend_transaction(Transaction::from_new(RecordId::new(), data))
    }

    fn append_transaction(&self, mut transaction: Transaction) -> Result<Transaction> {
        let records = self.raw_transactions()?;
        if position_of(&records, &transaction.id).is_some() {
            let fresh = RecordId::new();
            tracing::debug!(old = %transaction.id, new = %fresh, "reassigning colliding transaction id");
            transaction.id = fresh;
        }
        self.prepend_transaction(transaction)
    }

    fn update_transaction(&self, transaction: Transaction) -> Result<Transaction> {
        let mut records = self.raw_transactions()?;
        let index = position_of(&records, &transaction.id)
            .ok_or_else(|| LedgerError::TransactionNotFound(transaction.id.clone()))?;
        records[index] = serde_json::to_value(&transaction)?;
        self.write_raw(TRANSACTIONS_KEY, &records)?;
        Ok(transaction)
    }

    fn delete_transaction(&self, id: &RecordId) -> Result<()> {
        let mut records = self.raw_transactions()?;
        records.retain(|record| record_id(record) != Some(id.as_str()));
        self.write_raw(TRANSACTIONS_KEY, &records)
    }

    fn load_categories(&self) -> Result<Vec<Category>> {
        match self.kv.get(CATEGORIES_KEY)? {
            Some(data) => Ok(serde_json::from_str(&data)?),
            None => {
                let defaults = default_categories();
                self.save_categories(&defaults)?;
                tracing::info!(count = defaults.len(), "seeded default categories");
                Ok(defaults)
            }
        }
    }

    fn save_categories(&self, categories: &[Category]) -> Result<()> {
        let json = serde_json::to_string(categories)?;
        self.kv.set(CATEGORIES_KEY, &json)
    }

    fn load_recurring_rules(&self) -> Result<LoadedRules> {
        let (rules, rejected) = decode_all::<RecurringRule>(self.raw_rules()?);
        Ok(LoadedRules { rules, rejected })
    }

    fn insert_recurring_rule(&self, data: NewRecurringRule) -> Result<RecurringRule> {
        let rule = RecurringRule::from_new(RecordId::new(), data);
        let mut records = self.raw_rules()?;
        records.insert(0, serde_json::to_value(&rule)?);
        self.write_raw(RECURRING_RULES_KEY, &records)?;
        Ok(rule)
    }

    fn save_recurring_rule(&self, rule: RecurringRule) -> Result<RecurringRule> {
        let mut records = self.raw_rules()?;
        let index = position_of(&records, &rule.id)
            .ok_or_else(|| LedgerError::RuleNotFound(rule.id.clone()))?;
        records[index] = serde_json::to_value(&rule)?;
        self.write_raw(RECURRING_RULES_KEY, &records)?;
        Ok(rule)
    }

    fn delete_recurring_rule(&self, id: &RecordId) -> Result<()> {
        let mut records = self.raw_rules()?;
        let before = records.len();
        records.retain(|record| record_id(record) != Some(id.as_str()));
        if records.len() == before {
            return Err(LedgerError::RuleNotFound(id.clone()));
        }
        self.write_raw(RECURRING_RULES_KEY, &records)
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        self.kv.get(key)
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.kv.set(key, value)
    }

    fn remove_setting(&self, key: &str) -> Result<()> {
        self.kv.remove(key)
    }
}

fn record_id(record: &Value) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

fn position_of(records: &[Value], id: &RecordId) -> Option<usize> {
    records
        .iter()
        .position(|record| record_id(record) == Some(id.as_str()))
}

/// Rule back-reference and date of a raw transaction record.
fn occurrence_of(record: &Value) -> Option<(RecordId, NaiveDate)> {
    let rule_id = record.get("recurringTransactionId").and_then(Value::as_str)?;
    let date = record.get("date").and_then(Value::as_str)?;
    let date = parse_calendar_date(date).ok()?;
    Some((RecordId::from(rule_id), date))
}

fn decode_all<T>(records: Vec<Value>) -> (Vec<T>, Vec<RejectedRecord>)
where
    T: DeserializeOwned,
{
    let mut decoded = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();
    for record in records {
        let id = record_id(&record).map(RecordId::from);
        let occurrence = occurrence_of(&record);
        match serde_json::from_value::<T>(record) {
            Ok(value) => decoded.push(value),
            Err(err) => rejected.push(RejectedRecord {
                id,
                occurrence,
                error: classify_decode_error(err),
            }),
        }
    }
    (decoded, rejected)
}

fn classify_decode_error(err: serde_json::Error) -> LedgerError {
    let message = err.to_string();
    if message.starts_with(INVALID_DATE_MARKER) {
        LedgerError::InvalidDate(message)
    } else {
        LedgerError::Serde(err)
    }
}
