use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{dates, RecordId};

/// Direction of money flow for transactions, rules and categories.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: RecordId,
    pub title: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Category name; resolved by name lookup, not by id.
    pub category: String,
    #[serde(with = "dates")]
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        rename = "recurringTransactionId",
        skip_serializing_if = "Option::is_none"
    )]
    pub recurring_rule_id: Option<RecordId>,
}

impl Transaction {
    pub fn from_new(id: RecordId, data: NewTransaction) -> Self {
        Self {
            id,
            title: data.title,
            amount: data.amount,
            kind: data.kind,
            category: data.category,
            date: data.date,
            description: data.description,
            recurring_rule_id: data.recurring_rule_id,
        }
    }

    /// Whether this transaction was generated by the rule `rule_id`.
    pub fn generated_by(&self, rule_id: &RecordId) -> bool {
        self.recurring_rule_id.as_ref() == Some(rule_id)
    }

    /// Amount with sign applied: income positive, expense negative.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}

/// Transaction payload before storage assigns an id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub title: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub category: String,
    #[serde(with = "dates")]
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        rename = "recurringTransactionId",
        skip_serializing_if = "Option::is_none"
    )]
    pub recurring_rule_id: Option<RecordId>,
}

impl NewTransaction {
    pub fn new(
        title: impl Into<String>,
        amount: f64,
        kind: TransactionKind,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            title: title.into(),
            amount,
            kind,
            category: category.into(),
            date,
            description: None,
            recurring_rule_id: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl From<Transaction> for NewTransaction {
    fn from(txn: Transaction) -> Self {
        Self {
            title: txn.title,
            amount: txn.amount,
            kind: txn.kind,
            category: txn.category,
            date: txn.date,
            description: txn.description,
            recurring_rule_id: txn.recurring_rule_id,
        }
    }
}

/// Sorts newest first. The sort is stable, so equal dates keep their order.
pub fn sort_newest_first(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| b.date.cmp(&a.date));
}
