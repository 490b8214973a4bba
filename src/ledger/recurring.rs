use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use super::{dates, Frequency, NewTransaction, RecordId, Transaction, TransactionKind};
use crate::errors::LedgerError;

/// Template that produces one dated transaction per due occurrence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecurringRule {
    pub id: RecordId,
    pub title: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub frequency: Frequency,
    #[serde(with = "dates")]
    pub start_date: NaiveDate,
    #[serde(default, with = "dates::option", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Earliest occurrence that has not been materialized yet.
    #[serde(with = "dates")]
    pub next_due_date: NaiveDate,
}

impl RecurringRule {
    pub fn from_new(id: RecordId, data: NewRecurringRule) -> Self {
        Self {
            id,
            title: data.title,
            amount: data.amount,
            kind: data.kind,
            category: data.category,
            description: data.description,
            frequency: data.frequency,
            start_date: data.start_date,
            end_date: data.end_date,
            next_due_date: data.start_date,
        }
    }

    /// A rule is exhausted once its pointer has moved past the end date.
    pub fn is_exhausted(&self) -> bool {
        self.end_date
            .map(|end| self.next_due_date > end)
            .unwrap_or(false)
    }

    /// Builds the transaction payload for the occurrence due on `date`.
    pub fn occurrence(&self, date: NaiveDate) -> NewTransaction {
        NewTransaction {
            title: self.title.clone(),
            amount: self.amount,
            kind: self.kind,
            category: self.category.clone(),
            date,
            description: self.description.clone(),
            recurring_rule_id: Some(self.id.clone()),
        }
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        validate_fields(&self.title, self.amount, self.start_date, self.end_date)
    }
}

/// Rule payload before storage assigns an id. The pointer starts at `start_date`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewRecurringRule {
    pub title: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub frequency: Frequency,
    #[serde(with = "dates")]
    pub start_date: NaiveDate,
    #[serde(default, with = "dates::option", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl NewRecurringRule {
    pub fn new(
        title: impl Into<String>,
        amount: f64,
        kind: TransactionKind,
        category: impl Into<String>,
        frequency: Frequency,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            title: title.into(),
            amount,
            kind,
            category: category.into(),
            description: None,
            frequency,
            start_date,
            end_date: None,
        }
    }

    pub fn ending(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        validate_fields(&self.title, self.amount, self.start_date, self.end_date)
    }
}

fn validate_fields(
    title: &str,
    amount: f64,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
) -> Result<(), LedgerError> {
    if title.trim().is_empty() {
        return Err(LedgerError::Validation("title must not be empty".into()));
    }
    if !amount.is_finite() || amount <= 0.0 {
        return Err(LedgerError::Validation(format!(
            "amount must be a positive number, got {amount}"
        )));
    }
    if let Some(end) = end_date {
        if end < start_date {
            return Err(LedgerError::Validation(format!(
                "end date {end} is before start date {start_date}"
            )));
        }
    }
    Ok(())
}

/// Outcome of materializing a single rule.
#[derive(Debug, Clone)]
pub struct Materialization {
    pub rule_id: RecordId,
    pub generated: Vec<Transaction>,
    /// Due dates that were already present in storage and were stepped over.
    pub already_present: Vec<NaiveDate>,
    pub previous_due_date: NaiveDate,
    pub next_due_date: NaiveDate,
}

impl Materialization {
    pub fn advanced(&self) -> bool {
        self.next_due_date != self.previous_due_date
    }

    pub fn is_noop(&self) -> bool {
        self.generated.is_empty() && !self.advanced()
    }
}

/// Rule/date pairs that already have a transaction in storage.
#[derive(Debug, Clone, Default)]
pub struct PersistedOccurrences {
    by_rule: HashMap<RecordId, HashSet<NaiveDate>>,
}

impl PersistedOccurrences {
    pub fn from_transactions<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Self {
        let mut occurrences = Self::default();
        for txn in transactions {
            if let Some(rule_id) = &txn.recurring_rule_id {
                occurrences.insert(rule_id.clone(), txn.date);
            }
        }
        occurrences
    }

    pub fn insert(&mut self, rule_id: RecordId, date: NaiveDate) -> bool {
        self.by_rule.entry(rule_id).or_default().insert(date)
    }

    pub fn contains(&self, rule_id: &RecordId, date: NaiveDate) -> bool {
        self.by_rule
            .get(rule_id)
            .map_or(false, |dates| dates.contains(&date))
    }
}

/// Generates every occurrence of `rule` due on or before `today`.
///
/// The walk starts at the rule's pointer and stops at `today` or at the end date,
/// whichever comes first. Dates recorded in `persisted` for this rule are
/// stepped over without producing a duplicate, so a pointer that failed to
/// persist on a previous pass is safe to replay. When no occurrence is due the
/// returned pointer equals the stored one.
pub fn materialize(
    rule: &RecurringRule,
    today: NaiveDate,
    persisted: &PersistedOccurrences,
) -> Materialization {
    let mut generated = Vec::new();
    let mut already_present = Vec::new();
    let mut cursor = rule.next_due_date.max(rule.start_date);

    while cursor <= today {
        if let Some(end) = rule.end_date {
            if cursor > end {
                break;
            }
        }
        if persisted.contains(&rule.id, cursor) {
            already_present.push(cursor);
        } else {
            generated.push(Transaction::from_new(RecordId::new(), rule.occurrence(cursor)));
        }
        let next = rule.frequency.advance(cursor);
        if next <= cursor {
            break;
        }
        cursor = next;
    }

    let next_due_date = if generated.is_empty() && already_present.is_empty() {
        rule.next_due_date
    } else {
        cursor
    };

    Materialization {
        rule_id: rule.id.clone(),
        generated,
        already_present,
        previous_due_date: rule.next_due_date,
        next_due_date,
    }
}
