//! Session-start pass that materializes every overdue recurring occurrence.

use std::fmt;

use chrono::NaiveDate;

use crate::{
    errors::LedgerError,
    ledger::{
        materialize, sort_newest_first, PersistedOccurrences, RecordId, RecurringRule,
        Transaction,
    },
    storage::{LoadedRules, StorageBackend},
};

/// Non-blocking problem surfaced to the presentation layer after a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatchUpWarning {
    pub rule_id: Option<RecordId>,
    pub message: String,
}

impl CatchUpWarning {
    pub(crate) fn general(message: impl Into<String>) -> Self {
        Self {
            rule_id: None,
            message: message.into(),
        }
    }

    fn for_rule(rule_id: RecordId, message: impl Into<String>) -> Self {
        Self {
            rule_id: Some(rule_id),
            message: message.into(),
        }
    }
}

impl fmt::Display for CatchUpWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.rule_id {
            Some(id) => write!(f, "rule {id}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

#[derive(Debug, Default)]
pub struct CatchUpReport {
    /// Loaded and generated transactions, newest first.
    pub transactions: Vec<Transaction>,
    /// Rules in stored order, carrying the pointers that were persisted.
    pub recurring_rules: Vec<RecurringRule>,
    /// Transactions written during this pass.
    pub generated: Vec<Transaction>,
    pub rules_advanced: usize,
    pub warnings: Vec<CatchUpWarning>,
}

/// Runs the materializer over every stored rule and persists the results.
///
/// Every generated transaction is written before its rule's advanced pointer, so a
/// pass interrupted between the two leaves a stale pointer rather than a gap. A
/// rule whose writes fail keeps its stored pointer and is retried on the next
/// session; the remaining rules are still processed. Nothing here returns an
/// error: failures end up in [`CatchUpReport::warnings`].
pub fn run_catch_up(storage: &dyn StorageBackend, today: NaiveDate) -> CatchUpReport {
    let mut report = CatchUpReport::default();

    let loaded = match storage.load_recurring_rules() {
        Ok(loaded) => loaded,
        Err(err) => {
            tracing::warn!(error = %err, "unable to load recurring rules");
            report
                .warnings
                .push(CatchUpWarning::general(format!("recurring rules unavailable: {err}")));
            LoadedRules::default()
        }
    };
    for rejected in &loaded.rejected {
        tracing::warn!(
            rule = rejected.id.as_ref().map_or("<unknown>", RecordId::as_str),
            error = %rejected.error,
            "skipping unreadable recurring rule"
        );
        report.warnings.push(CatchUpWarning {
            rule_id: rejected.id.clone(),
            message: format!("skipped: {}", rejected.error),
        });
    }

    let (existing, persisted) = match storage.load_transaction_records() {
        Ok(stored) => {
            let mut persisted = PersistedOccurrences::from_transactions(&stored.transactions);
            // Unreadable records still occupy their occurrence.
            for rejected in stored.rejected {
                let id = rejected.id.as_ref().map_or("<unknown>", RecordId::as_str);
                report.warnings.push(CatchUpWarning {
                    rule_id: rejected.occurrence.as_ref().map(|(rule_id, _)| rule_id.clone()),
                    message: format!("unreadable transaction {id}: {}", rejected.error),
                });
                if let Some((rule_id, date)) = rejected.occurrence {
                    persisted.insert(rule_id, date);
                }
            }
            (stored.transactions, persisted)
        }
        Err(err) => {
            // Without the stored list there is no way to tell which occurrences
            // already exist, so nothing is generated this session.
            tracing::warn!(error = %err, "unable to load transactions; catch-up skipped");
            report
                .warnings
                .push(CatchUpWarning::general(format!("transactions unavailable: {err}")));
            report.recurring_rules = loaded.rules;
            return report;
        }
    };

    let mut buffer = Vec::new();
    let mut rules = Vec::with_capacity(loaded.rules.len());
    for mut rule in loaded.rules {
        match catch_up_rule(storage, &rule, today, &persisted, &mut buffer) {
            Ok(Some(next_due_date)) => {
                rule.next_due_date = next_due_date;
                report.rules_advanced += 1;
            }
            Ok(None) => {}
            Err(warning) => report.warnings.push(warning),
        }
        rules.push(rule);
    }

    let mut merged = buffer.clone();
    merged.extend(existing);
    sort_newest_first(&mut merged);

    tracing::info!(
        rules = rules.len(),
        generated = buffer.len(),
        advanced = report.rules_advanced,
        warnings = report.warnings.len(),
        %today,
        "recurring catch-up finished"
    );

    report.transactions = merged;
    report.recurring_rules = rules;
    report.generated = buffer;
    report
}

/// Materializes and persists one rule. Returns the new pointer when it was saved.
fn catch_up_rule(
    storage: &dyn StorageBackend,
    rule: &RecurringRule,
    today: NaiveDate,
    persisted: &PersistedOccurrences,
    buffer: &mut Vec<Transaction>,
) -> Result<Option<NaiveDate>, CatchUpWarning> {
    let outcome = materialize(rule, today, persisted);
    if outcome.is_noop() {
        tracing::debug!(rule = %rule.id, next_due = %rule.next_due_date, "rule not due");
        return Ok(None);
    }
    if !outcome.already_present.is_empty() {
        tracing::info!(
            rule = %rule.id,
            replayed = outcome.already_present.len(),
            "stale pointer; stepping over occurrences already stored"
        );
    }

    let due = outcome.generated.len();
    for (written, transaction) in outcome.generated.into_iter().enumerate() {
        let date = transaction.date;
        match storage.append_transaction(transaction) {
            Ok(stored) => buffer.push(stored),
            Err(err) => {
                tracing::warn!(
                    rule = %rule.id,
                    %date,
                    written,
                    due,
                    error = %err,
                    "failed to store generated transaction; pointer left unchanged"
                );
                return Err(CatchUpWarning::for_rule(
                    rule.id.clone(),
                    format!("could not store occurrence on {date}: {err}"),
                ));
            }
        }
    }

    let mut updated = rule.clone();
    updated.next_due_date = outcome.next_due_date;
    match storage.save_recurring_rule(updated) {
        Ok(saved) => {
            tracing::debug!(
                rule = %rule.id,
                generated = due,
                next_due = %saved.next_due_date,
                "rule advanced"
            );
            Ok(Some(saved.next_due_date))
        }
        Err(err) => {
            if matches!(err, LedgerError::RuleNotFound(_)) {
                tracing::error!(rule = %rule.id, "rule vanished from storage during catch-up");
            } else {
                tracing::warn!(rule = %rule.id, error = %err, "failed to store advanced pointer");
            }
            Err(CatchUpWarning::for_rule(
                rule.id.clone(),
                format!("could not store next due date: {err}"),
            ))
        }
    }
}
