use crate::{
    config::Theme,
    core::catch_up::CatchUpWarning,
    ledger::{sort_newest_first, Category, RecordId, RecurringRule, Transaction},
};

/// Everything the presentation layer reads during a session.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Newest first.
    pub transactions: Vec<Transaction>,
    pub categories: Vec<Category>,
    pub recurring_rules: Vec<RecurringRule>,
    pub theme: Theme,
    pub authenticated: bool,
    pub warnings: Vec<CatchUpWarning>,
}

impl AppState {
    pub fn transaction(&self, id: &RecordId) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| &txn.id == id)
    }

    /// Transactions that a given rule produced, newest first.
    pub fn generated_by<'a>(
        &'a self,
        rule_id: &'a RecordId,
    ) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.transactions
            .iter()
            .filter(move |txn| txn.generated_by(rule_id))
    }

    /// Inserts ahead of any transaction on the same date, keeping newest-first order.
    pub fn insert_transaction(&mut self, transaction: Transaction) {
        let index = self
            .transactions
            .partition_point(|existing| existing.date > transaction.date);
        self.transactions.insert(index, transaction);
    }

    pub fn replace_transaction(&mut self, transaction: Transaction) -> bool {
        let Some(slot) = self
            .transactions
            .iter_mut()
            .find(|existing| existing.id == transaction.id)
        else {
            return false;
        };
        let moved = slot.date != transaction.date;
        *slot = transaction;
        if moved {
            sort_newest_first(&mut self.transactions);
        }
        true
    }

    pub fn remove_transaction(&mut self, id: &RecordId) -> Option<Transaction> {
        let index = self.transactions.iter().position(|txn| &txn.id == id)?;
        Some(self.transactions.remove(index))
    }

    pub fn replace_rule(&mut self, rule: RecurringRule) -> bool {
        match self
            .recurring_rules
            .iter_mut()
            .find(|existing| existing.id == rule.id)
        {
            Some(slot) => {
                *slot = rule;
                true
            }
            None => false,
        }
    }

    pub fn remove_rule(&mut self, id: &RecordId) -> Option<RecurringRule> {
        let index = self.recurring_rules.iter().position(|rule| &rule.id == id)?;
        Some(self.recurring_rules.remove(index))
    }
}
