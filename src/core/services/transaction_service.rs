//! Business logic helpers for managing transactions.

use crate::core::services::{ServiceError, ServiceResult};
use crate::core::state::AppState;
use crate::errors::LedgerError;
use crate::ledger::{NewTransaction, RecordId, Transaction};
use crate::storage::StorageBackend;

/// Provides validated CRUD helpers that keep storage and session state in step.
pub struct TransactionService;

impl TransactionService {
    /// Stores a new transaction and places it in the newest-first list.
    pub fn add(
        storage: &dyn StorageBackend,
        state: &mut AppState,
        data: NewTransaction,
    ) -> ServiceResult<Transaction> {
        validate(&data.title, data.amount)?;
        let stored = storage.insert_transaction(data)?;
        tracing::debug!(id = %stored.id, date = %stored.date, "transaction added");
        state.insert_transaction(stored.clone());
        Ok(stored)
    }

    /// Replaces the stored transaction with the same id.
    pub fn update(
        storage: &dyn StorageBackend,
        state: &mut AppState,
        transaction: Transaction,
    ) -> ServiceResult<Transaction> {
        validate(&transaction.title, transaction.amount)?;
        let stored = storage.update_transaction(transaction)?;
        if !state.replace_transaction(stored.clone()) {
            state.insert_transaction(stored.clone());
        }
        Ok(stored)
    }

    /// Removes the transaction identified by `id`, returning the removed instance.
    pub fn remove(
        storage: &dyn StorageBackend,
        state: &mut AppState,
        id: &RecordId,
    ) -> ServiceResult<Transaction> {
        if state.transaction(id).is_none() {
            return Err(LedgerError::TransactionNotFound(id.clone()).into());
        }
        storage.delete_transaction(id)?;
        state
            .remove_transaction(id)
            .ok_or_else(|| LedgerError::TransactionNotFound(id.clone()).into())
    }

    /// Returns a snapshot of the session's transactions.
    pub fn list(state: &AppState) -> Vec<&Transaction> {
        state.transactions.iter().collect()
    }

    pub fn generated_by<'a>(state: &'a AppState, rule_id: &'a RecordId) -> Vec<&'a Transaction> {
        state.generated_by(rule_id).collect()
    }
}

fn validate(title: &str, amount: f64) -> ServiceResult<()> {
    if title.trim().is_empty() {
        return Err(ServiceError::Invalid("Transaction title is required".into()));
    }
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ServiceError::Invalid(format!(
            "Transaction amount must be positive, got {amount}"
        )));
    }
    Ok(())
}
