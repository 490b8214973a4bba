//! Rule management. New rules are not materialized here; the next catch-up pass
//! picks them up.

use crate::core::services::ServiceResult;
use crate::core::state::AppState;
use crate::errors::LedgerError;
use crate::ledger::{NewRecurringRule, RecordId, RecurringRule};
use crate::storage::StorageBackend;

pub struct RecurringService;

impl RecurringService {
    pub fn add(
        storage: &dyn StorageBackend,
        state: &mut AppState,
        data: NewRecurringRule,
    ) -> ServiceResult<RecurringRule> {
        data.validate()?;
        let rule = storage.insert_recurring_rule(data)?;
        tracing::info!(rule = %rule.id, frequency = %rule.frequency, start = %rule.start_date, "recurring rule added");
        state.recurring_rules.insert(0, rule.clone());
        Ok(rule)
    }

    /// Replaces a rule by id. A pointer left behind a moved start date is lifted
    /// to the new start so no occurrence is generated before it.
    pub fn update(
        storage: &dyn StorageBackend,
        state: &mut AppState,
        mut rule: RecurringRule,
    ) -> ServiceResult<RecurringRule> {
        rule.validate()?;
        if rule.next_due_date < rule.start_date {
            rule.next_due_date = rule.start_date;
        }
        let saved = storage.save_recurring_rule(rule)?;
        if !state.replace_rule(saved.clone()) {
            state.recurring_rules.insert(0, saved.clone());
        }
        Ok(saved)
    }

    /// Deletes the rule. Transactions it already generated are kept.
    pub fn remove(
        storage: &dyn StorageBackend,
        state: &mut AppState,
        id: &RecordId,
    ) -> ServiceResult<RecurringRule> {
        storage.delete_recurring_rule(id)?;
        let removed = state
            .remove_rule(id)
            .ok_or_else(|| LedgerError::RuleNotFound(id.clone()))?;
        tracing::info!(rule = %id, "recurring rule deleted");
        Ok(removed)
    }

    pub fn list(state: &AppState) -> &[RecurringRule] {
        &state.recurring_rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::ServiceError;
    use crate::ledger::{Frequency, TransactionKind};
    use crate::storage::JsonStorage;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rent() -> NewRecurringRule {
        NewRecurringRule::new(
            "Rent",
            1500.0,
            TransactionKind::Expense,
            "Rumah",
            Frequency::Monthly,
            date(2024, 1, 31),
        )
    }

    #[test]
    fn add_starts_pointer_at_start_date() {
        let storage = JsonStorage::in_memory();
        let mut state = AppState::default();
        let rule = RecurringService::add(&storage, &mut state, rent()).unwrap();
        assert_eq!(rule.next_due_date, date(2024, 1, 31));
        assert_eq!(RecurringService::list(&state).len(), 1);
        assert!(storage.load_transactions().unwrap().is_empty());
    }

    #[test]
    fn add_rejects_end_before_start() {
        let storage = JsonStorage::in_memory();
        let mut state = AppState::default();
        let err = RecurringService::add(&storage, &mut state, rent().ending(date(2023, 12, 1)))
            .unwrap_err();
        assert!(matches!(err, ServiceError::Ledger(LedgerError::Validation(_))));
    }

    #[test]
    fn update_lifts_pointer_to_moved_start() {
        let storage = JsonStorage::in_memory();
        let mut state = AppState::default();
        let mut rule = RecurringService::add(&storage, &mut state, rent()).unwrap();
        rule.start_date = date(2024, 6, 30);

        let saved = RecurringService::update(&storage, &mut state, rule).unwrap();
        assert_eq!(saved.next_due_date, date(2024, 6, 30));
        assert_eq!(state.recurring_rules[0].next_due_date, date(2024, 6, 30));
    }

    #[test]
    fn update_unknown_rule_is_an_error() {
        let storage = JsonStorage::in_memory();
        let mut state = AppState::default();
        let ghost = RecurringRule::from_new(RecordId::new(), rent());
        let err = RecurringService::update(&storage, &mut state, ghost).unwrap_err();
        assert!(matches!(err, ServiceError::Ledger(LedgerError::RuleNotFound(_))));
    }

    #[test]
    fn remove_drops_rule_from_storage_and_state() {
        let storage = JsonStorage::in_memory();
        let mut state = AppState::default();
        let rule = RecurringService::add(&storage, &mut state, rent()).unwrap();
        RecurringService::remove(&storage, &mut state, &rule.id).unwrap();
        assert!(state.recurring_rules.is_empty());
        assert!(storage.load_recurring_rules().unwrap().rules.is_empty());
    }
}
