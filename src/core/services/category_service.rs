use std::collections::HashSet;

use crate::core::state::AppState;
use crate::errors::LedgerError;
use crate::ledger::{category::find_by_name, Category, RecordId};
use crate::storage::StorageBackend;

use super::{ServiceError, ServiceResult};

/// Where a dangling category name was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceSource {
    Transaction(RecordId),
    RecurringRule(RecordId),
}

/// A transaction or rule naming a category that no longer exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrphanedReference {
    pub source: ReferenceSource,
    pub category: String,
}

pub struct CategoryService;

impl CategoryService {
    /// Replaces the whole category list.
    pub fn set_all(
        storage: &dyn StorageBackend,
        state: &mut AppState,
        categories: Vec<Category>,
    ) -> ServiceResult<()> {
        let mut seen = HashSet::new();
        for category in &categories {
            let normalized = Self::normalized_name(&category.name)?;
            if !seen.insert(normalized) {
                return Err(ServiceError::Invalid(format!(
                    "Category `{}` already exists",
                    category.name
                )));
            }
        }
        storage.save_categories(&categories)?;
        state.categories = categories;
        Ok(())
    }

    pub fn add(
        storage: &dyn StorageBackend,
        state: &mut AppState,
        category: Category,
    ) -> ServiceResult<()> {
        Self::validate_name(state, None, &category.name)?;
        let mut next = state.categories.clone();
        next.push(category);
        storage.save_categories(&next)?;
        state.categories = next;
        Ok(())
    }

    /// Renames a category. Transactions and rules keep the old name and show up
    /// in [`CategoryService::orphaned_references`] afterwards.
    pub fn rename(
        storage: &dyn StorageBackend,
        state: &mut AppState,
        id: &RecordId,
        name: &str,
    ) -> ServiceResult<()> {
        Self::validate_name(state, Some(id), name)?;
        let mut next = state.categories.clone();
        let category = next
            .iter_mut()
            .find(|category| &category.id == id)
            .ok_or_else(|| LedgerError::CategoryNotFound(id.to_string()))?;
        let previous = std::mem::replace(&mut category.name, name.trim().to_string());
        storage.save_categories(&next)?;
        state.categories = next;
        tracing::debug!(%id, from = %previous, to = name.trim(), "category renamed");
        Ok(())
    }

    pub fn remove(
        storage: &dyn StorageBackend,
        state: &mut AppState,
        id: &RecordId,
    ) -> ServiceResult<()> {
        let mut next = state.categories.clone();
        let before = next.len();
        next.retain(|category| &category.id != id);
        if next.len() == before {
            return Err(LedgerError::CategoryNotFound(id.to_string()).into());
        }
        storage.save_categories(&next)?;
        state.categories = next;
        Ok(())
    }

    pub fn find<'a>(state: &'a AppState, name: &str) -> Option<&'a Category> {
        find_by_name(&state.categories, name)
    }

    pub fn orphaned_references(state: &AppState) -> Vec<OrphanedReference> {
        let known: HashSet<&str> = state
            .categories
            .iter()
            .map(|category| category.name.as_str())
            .collect();
        let from_transactions = state
            .transactions
            .iter()
            .filter(|txn| !known.contains(txn.category.as_str()))
            .map(|txn| OrphanedReference {
                source: ReferenceSource::Transaction(txn.id.clone()),
                category: txn.category.clone(),
            });
        let from_rules = state
            .recurring_rules
            .iter()
            .filter(|rule| !known.contains(rule.category.as_str()))
            .map(|rule| OrphanedReference {
                source: ReferenceSource::RecurringRule(rule.id.clone()),
                category: rule.category.clone(),
            });
        from_transactions.chain(from_rules).collect()
    }

    fn normalized_name(candidate: &str) -> ServiceResult<String> {
        let normalized = candidate.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(ServiceError::Invalid("Category name is required".into()));
        }
        Ok(normalized)
    }

    fn validate_name(
        state: &AppState,
        exclude: Option<&RecordId>,
        candidate: &str,
    ) -> ServiceResult<()> {
        let normalized = Self::normalized_name(candidate)?;
        let duplicate = state.categories.iter().any(|category| {
            category.name.trim().to_lowercase() == normalized
                && exclude.map_or(true, |id| &category.id != id)
        });
        if duplicate {
            Err(ServiceError::Invalid(format!(
                "Category `{}` already exists",
                candidate
            )))
        } else {
            Ok(())
        }
    }
}
