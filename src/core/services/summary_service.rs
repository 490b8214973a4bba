use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::core::state::AppState;
use crate::ledger::{category::find_by_name, Category, Timeframe, Transaction, TransactionKind};

use super::ServiceResult;

const EXPENSE_FALLBACK_ICON: &str = "📁";
const INCOME_FALLBACK_ICON: &str = "💰";

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub name: String,
    pub icon: String,
    pub value: f64,
    /// Share of the kind's total, 0 to 100.
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub timeframe: Timeframe,
    pub totals: Totals,
    pub expenses_by_category: Vec<CategoryTotal>,
    pub income_by_category: Vec<CategoryTotal>,
    pub transaction_count: usize,
}

pub struct SummaryService;

impl SummaryService {
    pub fn totals<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Totals {
        let mut totals = Totals::default();
        for txn in transactions {
            match txn.kind {
                TransactionKind::Income => totals.income += txn.amount,
                TransactionKind::Expense => totals.expense += txn.amount,
            }
        }
        totals.balance = totals.income - totals.expense;
        totals
    }

    /// Transactions inside the timeframe, in the order they are held.
    pub fn filter<'a>(
        transactions: &'a [Transaction],
        timeframe: Timeframe,
        today: NaiveDate,
    ) -> ServiceResult<Vec<&'a Transaction>> {
        let window = timeframe.window(today)?;
        Ok(transactions
            .iter()
            .filter(|txn| window.map_or(true, |window| window.contains(txn.date)))
            .collect())
    }

    /// Sums per category name for one kind, largest first.
    pub fn by_category<'a>(
        transactions: impl IntoIterator<Item = &'a Transaction>,
        categories: &[Category],
        kind: TransactionKind,
    ) -> Vec<CategoryTotal> {
        let mut sums: BTreeMap<&str, f64> = BTreeMap::new();
        for txn in transactions.into_iter().filter(|txn| txn.kind == kind) {
            *sums.entry(txn.category.as_str()).or_insert(0.0) += txn.amount;
        }
        let total: f64 = sums.values().sum();
        let fallback = match kind {
            TransactionKind::Expense => EXPENSE_FALLBACK_ICON,
            TransactionKind::Income => INCOME_FALLBACK_ICON,
        };

        let mut rows: Vec<CategoryTotal> = sums
            .into_iter()
            .map(|(name, value)| CategoryTotal {
                name: name.to_string(),
                icon: find_by_name(categories, name)
                    .map(|category| category.icon.clone())
                    .unwrap_or_else(|| fallback.to_string()),
                value,
                share: if total > 0.0 { value / total * 100.0 } else { 0.0 },
            })
            .collect();
        rows.sort_by(|a, b| b.value.total_cmp(&a.value));
        rows
    }

    pub fn report(state: &AppState, timeframe: Timeframe, today: NaiveDate) -> ServiceResult<Report> {
        let selected = Self::filter(&state.transactions, timeframe, today)?;
        Ok(Report {
            timeframe,
            totals: Self::totals(selected.iter().copied()),
            expenses_by_category: Self::by_category(
                selected.iter().copied(),
                &state.categories,
                TransactionKind::Expense,
            ),
            income_by_category: Self::by_category(
                selected.iter().copied(),
                &state.categories,
                TransactionKind::Income,
            ),
            transaction_count: selected.len(),
        })
    }

    /// The `n` newest transactions.
    pub fn recent(state: &AppState, n: usize) -> &[Transaction] {
        &state.transactions[..n.min(state.transactions.len())]
    }
}
