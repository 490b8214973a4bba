use serde::{Deserialize, Serialize};
use super::{RecordId, TransactionKind};

/// Categorises ledger activity for reporting. Transactions and rules refer to a
/// category by `name`, which therefore acts as the lookup key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: RecordId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub icon: String,
    pub color: String,
}

impl Category {
    pub fn new(
        name: impl Into<String>,
        kind: TransactionKind,
        icon: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id: RecordId::new(),
            name: name.into(),
            kind,
            icon: icon.into(),
            color: color.into(),
        }
    }
}

const DEFAULT_INCOME: &[(&str, &str, &str)] = &[
    ("Gaji", "💰", "#86E3CE"),
    ("Proyek", "🏗️", "#FFDD94"),
    ("Penjualan", "📈", "#FA897B"),
];

const DEFAULT_EXPENSE: &[(&str, &str, &str)] = &[
    ("Belanja", "🛍️", "#FF9B9B"),
    ("Bisnis", "💼", "#FFD6A5"),
    ("Dapur", "🍳", "#FDFFAB"),
    ("Kesehatan", "💊", "#CBFFA9"),
    ("Langganan", "🔁", "#93E9BE"),
    ("Main", "🎮", "#A5DEE5"),
    ("Makan & Minum", "🍔", "#A5C0EE"),
    ("Perawatan", "💆‍♀️", "#A5A6EE"),
    ("Rumah", "🏠", "#C9A5EE"),
    ("Tagihan", "🧾", "#EEA5E3"),
    ("Transportasi", "🚗", "#EEA5BB"),
    ("Lain-lain", "📁", "#CCCCCC"),
];

/// Category set written on first load when storage holds none.
pub fn default_categories() -> Vec<Category> {
    let income = DEFAULT_INCOME
        .iter()
        .map(|(name, icon, color)| Category::new(*name, TransactionKind::Income, *icon, *color));
    let expense = DEFAULT_EXPENSE
        .iter()
        .map(|(name, icon, color)| Category::new(*name, TransactionKind::Expense, *icon, *color));
    income.chain(expense).collect()
}

/// Finds a category by its exact, case-sensitive name.
pub fn find_by_name<'a>(categories: &'a [Category], name: &str) -> Option<&'a Category> {
    categories.iter().find(|category| category.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn defaults_have_unique_names_per_kind() {
        let categories = default_categories();
        assert_eq!(categories.len(), 15);
        let names: HashSet<_> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names.len(), categories.len());
        assert_eq!(
            categories
                .iter()
                .filter(|c| c.kind == TransactionKind::Income)
                .count(),
            3
        );
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let categories = default_categories();
        assert!(find_by_name(&categories, "Gaji").is_some());
        assert!(find_by_name(&categories, "gaji").is_none());
    }

    #[test]
    fn stored_category_keeps_its_slug_id() {
        let raw = serde_json::json!({
            "id": "cat-exp-5",
            "name": "Langganan",
            "type": "expense",
            "icon": "🔁",
            "color": "#93E9BE"
        });
        let category: Category = serde_json::from_value(raw).unwrap();
        assert_eq!(category.id.as_str(), "cat-exp-5");
        assert_eq!(category.kind, TransactionKind::Expense);
    }
}
