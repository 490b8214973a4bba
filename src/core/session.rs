use chrono::NaiveDate;

use crate::config::{Config, ConfigManager, Theme};
use crate::core::catch_up::{run_catch_up, CatchUpReport, CatchUpWarning};
use crate::core::services::{
    CategoryService, RecurringService, ServiceResult, TransactionService,
};
use crate::core::state::AppState;
use crate::core::time::{Clock, SystemClock};
use crate::errors::LedgerError;
use crate::ledger::{
    Category, NewRecurringRule, NewTransaction, RecordId, RecurringRule, Transaction,
};
use crate::storage::{JsonStorage, StorageBackend, AUTH_KEY, THEME_KEY};

/// Facade that owns the session state and coordinates it with persistence.
///
/// Opening a session runs the recurring catch-up pass once; [`Session::refresh`]
/// runs it again on demand.
pub struct Session {
    state: AppState,
    storage: Box<dyn StorageBackend>,
    clock: Box<dyn Clock>,
    /// Problems found while opening, kept across refreshes.
    open_warnings: Vec<CatchUpWarning>,
}

impl Session {
    pub fn open(storage: Box<dyn StorageBackend>, clock: Box<dyn Clock>, defaults: &Config) -> Self {
        let mut session = Self {
            state: AppState::default(),
            storage,
            clock,
            open_warnings: Vec::new(),
        };
        session.state.categories = match session.storage.load_categories() {
            Ok(categories) => categories,
            Err(err) => {
                tracing::warn!(error = %err, "unable to load categories");
                session
                    .open_warnings
                    .push(CatchUpWarning::general(format!("categories unavailable: {err}")));
                Vec::new()
            }
        };
        session.state.theme = session.stored_theme(defaults.theme);
        session.state.authenticated = session.stored_auth();
        session.refresh();
        tracing::info!(
            today = %session.today(),
            transactions = session.state.transactions.len(),
            rules = session.state.recurring_rules.len(),
            theme = %session.state.theme,
            "session opened"
        );
        session
    }

    /// Opens the file-backed store named by the configuration, on the wall clock.
    pub fn from_config(manager: &ConfigManager) -> Result<Self, LedgerError> {
        let config = manager.load()?;
        let storage = JsonStorage::open_dir(manager.data_dir(&config))?;
        Ok(Self::open(Box::new(storage), Box::new(SystemClock), &config))
    }

    /// Reruns catch-up and reloads transactions and rules from storage.
    pub fn refresh(&mut self) -> CatchUpReport {
        let today = self.today();
        let mut report = run_catch_up(self.storage.as_ref(), today);
        self.state.transactions = std::mem::take(&mut report.transactions);
        self.state.recurring_rules = std::mem::take(&mut report.recurring_rules);
        self.state.warnings = self.open_warnings.clone();
        self.state.warnings.extend(report.warnings.iter().cloned());
        report
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn storage(&self) -> &dyn StorageBackend {
        self.storage.as_ref()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.state.transactions
    }

    pub fn categories(&self) -> &[Category] {
        &self.state.categories
    }

    pub fn recurring_rules(&self) -> &[RecurringRule] {
        &self.state.recurring_rules
    }

    pub fn theme(&self) -> Theme {
        self.state.theme
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.authenticated
    }

    pub fn warnings(&self) -> &[CatchUpWarning] {
        &self.state.warnings
    }

    pub fn add_transaction(&mut self, data: NewTransaction) -> ServiceResult<Transaction> {
        TransactionService::add(self.storage.as_ref(), &mut self.state, data)
    }

    pub fn update_transaction(&mut self, transaction: Transaction) -> ServiceResult<Transaction> {
        TransactionService::update(self.storage.as_ref(), &mut self.state, transaction)
    }

    pub fn delete_transaction(&mut self, id: &RecordId) -> ServiceResult<Transaction> {
        TransactionService::remove(self.storage.as_ref(), &mut self.state, id)
    }

    pub fn set_categories(&mut self, categories: Vec<Category>) -> ServiceResult<()> {
        CategoryService::set_all(self.storage.as_ref(), &mut self.state, categories)
    }

    pub fn add_recurring_rule(&mut self, data: NewRecurringRule) -> ServiceResult<RecurringRule> {
        RecurringService::add(self.storage.as_ref(), &mut self.state, data)
    }

    pub fn update_recurring_rule(&mut self, rule: RecurringRule) -> ServiceResult<RecurringRule> {
        RecurringService::update(self.storage.as_ref(), &mut self.state, rule)
    }

    pub fn delete_recurring_rule(&mut self, id: &RecordId) -> ServiceResult<RecurringRule> {
        RecurringService::remove(self.storage.as_ref(), &mut self.state, id)
    }

    pub fn toggle_theme(&mut self) -> Result<Theme, LedgerError> {
        let next = self.state.theme.toggled();
        self.storage.set_setting(THEME_KEY, next.as_str())?;
        self.state.theme = next;
        Ok(next)
    }

    pub fn login(&mut self) -> Result<(), LedgerError> {
        self.storage.set_setting(AUTH_KEY, "true")?;
        self.state.authenticated = true;
        Ok(())
    }

    pub fn logout(&mut self) -> Result<(), LedgerError> {
        self.storage.remove_setting(AUTH_KEY)?;
        self.state.authenticated = false;
        Ok(())
    }

    fn stored_theme(&self, fallback: Theme) -> Theme {
        match self.storage.get_setting(THEME_KEY) {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|err: LedgerError| {
                tracing::warn!(error = %err, "ignoring stored theme");
                fallback
            }),
            Ok(None) => fallback,
            Err(err) => {
                tracing::warn!(error = %err, "unable to read theme setting");
                fallback
            }
        }
    }

    fn stored_auth(&self) -> bool {
        match self.storage.get_setting(AUTH_KEY) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(err) => {
                tracing::warn!(error = %err, "unable to read auth flag");
                false
            }
        }
    }
}
