use crate::fx::FxTable;
use crate::period::PeriodKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Semantic classification of a free-form account tag.
///
/// Two exact matches and one prefix are special: `"Revenue"`, `"COGS"`, and
/// `"Opex:<category>"` where the suffix names the operating-expense
/// category. Everything else is carried but ignored by the metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind<'a> {
    Revenue,
    Cogs,
    Opex(&'a str),
    Other,
}

impl<'a> AccountKind<'a> {
    pub fn of(account: &'a str) -> Self {
        if account == "Revenue" {
            AccountKind::Revenue
        } else if account == "COGS" {
            AccountKind::Cogs
        } else if let Some(category) = account.strip_prefix("Opex:") {
            AccountKind::Opex(category)
        } else {
            AccountKind::Other
        }
    }
}

/// One actuals or budget row. Multiple rows may share the same
/// `(period, entity, account)` coordinate; consumers sum them, never
/// overwrite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub period: PeriodKey,
    pub entity: String,
    pub account: String,
    pub amount: f64,
    pub currency: String,
}

impl LedgerRecord {
    pub fn account_kind(&self) -> AccountKind<'_> {
        AccountKind::of(&self.account)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashEntry {
    pub period: PeriodKey,
    pub currency: String,
    pub cash_balance: f64,
}

/// Loader configuration. The reporting currency is an explicit value rather
/// than a hard-wired constant so the whole system can be pointed at another
/// currency without code changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleConfig {
    pub reporting_currency: String,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            reporting_currency: "USD".to_string(),
        }
    }
}

/// The validated, immutable aggregate of one data load.
///
/// Metric functions borrow it read-only; a fresh load builds a fresh bundle
/// rather than mutating this one in place.
#[derive(Debug, Clone)]
pub struct DataBundle {
    pub actuals: Vec<LedgerRecord>,
    pub budget: Vec<LedgerRecord>,
    pub fx: FxTable,
    pub cash: Vec<CashEntry>,
    pub reporting_currency: String,
}

impl DataBundle {
    /// Distinct periods present in actuals, chronologically ascending.
    pub fn actual_periods(&self) -> Vec<PeriodKey> {
        distinct_periods(self.actuals.iter().map(|r| r.period))
    }

    pub fn budget_periods(&self) -> Vec<PeriodKey> {
        distinct_periods(self.budget.iter().map(|r| r.period))
    }

    pub fn cash_periods(&self) -> Vec<PeriodKey> {
        distinct_periods(self.cash.iter().map(|c| c.period))
    }
}

fn distinct_periods(periods: impl Iterator<Item = PeriodKey>) -> Vec<PeriodKey> {
    periods.collect::<BTreeSet<_>>().into_iter().collect()
}
