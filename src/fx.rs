use crate::error::{CopilotError, Result};
use crate::period::PeriodKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FxRateEntry {
    pub period: PeriodKey,
    pub currency: String,
    pub rate_to_usd: f64,
}

/// Month-level conversion rates into the reporting currency.
///
/// Lookups that miss fall back to the identity rate 1.0: records already
/// denominated in the reporting currency need no entry, and a currency with
/// no published rate passes through unconverted rather than being dropped.
#[derive(Debug, Clone)]
pub struct FxTable {
    reporting_currency: String,
    rates: BTreeMap<PeriodKey, BTreeMap<String, f64>>,
}

impl FxTable {
    /// Builds the table, rejecting duplicate `(period, currency)` entries.
    /// Two rows for the same key would make the conversion ambiguous, so the
    /// whole load fails instead of silently picking either.
    pub fn from_entries(entries: Vec<FxRateEntry>, reporting_currency: &str) -> Result<Self> {
        let mut rates: BTreeMap<PeriodKey, BTreeMap<String, f64>> = BTreeMap::new();
        for entry in entries {
            let existing = rates
                .entry(entry.period)
                .or_default()
                .insert(entry.currency.clone(), entry.rate_to_usd);
            if existing.is_some() {
                return Err(CopilotError::DuplicateFxRate {
                    period: entry.period.to_string(),
                    currency: entry.currency,
                });
            }
        }
        Ok(Self {
            reporting_currency: reporting_currency.to_string(),
            rates,
        })
    }

    pub fn empty(reporting_currency: &str) -> Self {
        Self {
            reporting_currency: reporting_currency.to_string(),
            rates: BTreeMap::new(),
        }
    }

    pub fn reporting_currency(&self) -> &str {
        &self.reporting_currency
    }

    pub fn rate(&self, period: PeriodKey, currency: &str) -> Option<f64> {
        self.rates
            .get(&period)
            .and_then(|by_currency| by_currency.get(currency))
            .copied()
    }

    /// Converts one amount into the reporting currency. Every input produces
    /// exactly one output: a missing entry means rate 1.0, and an explicit
    /// entry for the reporting currency itself still applies.
    pub fn convert(&self, amount: f64, period: PeriodKey, currency: &str) -> f64 {
        amount * self.rate(period, currency).unwrap_or(1.0)
    }

    pub fn len(&self) -> usize {
        self.rates.values().map(|by_currency| by_currency.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}
