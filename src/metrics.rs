use crate::error::{CopilotError, Result};
use crate::fx::FxTable;
use crate::period::PeriodKey;
use crate::schema::{AccountKind, DataBundle, LedgerRecord};
use log::debug;
use serde::{Deserialize, Serialize};

/// How many trailing actuals periods feed the average-burn calculation.
const BURN_WINDOW: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueVsBudget {
    pub actual_usd: f64,
    pub budget_usd: f64,
    pub period: PeriodKey,
}

impl RevenueVsBudget {
    /// Positive when actuals beat budget.
    pub fn variance_usd(&self) -> f64 {
        self.actual_usd - self.budget_usd
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrossMarginPoint {
    pub period: PeriodKey,
    /// `(revenue - cogs) / revenue * 100`; `NaN` when revenue is exactly 0.
    pub gm_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpexCategory {
    pub category: String,
    pub amount_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashRunway {
    /// `+infinity` when the business is break-even or cash-flow-positive.
    pub months: f64,
    pub latest_cash_usd: f64,
}

/// Converted `Revenue` totals from actuals and budget for one period.
///
/// The period resolves against the actuals period set: an explicit
/// `(month, year)` pair selects that exact key, anything else selects the
/// latest period present. A side with zero matching rows sums to 0.0.
pub fn revenue_vs_budget(
    bundle: &DataBundle,
    month: Option<u32>,
    year: Option<i32>,
) -> Result<RevenueVsBudget> {
    let period = resolve_period("actuals", &bundle.actual_periods(), month, year)?;
    debug!("Revenue vs budget resolved to period {}", period);

    let actual_usd = period_total(&bundle.actuals, period, &bundle.fx, |k| {
        k == AccountKind::Revenue
    });
    let budget_usd = period_total(&bundle.budget, period, &bundle.fx, |k| {
        k == AccountKind::Revenue
    });

    Ok(RevenueVsBudget {
        actual_usd,
        budget_usd,
        period,
    })
}

/// Gross margin percentage for the last `last_n_months` distinct actuals
/// periods, chronologically ascending.
///
/// The window counts periods present in the data, not calendar months: a
/// gap in the history widens the wall-clock span rather than shrinking the
/// window. A zero-revenue period yields a `NaN` point without aborting the
/// rest of the sequence.
pub fn gross_margin_trend(
    bundle: &DataBundle,
    last_n_months: usize,
) -> Result<Vec<GrossMarginPoint>> {
    let periods = bundle.actual_periods();
    if periods.is_empty() {
        return Err(CopilotError::EmptyDataset {
            source_name: "actuals".to_string(),
        });
    }

    let window = &periods[periods.len().saturating_sub(last_n_months)..];
    let points = window
        .iter()
        .map(|&period| {
            let revenue = period_total(&bundle.actuals, period, &bundle.fx, |k| {
                k == AccountKind::Revenue
            });
            let cogs = period_total(&bundle.actuals, period, &bundle.fx, |k| {
                k == AccountKind::Cogs
            });
            let gm_pct = if revenue == 0.0 {
                f64::NAN
            } else {
                (revenue - cogs) / revenue * 100.0
            };
            GrossMarginPoint { period, gm_pct }
        })
        .collect();

    Ok(points)
}

/// Converted `Opex:*` totals for one period, grouped by category and sorted
/// descending by amount.
///
/// Categories appear in first-encounter order before sorting, and the sort
/// is stable, so equal amounts keep that order.
pub fn opex_breakdown(
    bundle: &DataBundle,
    month: Option<u32>,
    year: Option<i32>,
) -> Result<Vec<OpexCategory>> {
    let period = resolve_period("actuals", &bundle.actual_periods(), month, year)?;

    let mut categories: Vec<OpexCategory> = Vec::new();
    for record in bundle.actuals.iter().filter(|r| r.period == period) {
        if let AccountKind::Opex(category) = record.account_kind() {
            let amount = bundle.fx.convert(record.amount, record.period, &record.currency);
            match categories.iter_mut().find(|c| c.category == category) {
                Some(existing) => existing.amount_usd += amount,
                None => categories.push(OpexCategory {
                    category: category.to_string(),
                    amount_usd: amount,
                }),
            }
        }
    }

    categories.sort_by(|a, b| b.amount_usd.total_cmp(&a.amount_usd));
    Ok(categories)
}

/// `revenue - cogs - total opex` for one period, every row converted
/// before it enters a sum.
pub fn ebitda_proxy(bundle: &DataBundle, month: Option<u32>, year: Option<i32>) -> Result<f64> {
    let period = resolve_period("actuals", &bundle.actual_periods(), month, year)?;

    let revenue = period_total(&bundle.actuals, period, &bundle.fx, |k| {
        k == AccountKind::Revenue
    });
    let cogs = period_total(&bundle.actuals, period, &bundle.fx, |k| k == AccountKind::Cogs);
    let opex = period_total(&bundle.actuals, period, &bundle.fx, |k| {
        matches!(k, AccountKind::Opex(_))
    });

    Ok(revenue - cogs - opex)
}

/// Months of cash left at the average net burn of the last three actuals
/// periods (fewer if the history is shorter).
///
/// `burn(p) = (cogs(p) + opex(p)) - revenue(p)`; positive burn means
/// spending more than earning. When the average burn is zero or negative,
/// `months` is `+infinity`. `latest_cash_usd` is the converted sum of cash
/// balances for the single latest cash period, never averaged.
pub fn cash_runway(bundle: &DataBundle) -> Result<CashRunway> {
    let actual_periods = bundle.actual_periods();
    if actual_periods.is_empty() {
        return Err(CopilotError::EmptyDataset {
            source_name: "actuals".to_string(),
        });
    }
    let latest_cash_period = bundle
        .cash_periods()
        .into_iter()
        .max()
        .ok_or_else(|| CopilotError::EmptyDataset {
            source_name: "cash".to_string(),
        })?;

    let window = &actual_periods[actual_periods.len().saturating_sub(BURN_WINDOW)..];
    let burns: Vec<f64> = window
        .iter()
        .map(|&period| {
            let revenue = period_total(&bundle.actuals, period, &bundle.fx, |k| {
                k == AccountKind::Revenue
            });
            let cogs = period_total(&bundle.actuals, period, &bundle.fx, |k| {
                k == AccountKind::Cogs
            });
            let opex = period_total(&bundle.actuals, period, &bundle.fx, |k| {
                matches!(k, AccountKind::Opex(_))
            });
            (cogs + opex) - revenue
        })
        .collect();
    let avg_burn = burns.iter().sum::<f64>() / burns.len() as f64;

    let latest_cash_usd: f64 = bundle
        .cash
        .iter()
        .filter(|c| c.period == latest_cash_period)
        .map(|c| bundle.fx.convert(c.cash_balance, c.period, &c.currency))
        .sum();

    let months = if avg_burn > 0.0 {
        latest_cash_usd / avg_burn
    } else {
        f64::INFINITY
    };
    debug!(
        "Cash runway: avg burn {:.2} over {} periods, latest cash {:.2}",
        avg_burn,
        burns.len(),
        latest_cash_usd
    );

    Ok(CashRunway {
        months,
        latest_cash_usd,
    })
}

/// Resolves the period a metric operates on: an explicit `(month, year)`
/// pair builds that exact key, anything else falls back to the latest
/// period present. One helper so every metric tie-breaks identically.
fn resolve_period(
    source: &str,
    periods: &[PeriodKey],
    month: Option<u32>,
    year: Option<i32>,
) -> Result<PeriodKey> {
    let latest = periods
        .iter()
        .max()
        .copied()
        .ok_or_else(|| CopilotError::EmptyDataset {
            source_name: source.to_string(),
        })?;

    Ok(match (month, year) {
        (Some(month), Some(year)) => PeriodKey::from_ym(year, month),
        _ => latest,
    })
}

fn period_total(
    records: &[LedgerRecord],
    period: PeriodKey,
    fx: &FxTable,
    matches_kind: impl Fn(AccountKind) -> bool,
) -> f64 {
    records
        .iter()
        .filter(|r| r.period == period && matches_kind(r.account_kind()))
        .map(|r| fx.convert(r.amount, r.period, &r.currency))
        .sum()
}
