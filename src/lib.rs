//! # CFO Copilot
//!
//! A library for answering natural-language finance questions ("revenue vs
//! budget for June 2025", "what is our cash runway?") against tabular
//! financial data: actuals, budget, FX rates and cash balances.
//!
//! ## Core Concepts
//!
//! - **Period**: a calendar month, canonicalized to a `YYYY-MM` key that
//!   sorts chronologically
//! - **Data Bundle**: the validated, immutable aggregate of the four input
//!   tables, loaded once per session
//! - **Plan**: the classified intent of a question plus its extracted
//!   parameters (month/year, trend window)
//! - **Metric Engine**: pure functions over the bundle, converting every
//!   amount to the reporting currency before it enters a sum
//! - **Answer**: the typed result handed to presentation collaborators
//!
//! ## Example
//!
//! ```rust,ignore
//! use cfo_copilot::*;
//!
//! let sources = BundleSources::from_dir("fixtures")?;
//! let bundle = load_bundle(&sources, &BundleConfig::default())?;
//!
//! match answer(&bundle, "What was June 2025 revenue vs budget?")? {
//!     Answer::RevenueVsBudget(result) => {
//!         println!(
//!             "{}: actual {:.0} vs budget {:.0}",
//!             result.period, result.actual_usd, result.budget_usd
//!         );
//!     }
//!     _ => {}
//! }
//! ```

pub mod error;
pub mod fx;
pub mod ingestion;
pub mod metrics;
pub mod period;
pub mod planner;
pub mod report;
pub mod schema;

pub use error::{CopilotError, Result};
pub use fx::{FxRateEntry, FxTable};
pub use ingestion::{load_bundle, BundleSources, RawTable};
pub use metrics::{
    cash_runway, ebitda_proxy, gross_margin_trend, opex_breakdown, revenue_vs_budget, CashRunway,
    GrossMarginPoint, OpexCategory, RevenueVsBudget,
};
pub use period::PeriodKey;
pub use planner::{classify, Plan, EXAMPLE_QUESTIONS};
pub use report::{format_money, ReportSnapshot};
pub use schema::{AccountKind, BundleConfig, CashEntry, DataBundle, LedgerRecord};

use log::info;
use serde::{Deserialize, Serialize};

/// A computed answer, one variant per intent.
///
/// `Help` carries the example questions so a collaborator can render them
/// without reaching into the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    RevenueVsBudget(RevenueVsBudget),
    GrossMarginTrend(Vec<GrossMarginPoint>),
    OpexBreakdown(Vec<OpexCategory>),
    CashRunway(CashRunway),
    Help { examples: Vec<String> },
}

/// Classifies a question and computes the matching metric.
///
/// Classification itself never fails; the metric computation can, and a
/// session loop should catch that per question rather than exit, since one
/// bad question must not prevent asking another.
pub fn answer(bundle: &DataBundle, question: &str) -> Result<Answer> {
    let plan = classify(question);
    info!("Classified question as intent '{}'", plan.intent_name());
    execute(bundle, &plan)
}

/// Runs an already-classified [`Plan`] against the bundle.
pub fn execute(bundle: &DataBundle, plan: &Plan) -> Result<Answer> {
    match *plan {
        Plan::RevenueVsBudget { month, year } => Ok(Answer::RevenueVsBudget(revenue_vs_budget(
            bundle, month, year,
        )?)),
        Plan::GmTrend { last_n_months } => Ok(Answer::GrossMarginTrend(gross_margin_trend(
            bundle,
            last_n_months,
        )?)),
        Plan::OpexBreakdown { month, year } => {
            Ok(Answer::OpexBreakdown(opex_breakdown(bundle, month, year)?))
        }
        Plan::CashRunway => Ok(Answer::CashRunway(cash_runway(bundle)?)),
        Plan::Help => Ok(Answer::Help {
            examples: EXAMPLE_QUESTIONS.iter().map(|q| q.to_string()).collect(),
        }),
    }
}
