//! Question classifier.
//!
//! Maps a free-text finance question to a [`Plan`]: one of a fixed set of
//! intents plus the parameters extracted from the text (month/year, window
//! length). An ordered decision list, first match wins; anything unmatched
//! falls through to [`Plan::Help`], so classification never fails.

use crate::period::month_from_name;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Window applied when a trend question names no explicit span.
const DEFAULT_TREND_WINDOW: usize = 3;

/// Questions the help fallback suggests to the user.
pub const EXAMPLE_QUESTIONS: &[&str] = &[
    "What was June 2025 revenue vs budget in USD?",
    "Show Gross Margin % trend for the last 3 months.",
    "Break down Opex by category for June 2025.",
    "What is our cash runway right now?",
];

/// The classifier's output: intent plus extracted parameters.
///
/// Serializes tagged by `intent` (`{"intent": "gm_trend",
/// "last_n_months": 3}`), which is the shape presentation collaborators
/// consume. Produced per question, consumed once, discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Plan {
    RevenueVsBudget {
        month: Option<u32>,
        year: Option<i32>,
    },
    GmTrend {
        last_n_months: usize,
    },
    OpexBreakdown {
        month: Option<u32>,
        year: Option<i32>,
    },
    CashRunway,
    Help,
}

impl Plan {
    pub fn intent_name(&self) -> &'static str {
        match self {
            Plan::RevenueVsBudget { .. } => "revenue_vs_budget",
            Plan::GmTrend { .. } => "gm_trend",
            Plan::OpexBreakdown { .. } => "opex_breakdown",
            Plan::CashRunway => "cash_runway",
            Plan::Help => "help",
        }
    }
}

/// Classifies a question. Case-insensitive, whitespace-trimmed,
/// deterministic; the rules are evaluated in order and the first match
/// wins, so a question mentioning both runway and budget is a runway
/// question.
pub fn classify(question: &str) -> Plan {
    let lowered = question.to_lowercase();
    let q = lowered.trim();

    if q.contains("cash runway") || (q.contains("runway") && q.contains("cash")) {
        return Plan::CashRunway;
    }

    if q.contains("gross margin") && (q.contains("trend") || q.contains("last")) {
        let last_n_months = extract_window(q).unwrap_or(DEFAULT_TREND_WINDOW);
        return Plan::GmTrend { last_n_months };
    }

    if (q.contains("opex") && (q.contains("breakdown") || q.contains("break down")))
        || q.contains("opex by")
    {
        let (month, year) = extract_month_year(q);
        return Plan::OpexBreakdown { month, year };
    }

    if (q.contains("revenue") && q.contains("budget")) || q.contains("vs budget") {
        let (month, year) = extract_month_year(q);
        return Plan::RevenueVsBudget { month, year };
    }

    debug!("No intent matched, falling back to help");
    Plan::Help
}

/// Pulls `(month, year)` out of a lowercased question: a month name
/// followed by a 4-digit year ("june 2025"), else a numeric
/// year-separator-month form ("2025-06", "2025/6", "2025 06"). Neither
/// matching means "use the latest available period" and is a normal
/// outcome, not an error.
fn extract_month_year(q: &str) -> (Option<u32>, Option<i32>) {
    if let Some((month, year)) = month_name_year(q) {
        return (Some(month), Some(year));
    }
    if let Some((month, year)) = numeric_month_year(q) {
        return (Some(month), Some(year));
    }
    (None, None)
}

fn month_name_year(q: &str) -> Option<(u32, i32)> {
    let re = Regex::new(
        r"(?P<name>jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|jun(?:e)?|jul(?:y)?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\s+(?P<year>20\d{2})",
    )
    .ok()?;
    let caps = re.captures(q)?;
    let month = month_from_name(caps.name("name")?.as_str())?;
    let year = caps.name("year")?.as_str().parse().ok()?;
    Some((month, year))
}

fn numeric_month_year(q: &str) -> Option<(u32, i32)> {
    let re = Regex::new(r"(?P<year>20\d{2})[-/ ](?P<month>0?[1-9]|1[0-2])").ok()?;
    let caps = re.captures(q)?;
    let year = caps.name("year")?.as_str().parse().ok()?;
    let month = caps.name("month")?.as_str().parse().ok()?;
    Some((month, year))
}

fn extract_window(q: &str) -> Option<usize> {
    let re = Regex::new(r"last\s+(\d+)\s+month").ok()?;
    let caps = re.captures(q)?;
    caps.get(1)?.as_str().parse().ok()
}
