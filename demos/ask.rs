//! ask: interactive question loop over a directory of CSV sources.
//!
//! Usage:
//!   cargo run --example ask
//!   cargo run --example ask -- path/to/data-dir

use anyhow::Result;
use cfo_copilot::{
    classify, execute, format_money, load_bundle, opex_breakdown, Answer, BundleConfig,
    BundleSources, DataBundle, Plan, ReportSnapshot,
};
use std::env;
use std::io::{self, Write};

fn main() -> Result<()> {
    env_logger::init();

    let data_dir = env::args().nth(1).unwrap_or_else(|| "fixtures".to_string());
    let sources = BundleSources::from_dir(&data_dir)?;
    let bundle = load_bundle(&sources, &BundleConfig::default())?;

    println!("Mini CFO Copilot - ask a finance question (Ctrl-D to exit)");
    println!("Try: What was June 2025 revenue vs budget in USD?");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }

        let plan = classify(question);
        println!("Intent: {}", plan.intent_name());

        // One bad question must not kill the session.
        match execute(&bundle, &plan) {
            Ok(answer) => render(&bundle, &plan, &answer)?,
            Err(err) => println!("Could not answer that: {}", err),
        }
    }

    Ok(())
}

fn render(bundle: &DataBundle, plan: &Plan, answer: &Answer) -> Result<()> {
    match answer {
        Answer::RevenueVsBudget(result) => {
            println!(
                "Revenue in {}: Actual {} vs Budget {}",
                result.period,
                format_money(result.actual_usd),
                format_money(result.budget_usd)
            );

            // Snapshot export alongside the answer, same period.
            if let Plan::RevenueVsBudget { month, year } = *plan {
                let opex = opex_breakdown(bundle, month, year)?;
                let snapshot = ReportSnapshot::new(result.clone(), opex);
                std::fs::write("cfo_snapshot.txt", snapshot.to_text())?;
                println!("(snapshot written to cfo_snapshot.txt)");
            }
        }
        Answer::GrossMarginTrend(points) => {
            println!("Gross margin % trend:");
            for point in points {
                if point.gm_pct.is_nan() {
                    println!("  {}  n/a (no revenue)", point.period);
                } else {
                    println!("  {}  {:.1}%", point.period, point.gm_pct);
                }
            }
        }
        Answer::OpexBreakdown(categories) => {
            println!("Opex by category (USD):");
            for category in categories {
                println!(
                    "  {:<24} {}",
                    category.category,
                    format_money(category.amount_usd)
                );
            }
        }
        Answer::CashRunway(runway) => {
            if runway.months.is_infinite() {
                println!(
                    "Cash runway: infinite (positive cash flow). Current cash: {}",
                    format_money(runway.latest_cash_usd)
                );
            } else {
                println!(
                    "Cash runway: {:.1} months (current cash {})",
                    runway.months,
                    format_money(runway.latest_cash_usd)
                );
            }
        }
        Answer::Help { examples } => {
            println!("I can answer questions like:");
            for example in examples {
                println!("  - {}", example);
            }
        }
    }
    Ok(())
}
