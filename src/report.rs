use crate::error::Result;
use crate::metrics::{OpexCategory, RevenueVsBudget};
use serde::{Deserialize, Serialize};

/// Categories shown in the text rendering; the CSV and JSON forms carry
/// everything.
const TOP_CATEGORIES: usize = 10;

/// The export collaborator's input: exactly the revenue-vs-budget result
/// and the opex breakdown sequence, nothing else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSnapshot {
    pub revenue: RevenueVsBudget,
    pub opex: Vec<OpexCategory>,
}

impl ReportSnapshot {
    pub fn new(revenue: RevenueVsBudget, opex: Vec<OpexCategory>) -> Self {
        Self { revenue, opex }
    }

    /// Two sections: the revenue-vs-budget numbers with the variance
    /// called out as above or below budget, then the top opex categories.
    pub fn to_text(&self) -> String {
        let mut output = String::new();

        output.push_str("Revenue vs Budget\n");
        output.push_str(&format!("Period: {}\n", self.revenue.period));
        output.push_str(&format!(
            "Revenue (Actual): {}\n",
            format_money(self.revenue.actual_usd)
        ));
        output.push_str(&format!(
            "Revenue (Budget): {}\n",
            format_money(self.revenue.budget_usd)
        ));
        let variance = self.revenue.variance_usd();
        let direction = if variance >= 0.0 { "above" } else { "below" };
        output.push_str(&format!(
            "Variance: {} ({} budget)\n",
            format_money(variance),
            direction
        ));

        output.push_str("\nOpex Breakdown (Top Categories)\n");
        for category in self.opex.iter().take(TOP_CATEGORIES) {
            output.push_str(&format!(
                "{}: {}\n",
                category.category,
                format_money(category.amount_usd)
            ));
        }

        output
    }

    pub fn to_csv(&self) -> String {
        let mut output = String::new();
        output.push_str("Section,Period,Label,Amount USD\n");

        output.push_str(&format!(
            "Revenue,{},Actual,{:.2}\n",
            self.revenue.period, self.revenue.actual_usd
        ));
        output.push_str(&format!(
            "Revenue,{},Budget,{:.2}\n",
            self.revenue.period, self.revenue.budget_usd
        ));
        output.push_str(&format!(
            "Revenue,{},Variance,{:.2}\n",
            self.revenue.period,
            self.revenue.variance_usd()
        ));

        for category in &self.opex {
            output.push_str(&format!(
                "Opex,{},{},{:.2}\n",
                self.revenue.period, category.category, category.amount_usd
            ));
        }

        output
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// `$1,234,567` style: thousands separators, no decimals, sign between
/// the `$` and the digits.
pub fn format_money(amount: f64) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());

    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("${}{}", sign, grouped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::PeriodKey;

    fn snapshot(actual: f64, budget: f64, opex: Vec<(&str, f64)>) -> ReportSnapshot {
        ReportSnapshot::new(
            RevenueVsBudget {
                actual_usd: actual,
                budget_usd: budget,
                period: PeriodKey::parse("2025-06").unwrap(),
            },
            opex.into_iter()
                .map(|(category, amount_usd)| OpexCategory {
                    category: category.to_string(),
                    amount_usd,
                })
                .collect(),
        )
    }

    #[test]
    fn test_text_sections_and_variance_above() {
        let text = snapshot(1_250_000.0, 1_200_000.0, vec![("Marketing", 150_000.0)]).to_text();

        assert!(text.contains("Revenue vs Budget"));
        assert!(text.contains("Period: 2025-06"));
        assert!(text.contains("Revenue (Actual): $1,250,000"));
        assert!(text.contains("Revenue (Budget): $1,200,000"));
        assert!(text.contains("Variance: $50,000 (above budget)"));
        assert!(text.contains("Opex Breakdown (Top Categories)"));
        assert!(text.contains("Marketing: $150,000"));
    }

    #[test]
    fn test_variance_below_budget() {
        let text = snapshot(900_000.0, 1_000_000.0, vec![]).to_text();
        assert!(text.contains("Variance: $-100,000 (below budget)"));
    }

    #[test]
    fn test_text_caps_categories_but_csv_keeps_all() {
        let categories: Vec<(String, f64)> = (0..12)
            .map(|i| (format!("Category{:02}", i), 1_000.0 * (12 - i) as f64))
            .collect();
        let snapshot = ReportSnapshot::new(
            RevenueVsBudget {
                actual_usd: 1.0,
                budget_usd: 1.0,
                period: PeriodKey::parse("2025-06").unwrap(),
            },
            categories
                .iter()
                .map(|(category, amount_usd)| OpexCategory {
                    category: category.clone(),
                    amount_usd: *amount_usd,
                })
                .collect(),
        );

        let text = snapshot.to_text();
        assert!(text.contains("Category09"));
        assert!(!text.contains("Category10"));

        let csv = snapshot.to_csv();
        assert!(csv.contains("Category10"));
        assert!(csv.contains("Category11"));
    }

    #[test]
    fn test_csv_structure() {
        let csv = snapshot(100.0, 80.0, vec![("Rent", 40.0)]).to_csv();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Section,Period,Label,Amount USD");
        assert_eq!(lines[1], "Revenue,2025-06,Actual,100.00");
        assert_eq!(lines[3], "Revenue,2025-06,Variance,20.00");
        assert_eq!(lines[4], "Opex,2025-06,Rent,40.00");
    }

    #[test]
    fn test_json_round_trip() {
        let snapshot = snapshot(100.0, 80.0, vec![("Rent", 40.0)]);
        let json = snapshot.to_json().unwrap();
        let back: ReportSnapshot = serde_json::from_str(&json).unwrap();

        assert_eq!(back.revenue, snapshot.revenue);
        assert_eq!(back.opex, snapshot.opex);
    }

    #[test]
    fn test_money_format() {
        assert_eq!(format_money(0.0), "$0");
        assert_eq!(format_money(999.0), "$999");
        assert_eq!(format_money(1_000.0), "$1,000");
        assert_eq!(format_money(1_234_567.89), "$1,234,568");
        assert_eq!(format_money(-1_234.0), "$-1,234");
    }
}
