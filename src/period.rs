use crate::error::{CopilotError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed month-name lexicon shared by the period normalizer and the
/// question planner. Every accepted spelling maps to a calendar month 1-12.
const MONTH_NAMES: &[(&str, u32)] = &[
    ("jan", 1),
    ("january", 1),
    ("feb", 2),
    ("february", 2),
    ("mar", 3),
    ("march", 3),
    ("apr", 4),
    ("april", 4),
    ("may", 5),
    ("jun", 6),
    ("june", 6),
    ("jul", 7),
    ("july", 7),
    ("aug", 8),
    ("august", 8),
    ("sep", 9),
    ("sept", 9),
    ("september", 9),
    ("oct", 10),
    ("october", 10),
    ("nov", 11),
    ("november", 11),
    ("dec", 12),
    ("december", 12),
];

pub fn month_from_name(token: &str) -> Option<u32> {
    let token = token.trim().to_lowercase();
    MONTH_NAMES
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, number)| *number)
}

/// A calendar month in canonical `YYYY-MM` form.
///
/// Ordering is chronological, which matches lexicographic order of the
/// zero-padded rendering, so "latest period" is simply the maximum key.
/// Serialized as the rendered string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PeriodKey {
    year: i32,
    month: u32,
}

impl PeriodKey {
    /// Builds a key without validation. Metric filters built from an
    /// out-of-range month simply select nothing; `parse` is the validated
    /// path used at load time.
    pub fn from_ym(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Normalizes a raw period value to a canonical key.
    ///
    /// Accepts month-name plus year ("June 2025", "jun 2025"), numeric
    /// year-month ("2025-06", "2025/06", "2025-6"), and full dates
    /// ("2025-06-15", "2025/06/15"). Anything else is a parse error; the
    /// loader attaches the offending source name before surfacing it.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let fail = || CopilotError::PeriodParse {
            source_name: "period".to_string(),
            value: raw.to_string(),
        };

        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        if tokens.len() == 2 {
            if let (Some(month), Ok(year)) = (month_from_name(tokens[0]), tokens[1].parse::<i32>())
            {
                if (1000..=9999).contains(&year) {
                    return Ok(Self { year, month });
                }
            }
        }

        let parts: Vec<&str> = trimmed.split(['-', '/']).collect();
        match parts.len() {
            2 => {
                let year: i32 = parts[0].trim().parse().map_err(|_| fail())?;
                let month: u32 = parts[1].trim().parse().map_err(|_| fail())?;
                if !(1..=12).contains(&month) || !(1000..=9999).contains(&year) {
                    return Err(fail());
                }
                Ok(Self { year, month })
            }
            3 => {
                let normalized = format!(
                    "{}-{}-{}",
                    parts[0].trim(),
                    parts[1].trim(),
                    parts[2].trim()
                );
                let date =
                    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d").map_err(|_| fail())?;
                Ok(Self {
                    year: date.year(),
                    month: date.month(),
                })
            }
            _ => Err(fail()),
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for PeriodKey {
    type Err = CopilotError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PeriodKey {
    type Error = CopilotError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<PeriodKey> for String {
    fn from(key: PeriodKey) -> Self {
        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepted_forms() {
        let expected = PeriodKey::from_ym(2025, 6);
        for raw in ["June 2025", "june 2025", "jun 2025", "2025-06", "2025/06", "2025-6", "2025-06-15", "2025/06/15"] {
            assert_eq!(PeriodKey::parse(raw).unwrap(), expected, "failed for {:?}", raw);
        }
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(
            PeriodKey::parse("  2024-11  ").unwrap(),
            PeriodKey::from_ym(2024, 11)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for raw in ["", "next month", "2025", "2025-13", "2025-00", "13/2025", "June", "June 25", "2025-02-31"] {
            assert!(PeriodKey::parse(raw).is_err(), "accepted {:?}", raw);
        }
    }

    #[test]
    fn test_ordering_is_chronological() {
        let mut keys = vec![
            PeriodKey::from_ym(2025, 1),
            PeriodKey::from_ym(2024, 12),
            PeriodKey::from_ym(2025, 3),
        ];
        keys.sort();
        assert_eq!(
            keys.iter().map(|k| k.to_string()).collect::<Vec<_>>(),
            vec!["2024-12", "2025-01", "2025-03"]
        );
    }

    #[test]
    fn test_display_zero_pads() {
        assert_eq!(PeriodKey::from_ym(2025, 6).to_string(), "2025-06");
        assert_eq!(PeriodKey::from_ym(825, 6).to_string(), "0825-06");
    }

    #[test]
    fn test_month_from_name_variants() {
        assert_eq!(month_from_name("June"), Some(6));
        assert_eq!(month_from_name("sept"), Some(9));
        assert_eq!(month_from_name("SEP"), Some(9));
        assert_eq!(month_from_name("decembers"), None);
        assert_eq!(month_from_name(""), None);
    }

    #[test]
    fn test_serde_round_trip() {
        let key = PeriodKey::from_ym(2025, 6);
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"2025-06\"");
        let back: PeriodKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}
