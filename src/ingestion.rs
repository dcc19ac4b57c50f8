use crate::error::{CopilotError, Result};
use crate::fx::{FxRateEntry, FxTable};
use crate::period::PeriodKey;
use crate::schema::{BundleConfig, CashEntry, DataBundle, LedgerRecord};
use csv::{ReaderBuilder, Trim};
use log::{debug, info};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// An untyped tabular source: a name (for error messages), a header row,
/// and string cells. The CSV constructors are thin adapters; all validation
/// lives in [`load_bundle`], so non-CSV collaborators can feed
/// [`RawTable::from_rows`] and get identical checking.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub source: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn from_rows(
        source: impl Into<String>,
        columns: Vec<&str>,
        rows: Vec<Vec<&str>>,
    ) -> Self {
        Self {
            source: source.into(),
            columns: columns.into_iter().map(|c| c.trim().to_string()).collect(),
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(|cell| cell.to_string()).collect())
                .collect(),
        }
    }

    pub fn from_csv_reader<R: Read>(source: impl Into<String>, reader: R) -> Result<Self> {
        let source = source.into();
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let columns = csv_reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        debug!("Read {} rows from source '{}'", rows.len(), source);
        Ok(Self {
            source,
            columns,
            rows,
        })
    }

    /// Reads a CSV file, naming the source after the file stem
    /// (`actuals.csv` becomes source `actuals` in error messages).
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("table")
            .to_string();
        let file = File::open(path)?;
        Self::from_csv_reader(source, file)
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| CopilotError::MissingColumn {
                source_name: self.source.clone(),
                column: name.to_string(),
            })
    }
}

/// The four tabular sources one bundle is built from.
#[derive(Debug, Clone)]
pub struct BundleSources {
    pub actuals: RawTable,
    pub budget: RawTable,
    pub fx: RawTable,
    pub cash: RawTable,
}

impl BundleSources {
    /// Convenience constructor reading `actuals.csv`, `budget.csv`, `fx.csv`
    /// and `cash.csv` from one directory.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        Ok(Self {
            actuals: RawTable::from_csv_path(dir.join("actuals.csv"))?,
            budget: RawTable::from_csv_path(dir.join("budget.csv"))?,
            fx: RawTable::from_csv_path(dir.join("fx.csv"))?,
            cash: RawTable::from_csv_path(dir.join("cash.csv"))?,
        })
    }
}

/// Validates the four sources and builds the immutable [`DataBundle`].
///
/// Fail-fast: the first missing column, unparsable period, malformed number
/// or duplicate FX rate aborts the whole load. No partial bundle is ever
/// returned.
pub fn load_bundle(sources: &BundleSources, config: &BundleConfig) -> Result<DataBundle> {
    let reporting = config.reporting_currency.as_str();

    let actuals = parse_ledger(&sources.actuals, reporting)?;
    let budget = parse_ledger(&sources.budget, reporting)?;
    let fx_entries = parse_fx(&sources.fx)?;
    let cash = parse_cash(&sources.cash, reporting)?;
    let fx = FxTable::from_entries(fx_entries, reporting)?;

    info!(
        "Loaded data bundle: {} actuals rows, {} budget rows, {} FX rates, {} cash entries (reporting currency {})",
        actuals.len(),
        budget.len(),
        fx.len(),
        cash.len(),
        reporting
    );

    Ok(DataBundle {
        actuals,
        budget,
        fx,
        cash,
        reporting_currency: reporting.to_string(),
    })
}

fn parse_ledger(table: &RawTable, reporting_currency: &str) -> Result<Vec<LedgerRecord>> {
    let period_idx = table.require_column("period")?;
    let entity_idx = table.require_column("entity")?;
    let account_idx = table.require_column("account")?;
    let amount_idx = table.require_column("amount")?;
    let currency_idx = table.column_index("currency");

    let mut records = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        records.push(LedgerRecord {
            period: parse_period(&table.source, cell(row, period_idx))?,
            entity: cell(row, entity_idx).to_string(),
            account: cell(row, account_idx).to_string(),
            amount: parse_number(&table.source, "amount", cell(row, amount_idx))?,
            currency: cell_or_default(row, currency_idx, reporting_currency),
        });
    }
    Ok(records)
}

fn parse_fx(table: &RawTable) -> Result<Vec<FxRateEntry>> {
    let period_idx = table.require_column("period")?;
    let currency_idx = table.require_column("currency")?;
    let rate_idx = table.require_column("rate_to_usd")?;

    let mut entries = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        entries.push(FxRateEntry {
            period: parse_period(&table.source, cell(row, period_idx))?,
            currency: cell(row, currency_idx).to_string(),
            rate_to_usd: parse_number(&table.source, "rate_to_usd", cell(row, rate_idx))?,
        });
    }
    Ok(entries)
}

fn parse_cash(table: &RawTable, reporting_currency: &str) -> Result<Vec<CashEntry>> {
    let period_idx = table.require_column("period")?;
    let balance_idx = table.require_column("cash_balance")?;
    let currency_idx = table.column_index("currency");

    let mut entries = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        entries.push(CashEntry {
            period: parse_period(&table.source, cell(row, period_idx))?,
            currency: cell_or_default(row, currency_idx, reporting_currency),
            cash_balance: parse_number(&table.source, "cash_balance", cell(row, balance_idx))?,
        });
    }
    Ok(entries)
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("").trim()
}

// An absent column and an empty cell both fall back to the reporting
// currency.
fn cell_or_default(row: &[String], idx: Option<usize>, default: &str) -> String {
    match idx.map(|i| cell(row, i)) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => default.to_string(),
    }
}

fn parse_period(source: &str, value: &str) -> Result<PeriodKey> {
    PeriodKey::parse(value).map_err(|_| CopilotError::PeriodParse {
        source_name: source.to_string(),
        value: value.to_string(),
    })
}

fn parse_number(source: &str, column: &str, value: &str) -> Result<f64> {
    value
        .parse::<f64>()
        .map_err(|_| CopilotError::NumberParse {
            source_name: source.to_string(),
            column: column.to_string(),
            value: value.to_string(),
        })
}
