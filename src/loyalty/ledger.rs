//! Point ledger filtering and aggregation
//!
//! Totals are computed over whatever slice the caller passes in, so the
//! history page can show figures for the filtered view only.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::str::FromStr;

use super::error::{LoyaltyError, LoyaltyResult};
use super::types::{PointTransaction, TransactionType};

/// Which transaction types to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Only(TransactionType),
}

impl FromStr for TypeFilter {
    type Err = LoyaltyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(TypeFilter::All);
        }
        s.parse().map(TypeFilter::Only)
    }
}

/// Date window relative to "today"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateWindow {
    #[default]
    AllTime,
    Last30Days,
    Last90Days,
    ThisYear,
}

impl DateWindow {
    /// Check whether a transaction date falls inside this window
    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            DateWindow::AllTime => true,
            DateWindow::Last30Days => date <= today && date >= today - Duration::days(30),
            DateWindow::Last90Days => date <= today && date >= today - Duration::days(90),
            DateWindow::ThisYear => date <= today && date.year() == today.year(),
        }
    }
}

impl FromStr for DateWindow {
    type Err = LoyaltyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "" | "all-time" | "all" => Ok(DateWindow::AllTime),
            "last-30-days" | "30d" => Ok(DateWindow::Last30Days),
            "last-90-days" | "90d" => Ok(DateWindow::Last90Days),
            "this-year" | "ytd" => Ok(DateWindow::ThisYear),
            other => Err(LoyaltyError::UnknownValue {
                field: "date range",
                value: other.to_string(),
            }),
        }
    }
}

/// Combined search, type, and date filter for the history view
#[derive(Debug, Clone)]
pub struct LedgerFilter {
    pub search: String,
    pub kind: TypeFilter,
    pub window: DateWindow,
    pub today: NaiveDate,
}

impl LedgerFilter {
    /// A filter that keeps everything
    pub fn all(today: NaiveDate) -> Self {
        Self {
            search: String::new(),
            kind: TypeFilter::All,
            window: DateWindow::AllTime,
            today,
        }
    }

    /// Builder method: set search term
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    /// Builder method: set type filter
    pub fn kind(mut self, kind: TypeFilter) -> Self {
        self.kind = kind;
        self
    }

    /// Builder method: set date window
    pub fn window(mut self, window: DateWindow) -> Self {
        self.window = window;
        self
    }

    pub fn matches(&self, tx: &PointTransaction) -> bool {
        let matches_search = self.search.is_empty()
            || tx
                .description
                .to_lowercase()
                .contains(&self.search.to_lowercase());
        let matches_type = match self.kind {
            TypeFilter::All => true,
            TypeFilter::Only(kind) => tx.kind == kind,
        };
        let matches_date = self.window.contains(tx.date, self.today);

        matches_search && matches_type && matches_date
    }

    /// Apply the filter, preserving input order
    pub fn apply(&self, transactions: &[PointTransaction]) -> Vec<PointTransaction> {
        transactions
            .iter()
            .filter(|tx| self.matches(tx))
            .cloned()
            .collect()
    }
}

/// Aggregated figures for a ledger slice
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    pub total_earned: i64,
    pub total_redeemed: i64,
    pub balance: i64,
    pub earn_count: usize,
    pub redeem_count: usize,
}

impl LedgerSummary {
    /// Sum a slice of transactions in a single pass
    pub fn from_transactions<'a, I>(transactions: I) -> Self
    where
        I: IntoIterator<Item = &'a PointTransaction>,
    {
        let mut summary = LedgerSummary::default();
        for tx in transactions {
            match tx.kind {
                TransactionType::Earn => {
                    summary.total_earned += tx.points;
                    summary.earn_count += 1;
                }
                TransactionType::Redeem => {
                    summary.total_redeemed += tx.points.abs();
                    summary.redeem_count += 1;
                }
            }
        }
        summary.balance = summary.total_earned - summary.total_redeemed;
        summary
    }

    pub fn count(&self) -> usize {
        self.earn_count + self.redeem_count
    }
}

/// Current balance: the sum of signed deltas
pub fn balance(transactions: &[PointTransaction]) -> i64 {
    transactions.iter().map(|tx| tx.points).sum()
}

/// Sort newest first; ties keep insertion order
pub fn sort_newest_first(transactions: &mut [PointTransaction]) {
    transactions.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Render a ledger slice as CSV (`id,date,type,points,description`)
pub fn to_csv(transactions: &[PointTransaction]) -> LoyaltyResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["id", "date", "type", "points", "description"])?;

    for tx in transactions {
        let date = tx.date.format("%Y-%m-%d").to_string();
        let kind = tx.kind.to_string();
        let points = tx.points.to_string();
        writer.write_record([
            tx.id.as_str(),
            date.as_str(),
            kind.as_str(),
            points.as_str(),
            tx.description.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| LoyaltyError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| LoyaltyError::Export(e.to_string()))
}
