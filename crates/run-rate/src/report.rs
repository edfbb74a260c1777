//! Ranked cost table.

use std::fmt::Write as _;

use run_rate_cost::{AccountDirectory, CostTotals};
use thiserror::Error;

/// Column separator between table cells.
const COLUMN_GAP: &str = "  ";

/// Error rendering the report table.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("failed to render report table: {0}")]
    Render(#[from] std::fmt::Error),
}

/// Which figures the report carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportKind {
    /// `Account  Day  Month`, ranked by month to date.
    #[default]
    DailyAndMonthly,
    /// `Account  Cost` for the last day.
    DailyOnly,
    /// `Account  Cost` for the month to date.
    MonthlyOnly,
}

/// One account's line in the report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub account_id: String,
    pub account_name: String,
    pub daily_amount: f64,
    pub monthly_amount: f64,
}

/// Rows ranked for one report kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    kind: ReportKind,
    rows: Vec<ReportRow>,
}

impl Report {
    /// Join the directory with cost totals and rank the rows.
    ///
    /// Every directory account yields exactly one row; an account missing from
    /// a totals map reads `0.0`. Rows are ordered by descending monthly amount
    /// (or by the single figure for single-metric reports), keeping directory
    /// order on ties.
    #[must_use]
    pub fn build(
        kind: ReportKind,
        directory: &AccountDirectory,
        daily: &CostTotals,
        monthly: &CostTotals,
    ) -> Self {
        let mut rows: Vec<ReportRow> = directory
            .iter()
            .map(|account| ReportRow {
                account_id: account.id.clone(),
                account_name: account.name.clone(),
                daily_amount: daily.get(&account.id),
                monthly_amount: monthly.get(&account.id),
            })
            .collect();

        rows.sort_by(|a, b| kind.rank_amount(b).total_cmp(&kind.rank_amount(a)));

        Self { kind, rows }
    }

    /// Ranked rows.
    #[must_use]
    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// Sum of the daily and monthly columns.
    #[must_use]
    pub fn totals(&self) -> (f64, f64) {
        self.rows.iter().fold((0.0, 0.0), |(day, month), row| {
            (day + row.daily_amount, month + row.monthly_amount)
        })
    }

    /// Render the fixed-width table.
    ///
    /// The account column is left-aligned, amounts are right-aligned with two
    /// decimals. Lines carry no trailing whitespace and the table has no
    /// trailing newline.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] if writing to the buffer fails.
    pub fn render(&self) -> Result<String, FormatError> {
        let header: Vec<String> = self
            .kind
            .headers()
            .iter()
            .map(ToString::to_string)
            .collect();
        let body: Vec<Vec<String>> = self.rows.iter().map(|row| self.kind.cells(row)).collect();

        let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
        for cells in &body {
            for (width, cell) in widths.iter_mut().zip(cells) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        for (index, cells) in std::iter::once(&header).chain(&body).enumerate() {
            if index > 0 {
                out.push('\n');
            }
            write_line(&mut out, cells, &widths)?;
        }
        Ok(out)
    }
}

impl ReportKind {
    fn headers(self) -> &'static [&'static str] {
        match self {
            Self::DailyAndMonthly => &["Account", "Day", "Month"],
            Self::DailyOnly | Self::MonthlyOnly => &["Account", "Cost"],
        }
    }

    fn cells(self, row: &ReportRow) -> Vec<String> {
        match self {
            Self::DailyAndMonthly => vec![
                row.account_name.clone(),
                format_amount(row.daily_amount),
                format_amount(row.monthly_amount),
            ],
            Self::DailyOnly => vec![row.account_name.clone(), format_amount(row.daily_amount)],
            Self::MonthlyOnly => vec![row.account_name.clone(), format_amount(row.monthly_amount)],
        }
    }

    fn rank_amount(self, row: &ReportRow) -> f64 {
        match self {
            Self::DailyOnly => row.daily_amount,
            Self::DailyAndMonthly | Self::MonthlyOnly => row.monthly_amount,
        }
    }
}

/// Format an amount with exactly two decimals.
#[must_use]
pub fn format_amount(amount: f64) -> String {
    format!("{amount:.2}")
}

fn write_line(out: &mut String, cells: &[String], widths: &[usize]) -> Result<(), FormatError> {
    let mut line = String::new();
    for (column, (cell, width)) in cells.iter().zip(widths.iter().copied()).enumerate() {
        if column == 0 {
            write!(line, "{cell:<width$}")?;
        } else {
            write!(line, "{COLUMN_GAP}{cell:>width$}")?;
        }
    }
    out.push_str(line.trim_end());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use run_rate_cost::Account;

    fn directory() -> AccountDirectory {
        vec![Account::new("111", "Alpha"), Account::new("222", "Beta")]
            .into_iter()
            .collect()
    }

    fn totals(entries: &[(&str, f64)]) -> CostTotals {
        entries.iter().map(|(id, amount)| (*id, *amount)).collect()
    }

    #[test]
    fn test_ranked_by_monthly_not_daily() {
        let report = Report::build(
            ReportKind::DailyAndMonthly,
            &directory(),
            &totals(&[("111", 10.0)]),
            &totals(&[("111", 300.0), ("222", 150.0)]),
        );

        let names: Vec<&str> = report.rows().iter().map(|r| r.account_name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Beta"]);
        assert_eq!(
            report.render().unwrap(),
            "Account    Day   Month\n\
             Alpha    10.00  300.00\n\
             Beta      0.00  150.00"
        );
    }

    #[test]
    fn test_every_account_gets_a_row() {
        let directory: AccountDirectory = (0..12)
            .map(|i| Account::new(format!("{i:012}"), format!("account-{i}")))
            .collect();
        let report = Report::build(
            ReportKind::DailyAndMonthly,
            &directory,
            &CostTotals::new(),
            &totals(&[("000000000003", 1.0)]),
        );

        assert_eq!(report.rows().len(), directory.len());
        assert_eq!(report.rows()[0].account_name, "account-3");
        for row in &report.rows()[1..] {
            assert!(row.monthly_amount.abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_sorted_descending_by_monthly() {
        let directory: AccountDirectory = ["a", "b", "c", "d"]
            .iter()
            .map(|id| Account::new(*id, id.to_uppercase()))
            .collect();
        let report = Report::build(
            ReportKind::DailyAndMonthly,
            &directory,
            &totals(&[("a", 99.0)]),
            &totals(&[("a", 1.0), ("b", 7.5), ("c", 3.0), ("d", 7.5)]),
        );

        let rows = report.rows();
        for pair in rows.windows(2) {
            assert!(pair[0].monthly_amount >= pair[1].monthly_amount);
        }
        // Equal amounts keep directory order.
        assert_eq!(rows[0].account_id, "b");
        assert_eq!(rows[1].account_id, "d");
    }

    #[test]
    fn test_missing_totals_render_as_zero() {
        let report = Report::build(
            ReportKind::DailyAndMonthly,
            &directory(),
            &CostTotals::new(),
            &CostTotals::new(),
        );
        let table = report.render().unwrap();

        assert_eq!(table.lines().count(), 3);
        assert!(table
            .lines()
            .skip(1)
            .all(|line| line.split_whitespace().skip(1).all(|cell| cell == "0.00")));
    }

    #[test]
    fn test_two_decimals_for_integer_amounts() {
        assert_eq!(format_amount(100.0), "100.00");
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(1.005_1), "1.01");
        assert_eq!(format_amount(12.3), "12.30");
    }

    #[test]
    fn test_monthly_only_single_column() {
        let report = Report::build(
            ReportKind::MonthlyOnly,
            &directory(),
            &totals(&[("222", 500.0)]),
            &totals(&[("111", 300.0), ("222", 150.0)]),
        );

        assert_eq!(
            report.render().unwrap(),
            "Account    Cost\n\
             Alpha    300.00\n\
             Beta     150.00"
        );
    }

    #[test]
    fn test_daily_only_ranks_by_daily() {
        let report = Report::build(
            ReportKind::DailyOnly,
            &directory(),
            &totals(&[("222", 5.0), ("111", 1.0)]),
            &CostTotals::new(),
        );

        assert_eq!(report.rows()[0].account_name, "Beta");
        assert!(report.render().unwrap().starts_with("Account  Cost\n"));
    }

    #[test]
    fn test_empty_directory_renders_header_only() {
        let report = Report::build(
            ReportKind::DailyAndMonthly,
            &AccountDirectory::default(),
            &CostTotals::new(),
            &CostTotals::new(),
        );
        assert_eq!(report.render().unwrap(), "Account  Day  Month");
    }

    #[test]
    fn test_totals_sum_columns() {
        let report = Report::build(
            ReportKind::DailyAndMonthly,
            &directory(),
            &totals(&[("111", 10.0), ("222", 2.5)]),
            &totals(&[("111", 300.0), ("222", 150.0)]),
        );
        let (day, month) = report.totals();
        assert!((day - 12.5).abs() < 1e-9);
        assert!((month - 450.0).abs() < 1e-9);
    }
}
