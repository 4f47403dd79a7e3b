//! `wipctl report`: list stored reports or print one.

use anyhow::{Context, Result};
use clap::Args;
use tabled::{settings::Style, Table, Tabled};

use wipctl_sync::{list_reports_at, read_report_at};

use super::GlobalArgs;

/// Arguments for `wipctl report`.
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Print this report: a file name in the report directory or an absolute path.
    #[arg(long, value_name = "FILE")]
    pub show: Option<String>,
}

#[derive(Tabled)]
struct ReportTableRow {
    #[tabled(rename = "file")]
    file: String,
    #[tabled(rename = "operation")]
    operation: String,
    #[tabled(rename = "age")]
    age: String,
    #[tabled(rename = "size")]
    size: String,
}

impl ReportArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let config = global.config()?;

        if let Some(file) = self.show {
            let content = read_report_at(&config.report_dir, &file)
                .with_context(|| format!("failed to read report '{file}'"))?;
            print!("{content}");
            return Ok(());
        }

        let reports = list_reports_at(&config.report_dir).context("failed to list reports")?;
        if reports.is_empty() {
            println!("No reports in {}.", config.report_dir.display());
            return Ok(());
        }

        let rows: Vec<ReportTableRow> = reports
            .iter()
            .map(|r| ReportTableRow {
                file: r.name.clone(),
                operation: r.operation.clone(),
                age: r.age(),
                size: r.size_label(),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}
