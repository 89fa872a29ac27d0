//! Table and JSON rendering for command output.

use colored::Colorize;
use prettytable::{Table, format, row};
use serde::Serialize;

use crate::gitops::{ManifestDocument, ResolutionRun, RunReport, SourceEntry};

/// Machine-readable output of `fluxfit resolve`.
#[derive(Debug, Serialize)]
pub struct Inventory<'a> {
    pub documents: Vec<&'a ManifestDocument>,
    pub sources: Vec<&'a SourceEntry>,
    pub report: &'a RunReport,
}

impl<'a> Inventory<'a> {
    pub fn new(run: &'a ResolutionRun, report: &'a RunReport) -> Self {
        Self {
            documents: run.documents.iter().collect(),
            sources: run.registry.iter().collect(),
            report,
        }
    }
}

/// One row per document, in discovery order.
pub fn format_inventory_table(run: &ResolutionRun) -> String {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(row![b => "LOCATION", "API VERSION", "KIND", "NAMESPACE", "NAME"]);

    for doc in &run.documents {
        table.add_row(row![
            doc.location.display(),
            doc.api_version,
            doc.kind,
            doc.namespace,
            doc.name
        ]);
    }

    table.to_string()
}

/// Colored run summary.
pub fn format_report(report: &RunReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("\n{}\n", "Run summary".bold()));
    output.push_str(&format!("{}\n", "=".repeat(60)));
    output.push_str(&format!("Documents:  {}\n", report.documents));
    output.push_str(&format!("Releases:   {}\n", report.releases));
    output.push_str(&format!("Charts:     {}\n", report.charts));
    output.push_str(&format!("Patched:    {}\n", report.patched.to_string().green()));

    if !report.written.is_empty() {
        let heading = if report.dry_run {
            "Would write:".yellow().bold()
        } else {
            "Written:".green().bold()
        };
        output.push_str(&format!("\n{}\n", heading));
        for path in &report.written {
            output.push_str(&format!("  {}\n", path.display()));
        }
    }

    if !report.warnings.is_empty() {
        output.push_str(&format!("\n{} ({})\n", "Warnings".yellow().bold(), report.warnings.len()));
        for warning in &report.warnings {
            output.push_str(&format!("  ⚠️  {}\n", warning));
        }
    }

    output
}
