//! Report generation functionality

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::core::entry::{Entry, ValidationKey};
use crate::reporting::messages::MessageProvider;
use crate::scanner::duplicate_detector::{find_duplicate_groups, DuplicateInfo};

/// Validation outcome for one ads.txt file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub publisher_domain: Option<String>,
    pub entries: Vec<Entry>,
}

/// Counts derived from a set of validated entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub total_entries: usize,
    pub records: usize,
    pub variables: usize,
    pub invalid: usize,
    pub with_warnings: usize,
    pub warnings_by_key: BTreeMap<ValidationKey, usize>,
    pub duplicate_groups: Vec<DuplicateInfo>,
}

pub fn summarize(entries: &[Entry]) -> ReportSummary {
    let mut summary = ReportSummary {
        total_entries: entries.len(),
        duplicate_groups: find_duplicate_groups(entries),
        ..ReportSummary::default()
    };

    for entry in entries {
        match entry {
            Entry::Variable(_) => summary.variables += 1,
            Entry::Record(record) => {
                summary.records += 1;
                if !record.is_valid {
                    summary.invalid += 1;
                }
                if record.has_warning {
                    summary.with_warnings += 1;
                }
                for warning in &record.all_warnings {
                    *summary.warnings_by_key.entry(warning.key).or_insert(0) += 1;
                }
            }
        }
    }

    summary
}

/// Write a text report for validated files
///
/// # Arguments
/// * `output_path` - Path to output file
/// * `reports` - Per-file validation results
/// * `messages` - Renders validation keys into readable text
pub fn write_report(
    output_path: &Path,
    reports: &[FileReport],
    messages: &MessageProvider,
) -> Result<()> {
    let file = File::create(output_path)
        .with_context(|| format!("Failed to create report {}", output_path.display()))?;
    let mut out = BufWriter::new(file);

    let now = std::time::SystemTime::now();
    writeln!(out, "ads.txt Validation Report")?;
    writeln!(out, "=========================")?;
    writeln!(out, "Generated: {:?}", now)?;
    writeln!(out, "Files: {}", reports.len())?;
    writeln!(out)?;

    for report in reports {
        write_file_section(&mut out, report, messages)?;
    }

    out.flush()?;
    Ok(())
}

fn write_file_section(
    out: &mut impl Write,
    report: &FileReport,
    messages: &MessageProvider,
) -> Result<()> {
    let summary = summarize(&report.entries);

    writeln!(out, "File: {}", report.path.display())?;
    writeln!(out, "{}", "-".repeat(6 + report.path.display().to_string().len()))?;
    match &report.publisher_domain {
        Some(domain) => writeln!(out, "  Publisher domain: {}", domain)?,
        None => writeln!(out, "  Publisher domain: (not cross-checked)")?,
    }
    writeln!(out, "  Records: {}", summary.records)?;
    writeln!(out, "  Variables: {}", summary.variables)?;
    writeln!(out, "  Invalid records: {}", summary.invalid)?;
    writeln!(out, "  Records with warnings: {}", summary.with_warnings)?;

    if !summary.warnings_by_key.is_empty() {
        writeln!(out, "  Warnings by type:")?;
        for (key, count) in &summary.warnings_by_key {
            writeln!(out, "    {}: {}", key, count)?;
        }
    }
    writeln!(out)?;

    let mut entries: Vec<&Entry> = report.entries.iter().collect();
    entries.sort_by_key(|e| e.line_number());

    let invalid: Vec<_> = entries
        .iter()
        .filter_map(|e| e.as_record())
        .filter(|r| !r.is_valid)
        .collect();
    if !invalid.is_empty() {
        writeln!(out, "  Errors:")?;
        for record in invalid {
            let rendered = record
                .validation_key
                .map(|key| messages.format(key, &record.warning_params).message)
                .unwrap_or_default();
            writeln!(out, "    line {}: {} [{}]", record.line_number, rendered, record.raw_line.trim())?;
        }
        writeln!(out)?;
    }

    let warned: Vec<_> = entries
        .iter()
        .filter_map(|e| e.as_record())
        .filter(|r| r.is_valid && r.has_warning)
        .collect();
    if !warned.is_empty() {
        writeln!(out, "  Warnings:")?;
        for record in warned {
            for warning in &record.all_warnings {
                let rendered = messages.format_warning(warning);
                writeln!(
                    out,
                    "    line {} ({}): {}",
                    record.line_number, rendered.severity, rendered.message
                )?;
            }
        }
        writeln!(out)?;
    }

    if !summary.duplicate_groups.is_empty() {
        writeln!(out, "  Repeated records:")?;
        for (idx, dup) in summary.duplicate_groups.iter().enumerate() {
            let lines: Vec<String> = dup.line_numbers.iter().map(|n| n.to_string()).collect();
            writeln!(out, "    Group {} ({}): lines {}", idx + 1, dup.key, lines.join(", "))?;
        }
        writeln!(out)?;
    }

    Ok(())
}

/// Write validated entries as pretty-printed JSON
pub fn write_json_report(output_path: &Path, reports: &[FileReport]) -> Result<()> {
    let file = File::create(output_path)
        .with_context(|| format!("Failed to create report {}", output_path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), reports)
        .context("Failed to write JSON report")?;
    Ok(())
}
