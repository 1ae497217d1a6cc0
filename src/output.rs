//! Output formatting for audit reports

use crate::error::{Error, Result};
use crate::report::{AuditReport, Impact, PerformanceScore, Severity, TechnicalIssue};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ContentArrangement, Table, presets::UTF8_FULL,
};
use std::io::Write;
use std::str::FromStr;

/// Output format for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable table output
    #[default]
    Human,
    /// JSON output
    Json,
    /// No output (silent mode)
    None,
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            "none" => Ok(Self::None),
            _ => Err(Error::InvalidOutputFormat(s.to_string())),
        }
    }
}

/// Sort order for the technical issue table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputSort {
    /// Order in which the rules are evaluated (default)
    #[default]
    Rule,
    /// Most severe first, rule order within a severity
    Severity,
}

impl FromStr for OutputSort {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rule" => Ok(Self::Rule),
            "severity" => Ok(Self::Severity),
            _ => Err(Error::InvalidOutputSort(s.to_string())),
        }
    }
}

/// Configuration for output formatting
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Output format
    pub format: OutputFormat,
    /// Sort order
    pub sort: OutputSort,
}

impl OutputConfig {
    /// Create a new output config
    pub fn new(format: OutputFormat, sort: OutputSort) -> Self {
        Self { format, sort }
    }
}

/// Output an audit report
pub fn output_report<W: Write>(
    report: &AuditReport,
    config: &OutputConfig,
    writer: &mut W,
) -> Result<()> {
    match config.format {
        OutputFormat::Human => output_human(report, config, writer),
        OutputFormat::Json => output_json(report, writer),
        OutputFormat::None => Ok(()),
    }
}

/// Output JSON format
fn output_json<W: Write>(report: &AuditReport, writer: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, report)?;
    writeln!(writer).map_err(Error::OutputFailed)?;
    Ok(())
}

/// Output human-readable table format
fn output_human<W: Write>(
    report: &AuditReport,
    config: &OutputConfig,
    writer: &mut W,
) -> Result<()> {
    writeln!(writer, "{}", score_table(report)).map_err(Error::OutputFailed)?;
    writeln!(writer, "{}", vitals_table(report)).map_err(Error::OutputFailed)?;
    writeln!(writer, "{}", findings_table(report)).map_err(Error::OutputFailed)?;

    if report.technical_issues.is_empty() {
        writeln!(writer, "No technical issues found").map_err(Error::OutputFailed)?;
    } else {
        let issues = sorted_issues(&report.technical_issues, config.sort);
        writeln!(writer, "{}", issue_table(&issues)).map_err(Error::OutputFailed)?;
    }

    writeln!(writer, "{}", recommendation_table(report)).map_err(Error::OutputFailed)
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
                .collect::<Vec<_>>(),
        );
    table
}

/// Score cell colored by Lighthouse bands (90+ good, 50+ average)
fn score_cell(score: u8) -> Cell {
    let color = match score {
        90.. => Color::Green,
        50.. => Color::Yellow,
        _ => Color::Red,
    };
    Cell::new(score)
        .fg(color)
        .set_alignment(CellAlignment::Right)
}

fn score_table(report: &AuditReport) -> Table {
    let mut table = new_table(&["Category", "Mobile", "Desktop"]);

    let rows: [(&str, fn(&PerformanceScore) -> u8); 4] = [
        ("Performance", |s| s.performance),
        ("Accessibility", |s| s.accessibility),
        ("Best Practices", |s| s.best_practices),
        ("SEO", |s| s.seo),
    ];
    for (name, score) in rows {
        table.add_row(vec![
            Cell::new(name),
            score_cell(score(&report.mobile_score)),
            score_cell(score(&report.desktop_score)),
        ]);
    }

    table.add_row(vec![
        Cell::new("Overall").add_attribute(Attribute::Bold),
        score_cell(report.overall_score),
        Cell::new(""),
    ]);
    table
}

/// Rating for a paint metric given its good/poor thresholds in ms
fn vital_rating(value: f64, good: f64, poor: f64) -> Cell {
    if value <= 0.0 {
        Cell::new("N/A").fg(Color::DarkGrey)
    } else if value < good {
        Cell::new("Good").fg(Color::Green)
    } else if value < poor {
        Cell::new("Needs Improvement").fg(Color::Yellow)
    } else {
        Cell::new("Poor").fg(Color::Red)
    }
}

fn vitals_table(report: &AuditReport) -> Table {
    let mut table = new_table(&["Metric", "Value", "Rating"]);
    table.add_row(vec![
        Cell::new("First Contentful Paint"),
        Cell::new(&report.fcp),
        vital_rating(report.fcp_numeric, 1800.0, 3000.0),
    ]);
    table.add_row(vec![
        Cell::new("Largest Contentful Paint"),
        Cell::new(&report.lcp),
        vital_rating(report.lcp_numeric, 2500.0, 4000.0),
    ]);
    table
}

fn yes_no(value: bool) -> Cell {
    if value {
        Cell::new("Yes").fg(Color::Green)
    } else {
        Cell::new("No").fg(Color::Yellow)
    }
}

fn findings_table(report: &AuditReport) -> Table {
    let mut table = new_table(&["Check", "Result"]);
    let meta = &report.meta_tags;
    let headings = &report.heading_structure;

    table.add_row(vec![
        Cell::new("Title"),
        Cell::new(match &meta.title {
            Some(title) => format!("{} ({} chars)", title, meta.title_length),
            None => "-".to_string(),
        }),
    ]);
    table.add_row(vec![
        Cell::new("Meta description"),
        Cell::new(match &meta.description {
            Some(_) => format!("{} chars", meta.description_length),
            None => "-".to_string(),
        }),
    ]);
    table.add_row(vec![Cell::new("H1 headings"), Cell::new(headings.h1_count)]);
    table.add_row(vec![
        Cell::new("Heading hierarchy"),
        yes_no(headings.proper_hierarchy),
    ]);
    table.add_row(vec![
        Cell::new("Images without alt"),
        Cell::new(format!(
            "{} of {}",
            report.image_optimization.images_without_alt, report.image_optimization.total_images
        )),
    ]);
    table.add_row(vec![
        Cell::new("Word count"),
        Cell::new(report.content_analysis.word_count),
    ]);
    table.add_row(vec![Cell::new("HTTPS"), yes_no(report.https_security.is_secure)]);
    table.add_row(vec![Cell::new("HSTS"), yes_no(report.https_security.has_hsts)]);
    table.add_row(vec![
        Cell::new("Compression"),
        yes_no(report.technical_headers.is_compressed),
    ]);
    table.add_row(vec![
        Cell::new("Structured data"),
        Cell::new(if report.structured_data.types.is_empty() {
            "-".to_string()
        } else {
            report.structured_data.types.join(", ")
        }),
    ]);
    table.add_row(vec![
        Cell::new("robots.txt"),
        yes_no(report.robots_and_sitemap.robots_exists),
    ]);
    table.add_row(vec![
        Cell::new("sitemap.xml"),
        yes_no(report.robots_and_sitemap.sitemap_exists),
    ]);
    table.add_row(vec![
        Cell::new("Broken links"),
        Cell::new(format!(
            "{} of {} checked",
            report.broken_links.broken_links.len(),
            report.broken_links.total_checked
        )),
    ]);
    table
}

/// Issues in the requested order
fn sorted_issues(issues: &[TechnicalIssue], sort: OutputSort) -> Vec<&TechnicalIssue> {
    let mut sorted: Vec<&TechnicalIssue> = issues.iter().collect();
    if sort == OutputSort::Severity {
        // Stable sort keeps rule order within a severity
        sorted.sort_by(|a, b| b.severity.cmp(&a.severity));
    }
    sorted
}

fn severity_cell(severity: Severity) -> Cell {
    let color = match severity {
        Severity::High => Color::Red,
        Severity::Medium => Color::Yellow,
        Severity::Low => Color::DarkGrey,
    };
    Cell::new(severity.to_string())
        .fg(color)
        .set_alignment(CellAlignment::Center)
}

fn issue_table(issues: &[&TechnicalIssue]) -> Table {
    let mut table = new_table(&["Severity", "Category", "Issue", "Description"]);
    for issue in issues {
        table.add_row(vec![
            severity_cell(issue.severity),
            Cell::new(&issue.category),
            Cell::new(&issue.issue),
            Cell::new(&issue.description),
        ]);
    }
    table
}

fn recommendation_table(report: &AuditReport) -> Table {
    let mut table = new_table(&["Impact", "Recommendation", "Description"]);
    for rec in &report.recommendations {
        let impact = match rec.impact {
            Impact::High => Cell::new("High").fg(Color::Red),
            Impact::Medium => Cell::new("Medium").fg(Color::Yellow),
            Impact::Low => Cell::new("Low").fg(Color::DarkGrey),
            Impact::Positive => Cell::new("Positive").fg(Color::Green),
        };
        table.add_row(vec![
            impact,
            Cell::new(&rec.title),
            Cell::new(&rec.description),
        ]);
    }
    table
}
