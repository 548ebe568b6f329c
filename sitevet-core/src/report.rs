// Report generation from collected scan results.

use serde::{Deserialize, Serialize};
use sitevet_scanner::result::{Finding, FormDescriptor, IntruderEntry, RepeaterEntry, ScanOutcome};
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReportFormat {
    Markdown,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Some(ReportFormat::Markdown),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportData {
    pub target: String,
    pub generated_at: String,
    pub pages_visited: usize,
    pub findings: Vec<Finding>,
    pub forms: Vec<FormDescriptor>,
    pub intruder: Vec<IntruderEntry>,
    pub repeater: Vec<RepeaterEntry>,
}

impl ReportData {
    pub fn new(target: &str, outcome: ScanOutcome) -> Self {
        Self {
            target: target.to_string(),
            generated_at: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            pages_visited: outcome.pages_visited,
            findings: outcome.findings,
            forms: outcome.forms,
            intruder: Vec::new(),
            repeater: Vec::new(),
        }
    }

    pub fn with_intruder(mut self, entries: Vec<IntruderEntry>) -> Self {
        self.intruder = entries;
        self
    }

    pub fn with_repeater(mut self, entries: Vec<RepeaterEntry>) -> Self {
        self.repeater = entries;
        self
    }

    pub fn total_issues(&self) -> usize {
        self.findings.iter().map(|f| f.issue_count()).sum()
    }
}

pub fn generate_report(data: &ReportData, format: &ReportFormat) -> Result<String, String> {
    match format {
        ReportFormat::Markdown => Ok(generate_markdown_report(data)),
        ReportFormat::Json => generate_json_report(data).map_err(|e| e.to_string()),
    }
}

pub fn generate_markdown_report(data: &ReportData) -> String {
    let mut report = String::new();

    report.push_str("# sitevet Report\n\n");
    report.push_str(&format!("Target: {}\n", data.target));
    report.push_str(&format!("Date: {}\n", data.generated_at));
    report.push_str(&format!("Pages scanned: {}\n\n", data.pages_visited));

    report.push_str("## Vulnerabilities\n");
    for finding in &data.findings {
        report.push_str(&format!("### URL: {}\n", finding.url));
        push_issue_group(&mut report, "Header Issues", &finding.header_issues);
        push_issue_group(&mut report, "XSS Issues", &finding.xss_issues);
        push_issue_group(&mut report, "SQLi Issues", &finding.sqli_issues);
        push_issue_group(&mut report, "Redirect Issues", &finding.redirect_issues);
        report.push('\n');
    }

    report.push_str("## Forms Found\n");
    for form in &data.forms {
        report.push_str(&format!("- **URL**: {}\n", form.url));
        report.push_str(&format!("  - Action: {}\n", form.action));
        report.push_str(&format!("  - Method: {}\n", form.method));
        report.push_str(&format!("  - Inputs: {}\n", form.inputs.join(", ")));
    }
    report.push('\n');

    if !data.intruder.is_empty() {
        report.push_str("## Intruder Results\n");
        for entry in &data.intruder {
            report.push_str(&format!("- Payload: {}\n", entry.payload));
            report.push_str(&format!("  - Issues: {}\n", entry.issues.join(", ")));
        }
        report.push('\n');
    }

    if !data.repeater.is_empty() {
        report.push_str("## Repeater Results\n");
        for entry in &data.repeater {
            report.push_str(&format!(
                "- Iteration {}: Status {}, Length {}\n",
                entry.iteration, entry.status, entry.length
            ));
            if !entry.issues.is_empty() {
                report.push_str(&format!("  - Issues: {}\n", entry.issues.join(", ")));
            }
        }
        report.push('\n');
    }

    report
}

pub fn generate_json_report(data: &ReportData) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "sitevet",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json",
                "disclaimer": "For authorized security testing only"
            },
            "target": data.target,
            "summary": {
                "pages_visited": data.pages_visited,
                "vulnerable_urls": data.findings.len(),
                "total_issues": data.total_issues(),
                "forms_found": data.forms.len()
            },
            "vulnerabilities": data.findings,
            "forms": data.forms,
            "intruder": data.intruder,
            "repeater": data.repeater
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

fn push_issue_group(report: &mut String, label: &str, issues: &[String]) {
    if issues.is_empty() {
        return;
    }
    report.push_str(&format!("- **{}**:\n  - {}\n", label, issues.join("\n  - ")));
}
