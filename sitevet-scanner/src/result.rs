use serde::{Deserialize, Serialize};

/// Per-URL aggregate of detector output. Only created when at least one
/// issue list is non-empty; never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub url: String,
    pub header_issues: Vec<String>,
    pub xss_issues: Vec<String>,
    pub sqli_issues: Vec<String>,
    pub redirect_issues: Vec<String>,
}

impl Finding {
    pub fn issue_count(&self) -> usize {
        self.header_issues.len()
            + self.xss_issues.len()
            + self.sqli_issues.len()
            + self.redirect_issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issue_count() == 0
    }
}

/// One `<form>` discovered during the crawl.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormDescriptor {
    /// Page the form was found on.
    pub url: String,
    /// Submission target, resolved against the page URL.
    pub action: String,
    /// Uppercased HTTP method, "GET" when absent.
    pub method: String,
    /// Named input fields in document order. Unnamed inputs are dropped.
    pub inputs: Vec<String>,
}

/// One payload of an intruder run that produced issues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntruderEntry {
    pub payload: String,
    pub issues: Vec<String>,
}

/// One completed repeater iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepeaterEntry {
    /// 1-based iteration index.
    pub iteration: usize,
    pub status: u16,
    /// Response body length in bytes.
    pub length: usize,
    pub issues: Vec<String>,
}

/// Everything one crawl run collected, handed to the reporter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub findings: Vec<Finding>,
    pub forms: Vec<FormDescriptor>,
    pub pages_visited: usize,
}
