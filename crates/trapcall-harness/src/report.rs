//! Conformance report generation.

use serde::Serialize;
use trapcall_core::errno::describe;

use crate::runner::CaseResult;

/// Summary of one verification run.
#[derive(Debug, Clone, Serialize)]
pub struct ConformanceReport {
    pub title: String,
    pub family: String,
    pub request: u32,
    pub timestamp: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub results: Vec<CaseResult>,
}

impl ConformanceReport {
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        family: impl Into<String>,
        request: u32,
        timestamp: impl Into<String>,
        results: Vec<CaseResult>,
    ) -> Self {
        let passed = results.iter().filter(|r| r.passed).count();
        Self {
            title: title.into(),
            family: family.into(),
            request,
            timestamp: timestamp.into(),
            total: results.len(),
            passed,
            failed: results.len() - passed,
            results,
        }
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Render as markdown.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {}\n\n", self.title));
        out.push_str(&format!("- Family: `{}`\n", self.family));
        out.push_str(&format!("- Request: `{}`\n", self.request));
        out.push_str(&format!("- Generated: {}\n", self.timestamp));
        out.push_str(&format!(
            "- Result: {}/{} passed\n\n",
            self.passed, self.total
        ));
        out.push_str("| Case | Status | Return | Errno | Notes |\n");
        out.push_str("|------|--------|--------|-------|-------|\n");
        for r in &self.results {
            let status = if r.passed { "PASS" } else { "FAIL" };
            let errno = if r.actual_errno == 0 {
                "0".to_string()
            } else {
                format!("{} ({})", r.actual_errno, describe(r.actual_errno))
            };
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                r.case_name,
                status,
                r.actual_return,
                errno,
                r.notes.join("; ")
            ));
        }
        out
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, passed: bool, ret: i32, errno: i32) -> CaseResult {
        CaseResult {
            case_name: name.into(),
            passed,
            expected_return: ret,
            actual_return: ret,
            expected_errno: errno,
            actual_errno: errno,
            notes: if passed { vec![] } else { vec!["errno: expected 1, got 2".into()] },
        }
    }

    #[test]
    fn counts_and_markdown() {
        let report = ConformanceReport::new(
            "trapcall conformance",
            "errno_translation",
            128,
            "2026-01-01T00:00:00.000Z",
            vec![result("ok", true, 5, 0), result("bad", false, -1, 2)],
        );
        assert_eq!((report.total, report.passed, report.failed), (2, 1, 1));
        assert!(!report.all_passed());

        let md = report.to_markdown();
        assert!(md.starts_with("# trapcall conformance\n"));
        assert!(md.contains("- Result: 1/2 passed"));
        assert!(md.contains("| ok | PASS | 5 | 0 |  |"));
        assert!(md.contains("| bad | FAIL | -1 | 2 (No such file or directory) | errno: expected 1, got 2 |"));
    }

    #[test]
    fn json_has_summary_fields() {
        let report = ConformanceReport::new("t", "f", 20, "now", vec![result("ok", true, 0, 0)]);
        let v: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(v["request"], 20);
        assert_eq!(v["passed"], 1);
        assert_eq!(v["results"][0]["case_name"], "ok");
    }
}
